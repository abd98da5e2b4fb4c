//! Command assembly for the two external programs
//!
//! [`CommandKind`] is the closed set of programs the runner can launch. Each kind
//! carries a [`CommandSpec`] describing its default program, the configuration
//! keys its options live under and whether it takes a target path.
//! [`CommandBuilder`] turns a kind and a merged option set into argv tokens.

pub mod builder;
pub mod kind;

pub use builder::{BuildError, CHECK_MODE_FLAG, CommandBuilder, Programs, render_command_line};
pub use kind::{CommandKind, CommandSpec};
