//! Command-line options: declarative descriptors, resolution and merging
//!
//! A configuration describes options as [`OptionDescriptor`]s. Each one is
//! resolved against the environment into a [`ResolvedOption`], a plain
//! `name`/`value` pair. Global and per-playbook options are then merged into an
//! [`OptionSet`] that the command builder turns into argv tokens.

pub mod descriptor;
pub mod merge;
pub mod resolve;

pub use descriptor::{ListItem, NestedValue, OptionDescriptor, OptionValue};
pub use merge::{OptionSet, merge};
pub use resolve::{ResolveError, ResolvedOption, resolve};
