/// Declarative description of a single command-line option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    /// The flag token, eg `--inventory`
    pub name: String,
    pub value: OptionValue,
    /// The value is standard base64 and is decoded before use
    pub encoded: bool,
}

/// Where an option's value comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OptionValue {
    /// A bare switch
    #[default]
    None,
    Literal(String),
    /// Name of an environment variable holding the value
    EnvVar(String),
    /// Items joined with `separator` into one value
    List {
        items: Vec<ListItem>,
        separator: Option<String>,
    },
}

/// One element of a list-valued option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    /// Used verbatim
    Scalar(String),
    /// Rendered as `name=value`, or `name` when there is no value
    Option { name: String, value: NestedValue },
}

/// Value of a nested list option. Nested options are never lists or encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NestedValue {
    #[default]
    None,
    Literal(String),
    EnvVar(String),
}

impl OptionDescriptor {
    /// A switch without a value.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::None,
            encoded: false,
        }
    }

    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::Literal(value.into()),
            encoded: false,
        }
    }

    /// An option whose value is read from the environment variable `var`.
    pub fn env_var(name: impl Into<String>, var: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::EnvVar(var.into()),
            encoded: false,
        }
    }

    pub fn list(
        name: impl Into<String>,
        items: Vec<ListItem>,
        separator: Option<impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::List {
                items,
                separator: separator.map(Into::into),
            },
            encoded: false,
        }
    }

    /// Mark the value as base64 encoded.
    #[must_use]
    pub fn encoded(mut self) -> Self {
        self.encoded = true;
        self
    }
}

impl ListItem {
    pub fn scalar(value: impl Into<String>) -> Self {
        ListItem::Scalar(value.into())
    }

    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        ListItem::Option {
            name: name.into(),
            value: NestedValue::Literal(value.into()),
        }
    }

    pub fn env_var(name: impl Into<String>, var: impl Into<String>) -> Self {
        ListItem::Option {
            name: name.into(),
            value: NestedValue::EnvVar(var.into()),
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        ListItem::Option {
            name: name.into(),
            value: NestedValue::None,
        }
    }
}
