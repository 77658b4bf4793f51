use crate::{placeholder::Placeholder, value::Value};

/// A SQL parameter that associates a value with a placeholder.
///
/// Parameters produced while composing carry their value. Named parameters
/// without a value (pagination bounds, primary keys of cached reads) are
/// resolved from [`ParamBind`]s when the statement is bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// The placeholder to use in the SQL
    pub placeholder: Placeholder,
    /// The value to bind
    pub value: Option<Value>,
}

impl Param {
    pub fn new(placeholder: Placeholder, value: Option<Value>) -> Self {
        Self { placeholder, value }
    }

    /// Creates a new parameter with a positional placeholder
    pub fn positional(value: impl Into<Value>) -> Self {
        Self {
            placeholder: Placeholder::anonymous(),
            value: Some(value.into()),
        }
    }

    /// Creates a named parameter with no value, to be bound later
    pub fn named(name: &str) -> Self {
        Self {
            placeholder: Placeholder::named(name),
            value: None,
        }
    }
}

/// A value for a named placeholder, supplied at bind time.
#[derive(Debug, Clone)]
pub struct ParamBind<'a> {
    pub name: &'a str,
    pub value: Value,
}

impl<'a> ParamBind<'a> {
    pub fn new(name: &'a str, value: impl Into<Value>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}
