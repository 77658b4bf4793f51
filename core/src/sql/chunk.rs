use std::borrow::Cow;

use crate::{param::Param, placeholder::Placeholder, value::Value};

/// A SQL chunk represents a part of an SQL statement.
///
/// This enum has 4 variants, each with a clear semantic purpose:
/// - `Raw` - Unquoted SQL text (keywords, operators, function names)
/// - `Ident` - Identifiers, quoted per dialect at render time
/// - `Literal` - String literals, escaped at render time
/// - `Param` - Parameter placeholders with (or awaiting) values
#[derive(Debug, Clone, PartialEq)]
pub enum SQLChunk {
    /// Raw SQL text (unquoted)
    /// Renders as: text (no quotes, as-is)
    Raw(Cow<'static, str>),

    /// Identifier for table, column and alias names
    /// Renders as: "name" or `name` depending on the dialect
    Ident(Cow<'static, str>),

    /// String literal such as a JSON object key
    /// Renders as: 'text' with embedded quotes doubled
    Literal(Cow<'static, str>),

    /// Parameter with value and placeholder
    /// Renders as: ? or $1 or @p1 depending on the dialect
    Param(Param),
}

impl SQLChunk {
    /// Creates raw SQL text from a static string - const
    #[inline]
    pub const fn raw_static(text: &'static str) -> Self {
        Self::Raw(Cow::Borrowed(text))
    }

    /// Creates a quoted identifier from a runtime string
    #[inline]
    pub fn ident(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Ident(name.into())
    }

    /// Creates raw SQL text from a runtime string
    #[inline]
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Self::Raw(text.into())
    }

    /// Creates a positional parameter chunk carrying its value
    #[inline]
    pub fn param(value: impl Into<Value>) -> Self {
        Self::Param(Param::positional(value))
    }

    /// Creates a named parameter chunk without a value
    #[inline]
    pub fn placeholder(name: &str) -> Self {
        Self::Param(Param::new(Placeholder::named(name), None))
    }
}
