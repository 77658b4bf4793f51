//! Abstract filter and sort trees.

use core::fmt;
use serde::Deserialize;
use std::str::FromStr;

use crate::value::Value;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Neq,
    Like,
    #[serde(rename = "nlike")]
    NotLike,
    Blank,
    NotBlank,
    /// `is` with a sub-operation value: null, notnull, empty, notempty,
    /// blank, notblank
    Is,
    IsNot,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    Checked,
    NotChecked,
}

impl FilterOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Like => "like",
            Self::NotLike => "nlike",
            Self::Blank => "blank",
            Self::NotBlank => "notblank",
            Self::Is => "is",
            Self::IsNot => "isnot",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Checked => "checked",
            Self::NotChecked => "notchecked",
        }
    }

    /// Operators whose value is ignored
    pub const fn is_unary(self) -> bool {
        matches!(
            self,
            Self::Blank | Self::NotBlank | Self::Checked | Self::NotChecked
        )
    }

    /// The positive operator whose negation this operator is.
    ///
    /// Filters on multi-valued columns evaluate `neq x` as "no value equals
    /// x" rather than "some value differs from x".
    pub const fn negated(self) -> Option<FilterOp> {
        match self {
            Self::Neq => Some(Self::Eq),
            Self::NotLike => Some(Self::Like),
            Self::IsNot => Some(Self::Is),
            Self::Blank => Some(Self::NotBlank),
            Self::NotChecked => Some(Self::Checked),
            _ => None,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOpParseError(pub String);

impl fmt::Display for FilterOpParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter operator '{}'", self.0)
    }
}

impl std::error::Error for FilterOpParseError {}

impl FromStr for FilterOp {
    type Err = FilterOpParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "like" => Self::Like,
            "nlike" => Self::NotLike,
            "blank" | "empty" => Self::Blank,
            "notblank" | "notempty" => Self::NotBlank,
            "is" => Self::Is,
            "isnot" => Self::IsNot,
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            "gte" | "ge" => Self::Gte,
            "lte" | "le" => Self::Lte,
            "in" => Self::In,
            "checked" => Self::Checked,
            "notchecked" => Self::NotChecked,
            _ => return Err(FilterOpParseError(s.to_string())),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    #[default]
    And,
    Or,
}

impl LogicalOp {
    pub const fn separator(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// A filter leaf: `column op value`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterCondition {
    /// Column id or title
    pub column: String,
    pub op: FilterOp,
    #[serde(default)]
    pub value: Value,
}

/// A filter tree. Groups keep their structure when rendered.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Filter {
    Group {
        #[serde(default)]
        logical: LogicalOp,
        children: Vec<Filter>,
    },
    Leaf(FilterCondition),
}

impl Filter {
    pub fn leaf(column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Filter::Leaf(FilterCondition {
            column: column.into(),
            op,
            value: value.into(),
        })
    }

    pub fn and(children: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Group {
            logical: LogicalOp::And,
            children: children.into_iter().collect(),
        }
    }

    pub fn or(children: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Group {
            logical: LogicalOp::Or,
            children: children.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => " ASC",
            Self::Desc => " DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sort {
    /// Column id or title
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}
