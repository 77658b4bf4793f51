use core::fmt;
use compact_str::CompactString;

/// Marker for one statement parameter.
///
/// Composed filter values are anonymous and carry their value; page bounds
/// and primary keys are named (`__limit`, `pk_0`) and bound per request. The
/// rendered form (`?`, `$1`, `@p1`) comes from the dialect adapter.
#[derive(Default, Debug, Clone, Hash, PartialEq, Eq)]
pub struct Placeholder {
    /// The semantic name of the parameter (used for binding by name).
    pub name: Option<CompactString>,
}

impl Placeholder {
    pub fn named(name: impl Into<CompactString>) -> Self {
        Placeholder {
            name: Some(name.into()),
        }
    }

    /// A placeholder bound by position only
    pub const fn anonymous() -> Self {
        Placeholder { name: None }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, ":{}", name),
            None => write!(f, "?"),
        }
    }
}
