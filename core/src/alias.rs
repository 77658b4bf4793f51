use compact_str::{CompactString, format_compact};

/// Alias of the root table in every composed statement
pub const ROOT_ALIAS: &str = "a0";

/// Produces `a1`, `a2`, ... for nested subqueries of one statement.
///
/// One generator lives in each composition context, so aliases are unique
/// within a statement and never shared across requests.
#[derive(Debug, Default)]
pub struct AliasGenerator {
    next: u32,
}

impl AliasGenerator {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// The next unused alias
    pub fn next_alias(&mut self) -> CompactString {
        self.next += 1;
        format_compact!("a{}", self.next)
    }

    /// Number of aliases handed out so far
    pub fn issued(&self) -> u32 {
        self.next
    }
}
