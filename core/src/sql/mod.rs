mod chunk;

pub use chunk::*;

use smallvec::SmallVec;
use std::borrow::Cow;

use crate::{param::Param, value::Value};

/// SQL fragment builder with flat chunk storage.
///
/// Uses `SmallVec<[SQLChunk; 8]>` for inline storage of typical SQL fragments
/// without heap allocation. Fragments stay dialect-agnostic until they are
/// rendered by a [`DialectAdapter`](crate::dialect::DialectAdapter).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SQL {
    pub chunks: SmallVec<[SQLChunk; 8]>,
}

impl SQL {
    // ==================== constructors ====================

    /// Creates an empty SQL fragment
    #[inline]
    pub const fn empty() -> Self {
        Self {
            chunks: SmallVec::new_const(),
        }
    }

    /// Creates SQL with raw text (unquoted)
    #[inline]
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Raw(text.into())],
        }
    }

    /// Creates SQL with a quoted identifier
    #[inline]
    pub fn ident(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Ident(name.into())],
        }
    }

    /// Creates SQL with an escaped string literal
    #[inline]
    pub fn literal(text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Literal(text.into())],
        }
    }

    /// Creates SQL with a single parameter value
    #[inline]
    pub fn param(value: impl Into<Value>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::param(value)],
        }
    }

    /// Creates SQL with a named placeholder (no value, bound later)
    #[inline]
    pub fn placeholder(name: &str) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::placeholder(name)],
        }
    }

    /// Creates SQL with a single unsigned integer literal.
    #[inline]
    pub fn number(value: u64) -> Self {
        Self::raw(value.to_string())
    }

    /// Creates a qualified column reference: "alias"."column"
    #[inline]
    pub fn qualified(alias: &str, column: &str) -> Self {
        Self {
            chunks: smallvec::smallvec![
                SQLChunk::Ident(Cow::Owned(alias.to_string())),
                SQLChunk::raw_static("."),
                SQLChunk::Ident(Cow::Owned(column.to_string())),
            ],
        }
    }

    /// Creates SQL for a function call: NAME(args)
    #[inline]
    pub fn func(name: &'static str, args: SQL) -> Self {
        SQL::raw(name).push_raw("(").append(args).push_raw(")")
    }

    // ==================== builder methods ====================

    /// Append another SQL fragment (flat extend)
    #[inline]
    pub fn append(mut self, other: impl Into<SQL>) -> Self {
        self.append_mut(other);
        self
    }

    #[inline]
    pub fn append_mut(&mut self, other: impl Into<SQL>) {
        let other = other.into();

        if self.chunks.is_empty() {
            self.chunks = other.chunks;
            return;
        }
        if other.chunks.is_empty() {
            return;
        }

        self.chunks.extend(other.chunks);
    }

    /// Push a single chunk
    #[inline]
    pub fn push(mut self, chunk: impl Into<SQLChunk>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    /// Push raw text
    #[inline]
    pub fn push_raw(mut self, text: impl Into<Cow<'static, str>>) -> Self {
        self.chunks.push(SQLChunk::Raw(text.into()));
        self
    }

    #[inline]
    pub fn push_raw_mut(&mut self, text: impl Into<Cow<'static, str>>) {
        self.chunks.push(SQLChunk::Raw(text.into()));
    }

    // ==================== combinators ====================

    /// Joins multiple SQL fragments with a raw separator
    pub fn join<T>(sqls: T, separator: &'static str) -> SQL
    where
        T: IntoIterator<Item = SQL>,
    {
        let mut iter = sqls.into_iter();
        let Some(mut result) = iter.next() else {
            return SQL::empty();
        };

        for item in iter {
            result.chunks.push(SQLChunk::raw_static(separator));
            result.chunks.extend(item.chunks);
        }
        result
    }

    /// Wrap in parentheses: (self)
    #[inline]
    pub fn parens(self) -> Self {
        SQL::raw("(").append(self).push_raw(")")
    }

    /// Creates an aliased version: self AS "name"
    pub fn alias(self, name: impl Into<Cow<'static, str>>) -> SQL {
        self.push_raw(" AS ").push(SQLChunk::Ident(name.into()))
    }

    /// Creates a comma-separated list of parameters.
    pub fn param_list<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let iter = values.into_iter();
        let (lower, _) = iter.size_hint();
        let mut chunks = SmallVec::with_capacity(lower.saturating_mul(2));
        for (i, v) in iter.enumerate() {
            if i > 0 {
                chunks.push(SQLChunk::raw_static(", "));
            }
            chunks.push(SQLChunk::Param(Param::positional(v)));
        }
        SQL { chunks }
    }

    // ==================== inspection ====================

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Parameters in placeholder order
    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            SQLChunk::Param(param) => Some(param),
            _ => None,
        })
    }
}

impl From<SQLChunk> for SQL {
    fn from(chunk: SQLChunk) -> Self {
        SQL {
            chunks: smallvec::smallvec![chunk],
        }
    }
}

impl From<&'static str> for SQL {
    fn from(text: &'static str) -> Self {
        SQL::raw(text)
    }
}
