use crate::{
    dialect::DialectAdapter,
    error::{LatticeError, Result},
    param::{Param, ParamBind},
    sql::{SQL, SQLChunk},
    value::Value,
};
use compact_str::CompactString;
use hashbrown::HashMap;
use lattice_types::Dialect;
use std::fmt;

/// A rendered SQL statement with its parameters in placeholder order.
///
/// Parameters produced during composition carry their value; named
/// placeholders (`__limit`, `__offset`, `pk_0`, ...) are filled in by
/// [`bind`](Self::bind), so one statement can be replayed with new bounds.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    pub dialect: Dialect,
    /// Dialect SQL text with placeholders
    pub sql: CompactString,
    /// Parameter placeholders (in order)
    pub params: Box<[Param]>,
}

impl PreparedStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Names of the placeholders that must be bound before execution
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|p| p.value.is_none())
            .filter_map(|p| p.placeholder.name())
    }

    /// Resolve every parameter to a value, in placeholder order.
    ///
    /// Named binds take precedence over composed values; a named placeholder
    /// without a composed value and without a bind fails with
    /// [`LatticeError::MissingBinding`].
    pub fn bind<'a>(
        &self,
        param_binds: impl IntoIterator<Item = ParamBind<'a>>,
    ) -> Result<Vec<Value>> {
        let param_map: HashMap<&str, Value> = param_binds
            .into_iter()
            .map(|p| (p.name, p.value))
            .collect();

        self.params
            .iter()
            .map(|param| {
                let bound = param.placeholder.name().and_then(|name| param_map.get(name));
                if let Some(value) = bound {
                    return Ok(value.clone());
                }
                match &param.value {
                    Some(value) => Ok(value.clone()),
                    None => Err(LatticeError::MissingBinding(
                        param.placeholder.name().unwrap_or("?").to_string(),
                    )),
                }
            })
            .collect()
    }
}

impl fmt::Display for PreparedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Render a SQL fragment to dialect text, collecting its parameters.
pub fn prepare_render(sql: SQL, adapter: &dyn DialectAdapter) -> PreparedStatement {
    let mut text = String::with_capacity(sql.chunks.len() * 8);
    let mut params = Vec::new();

    for chunk in sql.chunks {
        match chunk {
            SQLChunk::Raw(raw) => text.push_str(&raw),
            SQLChunk::Ident(ident) => adapter.write_ident(&mut text, &ident),
            SQLChunk::Literal(literal) => adapter.write_literal(&mut text, &literal),
            SQLChunk::Param(param) => {
                params.push(param);
                text.push_str(&adapter.placeholder(params.len()));
            }
        }
    }

    PreparedStatement {
        dialect: adapter.dialect(),
        sql: CompactString::from(text),
        params: params.into_boxed_slice(),
    }
}
