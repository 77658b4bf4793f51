use regex::Regex;
use std::sync::OnceLock;

use super::ComposeCx;
use crate::{
    error::{LatticeError, Result},
    schema::Column,
    sql::SQL,
};

/// Turns a formula column into a SQL expression.
///
/// The formula language itself lives outside this crate; implementations
/// receive the composition context so column references resolve through
/// the same handlers as plain columns.
pub trait FormulaTranslator: Send + Sync {
    /// The value expression of `column` for the row at `alias`.
    fn translate<'s>(&self, column: &'s Column, alias: &str, cx: &mut ComposeCx<'s>)
    -> Result<SQL>;
}

/// Default translator: the formula is SQL with `{{column}}` references, by
/// column id or title, replaced by the column's expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateTranslator;

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([^}]+?)\s*\}\}").expect("valid formula reference regex")
    })
}

impl FormulaTranslator for TemplateTranslator {
    fn translate<'s>(
        &self,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        let options = column.formula_options()?;
        let formula = options.formula.as_str();
        let invalid = |reason: String| LatticeError::InvalidFormula {
            field: column.title.clone(),
            reason,
        };

        if let Some(token) = [";", "--", "/*"].iter().find(|t| formula.contains(**t)) {
            return Err(invalid(format!("'{token}' is not allowed in a formula")));
        }

        let owner = cx.schema.owner(column)?;
        let mut sql = SQL::empty();
        let mut rest = 0;

        for captures in reference_pattern().captures_iter(formula) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if whole.start() > rest {
                sql.push_raw_mut(formula[rest..whole.start()].to_string());
            }
            let referenced = owner
                .find_column(name.as_str())
                .ok_or_else(|| invalid(format!("unknown column '{}'", name.as_str())))?;
            let expr = cx.handler(referenced)?.expr(referenced, alias, cx)?;
            sql.append_mut(expr.parens());
            rest = whole.end();
        }
        if rest < formula.len() {
            sql.push_raw_mut(formula[rest..].to_string());
        }

        if sql.is_empty() {
            return Err(invalid("empty formula".to_string()));
        }
        Ok(sql)
    }
}
