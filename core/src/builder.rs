use crate::{dialect::DialectAdapter, schema::Model, sql::SQL};

/// One output column of a composed row.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Output name (the column title)
    pub title: String,
    /// Value expression
    pub expr: SQL,
    /// Whether `expr` yields JSON that an enclosing JSON constructor must
    /// nest rather than quote
    pub json: bool,
    /// Lateral join the expression reads from
    pub join: Option<SQL>,
}

impl Projection {
    pub fn new(title: impl Into<String>, expr: SQL) -> Self {
        Self {
            title: title.into(),
            expr,
            json: false,
            join: None,
        }
    }

    pub fn json(title: impl Into<String>, expr: SQL) -> Self {
        Self {
            json: true,
            ..Self::new(title, expr)
        }
    }

    /// Attach the lateral join that produces `expr`
    pub fn with_join(mut self, join: SQL) -> Self {
        self.join = Some(join);
        self
    }

    /// `expr AS "title"`
    pub fn aliased(self) -> SQL {
        self.expr.alias(self.title)
    }
}

/// Represents a SELECT statement under construction.
///
/// Clauses are kept apart until [`to_sql`](Self::to_sql) so the composer can
/// add joins and conditions in any order.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub columns: Vec<SQL>,
    pub from: SQL,
    pub joins: Vec<SQL>,
    pub conditions: Vec<SQL>,
    pub order_by: Vec<SQL>,
    pub limit: Option<SQL>,
    pub offset: Option<SQL>,
}

impl SelectQuery {
    pub fn from(from: SQL) -> Self {
        Self {
            from,
            ..Default::default()
        }
    }

    pub fn column(mut self, column: SQL) -> Self {
        self.columns.push(column);
        self
    }

    pub fn join(mut self, join: SQL) -> Self {
        self.joins.push(join);
        self
    }

    /// Add a condition; conditions are joined with AND. Empty fragments are
    /// ignored.
    pub fn filter(mut self, condition: SQL) -> Self {
        if !condition.is_empty() {
            self.conditions.push(condition);
        }
        self
    }

    pub fn order_by(mut self, order: impl IntoIterator<Item = SQL>) -> Self {
        self.order_by.extend(order);
        self
    }

    pub fn limit(mut self, limit: SQL) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: SQL) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn to_sql(self, adapter: &dyn DialectAdapter) -> SQL {
        let columns = if self.columns.is_empty() {
            SQL::raw("*")
        } else {
            SQL::join(self.columns, ", ")
        };

        let mut sql = SQL::raw("SELECT ")
            .append(columns)
            .push_raw(" FROM ")
            .append(self.from);

        for join in self.joins {
            sql.append_mut(join);
        }

        if !self.conditions.is_empty() {
            sql.push_raw_mut(" WHERE ");
            sql.append_mut(SQL::join(self.conditions, " AND "));
        }

        let paged = self.limit.is_some() || self.offset.is_some();
        if !self.order_by.is_empty() {
            sql.push_raw_mut(" ORDER BY ");
            sql.append_mut(SQL::join(self.order_by, ", "));
        } else if paged && adapter.requires_order_for_paging() {
            sql.push_raw_mut(" ORDER BY (SELECT NULL)");
        }

        if paged {
            // OFFSET without LIMIT is not valid everywhere
            let limit = self.limit.unwrap_or_else(|| SQL::raw("-1"));
            sql.append_mut(adapter.limit_offset(limit, self.offset));
        }

        sql
    }
}

/// Physical table reference: `"schema"."table"` or `"table"`
pub fn table(model: &Model) -> SQL {
    match &model.schema_name {
        Some(schema) => SQL::qualified(schema, &model.table_name),
        None => SQL::ident(model.table_name.clone()),
    }
}
