//! Translation of a [`Query`] into SQL over the triple table.
//!
//! The emitted statement has the shape
//!
//! ```text
//! SELECT [DISTINCT] <projection>
//! FROM triple AS t0 [JOIN triple AS t1 ON ... | CROSS JOIN triple AS t1] ...
//! [WHERE <constants, filters, keywords>]
//! [ORDER BY ...] LIMIT n OFFSET m
//! ```
//!
//! Sort keys put `xsd` numeric literals first, ordered by value, and
//! everything else after them in lexical order.
//!
//! wrapped in `SELECT COUNT(*) FROM (...)` for count queries and
//! `SELECT EXISTS (...)` for ask queries. Constant values never appear in the
//! text; they are returned as positional parameters.

use super::error::QueryError;
use super::planner::{Column, JoinPlan, SlotRef};
use super::types::{Query, Slot, SortDirection, Variable};
use crate::storage::SqlBackend;
use crate::types::{XSD, XSD_DOUBLE, XSD_INTEGER};

/// SQL text and its positional parameters.
#[derive(Debug, PartialEq, Eq)]
pub struct SqlQuery {
    pub text: String,
    pub params: Vec<String>,
}

/// Translate `query` into SQL.
///
/// The backend is only consulted for keyword clauses and sub-property
/// expansion, and only after the query has been validated.
pub fn translate<B: SqlBackend + ?Sized>(query: &Query, backend: &B) -> Result<SqlQuery, QueryError> {
    query.validate()?;
    let plan = JoinPlan::new(query.patterns());
    let mut translation = Translation {
        query,
        plan: &plan,
        conditions: Vec::new(),
        params: Vec::new(),
    };

    let select = translation.select()?;
    let from = translation.joins();
    translation.constants(backend)?;
    translation.filters()?;
    translation.keywords(backend)?;
    let order = translation.order()?;
    let limit = format!(
        " LIMIT {} OFFSET {}",
        query.limits().map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX)),
        query.offsets().unwrap_or(0)
    );

    let mut inner = format!("{select} {from}");
    if !translation.conditions.is_empty() {
        inner.push_str(" WHERE ");
        inner.push_str(&translation.conditions.join(" AND "));
    }
    inner.push_str(&order);
    inner.push_str(&limit);

    let text = if query.is_count() {
        format!("SELECT COUNT(*) FROM ({inner})")
    } else if query.is_ask() {
        format!("SELECT EXISTS ({inner})")
    } else {
        inner
    };

    tracing::debug!(sql = %text, params = ?translation.params, "translated query");
    Ok(SqlQuery {
        text,
        params: translation.params,
    })
}

/// Per-call scratch state.
struct Translation<'a> {
    query: &'a Query,
    plan: &'a JoinPlan,
    /// `WHERE` conditions. Parameters are pushed in the same order.
    conditions: Vec<String>,
    params: Vec<String>,
}

impl Translation<'_> {
    fn resolve(&self, var: &Variable) -> Result<SlotRef, QueryError> {
        self.plan
            .resolve(var)
            .ok_or_else(|| QueryError::UnboundVariable(var.name.as_str().to_owned()))
    }

    fn select(&self) -> Result<String, QueryError> {
        let mut columns = Vec::with_capacity(self.query.select_variables().len());
        for var in self.query.select_variables() {
            columns.push(self.resolve(var)?.to_string());
        }
        let projection = if columns.is_empty() {
            "1".to_owned()
        } else {
            columns.join(", ")
        };
        Ok(if self.query.is_distinct() {
            format!("SELECT DISTINCT {projection}")
        } else {
            format!("SELECT {projection}")
        })
    }

    /// Aliases and join conditions. Conditions within the first clause are
    /// moved to `WHERE`.
    fn joins(&mut self) -> String {
        let mut from = String::from("FROM triple AS t0");
        self.conditions
            .extend(self.plan.conditions_for(0).map(ToString::to_string));
        for clause in 1..self.plan.clauses() {
            let on: Vec<String> = self
                .plan
                .conditions_for(clause)
                .map(ToString::to_string)
                .collect();
            if on.is_empty() {
                from.push_str(&format!(" CROSS JOIN triple AS t{clause}"));
            } else {
                from.push_str(&format!(" JOIN triple AS t{clause} ON {}", on.join(" AND ")));
            }
        }
        from
    }

    /// Constant slots, and variables in context position.
    ///
    /// A context variable only ranges over named graphs. With reasoning, a
    /// constant predicate also matches its sub-properties.
    fn constants<B: SqlBackend + ?Sized>(&mut self, backend: &B) -> Result<(), QueryError> {
        let all_types = self.query.is_all_types();
        let reasoning = self
            .query
            .reasoning_setting()
            .unwrap_or_else(|| backend.reasoning());
        for (clause, pattern) in self.query.patterns().iter().enumerate() {
            for (position, slot) in pattern.slots() {
                let column = SlotRef {
                    clause,
                    column: position.into(),
                };
                match slot {
                    Slot::Literal(literal)
                        if all_types && column.column == Column::Object && literal.is_plain() =>
                    {
                        self.conditions.push(format!("{column} GLOB ?"));
                        self.params
                            .push(format!("{}*", glob_escape(&literal.to_lexical())));
                    }
                    Slot::Resource(predicate)
                        if reasoning && column.column == Column::Predicate =>
                    {
                        let predicate = predicate.to_lexical();
                        let subs = backend.sub_properties(&predicate)?;
                        if subs.is_empty() {
                            self.conditions.push(format!("{column} = ?"));
                        } else {
                            let placeholders = vec!["?"; subs.len() + 1].join(", ");
                            self.conditions.push(format!("{column} IN ({placeholders})"));
                        }
                        self.params.push(predicate);
                        self.params.extend(subs);
                    }
                    Slot::Resource(_) | Slot::Literal(_) => {
                        self.conditions.push(format!("{column} = ?"));
                        self.params.extend(slot.to_lexical());
                    }
                    Slot::Variable(_) if column.column == Column::Context => {
                        self.conditions.push(format!("{column} <> ''"));
                    }
                    Slot::Variable(_) | Slot::Any => {}
                }
            }
        }
        Ok(())
    }

    fn filters(&mut self) -> Result<(), QueryError> {
        for (var, filters) in self.query.filters() {
            let column = self.resolve(var)?;
            if let Some(lang) = &filters.lang {
                let tag = glob_escape(&lang.tag);
                self.conditions.push(format!("{column} GLOB ?"));
                self.params.push(if lang.exact {
                    format!("*\"@{tag}")
                } else {
                    format!("*\"@*{tag}*")
                });
            }
            if let Some(datatype) = &filters.datatype {
                self.conditions.push(format!("{column} GLOB ?"));
                self.params
                    .push(format!("*\"^^{}", glob_escape(&datatype.to_lexical())));
            }
            if let Some(pattern) = &filters.regex {
                self.conditions.push(format!("regexp(?, {column})"));
                self.params.push(pattern.as_str().to_owned());
            }
        }
        Ok(())
    }

    /// Keyword matches stay inside SQLite as a subquery, so the number of
    /// bound parameters grows with the search text, not with the matches.
    fn keywords<B: SqlBackend + ?Sized>(&mut self, backend: &B) -> Result<(), QueryError> {
        for (var, text) in self.query.keywords() {
            let column = self.resolve(var)?;
            let subquery = backend
                .keyword_subquery(text)
                .ok_or(QueryError::KeywordSearchDisabled)?;
            self.conditions.push(format!("{column} IN ({})", subquery.sql));
            self.params.extend(subquery.params);
        }
        Ok(())
    }

    fn order(&self) -> Result<String, QueryError> {
        let mut keys = Vec::new();
        for (var, direction) in self.query.sort_clauses() {
            let column = self.resolve(var)?;
            let key = numeric_key(column);
            keys.push(match direction {
                SortDirection::Ascending => format!("{key} ASC NULLS LAST, {column} ASC"),
                SortDirection::Descending => format!("{key} DESC NULLS FIRST, {column} DESC"),
            });
        }
        if keys.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!(" ORDER BY {}", keys.join(", ")))
        }
    }
}

/// The value of a numeric literal in `column`, or NULL for any other node.
fn numeric_key(column: SlotRef) -> String {
    let datatypes = [
        XSD_INTEGER.to_owned(),
        XSD_DOUBLE.to_owned(),
        format!("{XSD}decimal"),
        format!("{XSD}float"),
    ]
    .map(|datatype| format!("'<{datatype}>'"))
    .join(", ");
    format!(
        "CASE WHEN substr({column}, instr({column}, '\"^^<') + 3) IN ({datatypes}) \
         THEN CAST(substr({column}, 2, instr({column}, '\"^^<') - 2) AS REAL) END"
    )
}

/// Escape GLOB metacharacters so `text` only matches itself.
fn glob_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '*' => out.push_str("[*]"),
            '?' => out.push_str("[?]"),
            '[' => out.push_str("[[]"),
            c => out.push(c),
        }
    }
    out
}
