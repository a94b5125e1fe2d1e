//! Translation of a [`Query`] into SPARQL text for remote endpoints.
//!
//! Engines differ only in how keyword clauses are expressed.

use std::collections::BTreeSet;

use super::error::QueryError;
use super::types::{FilterSet, Query, Slot, SortDirection, Variable};

/// Predicate YARS uses for keyword matching.
pub const YARS_KEYWORD: &str = "http://sw.deri.org/2004/06/yars#keyword";

/// The SPARQL dialect of the target endpoint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SparqlEngine {
    /// Plain SPARQL; keyword clauses are rejected.
    #[default]
    Generic,
    /// YARS2, with keyword triples.
    Yars2,
    /// Virtuoso, with `bif:contains`.
    Virtuoso,
}

/// Translates queries for one engine.
#[derive(Debug, Default)]
pub struct SparqlTranslator {
    engine: SparqlEngine,
}

impl SparqlTranslator {
    #[must_use]
    pub const fn new(engine: SparqlEngine) -> Self {
        Self { engine }
    }

    #[must_use]
    pub const fn engine(&self) -> SparqlEngine {
        self.engine
    }

    /// Translate `query` into SPARQL.
    ///
    /// Wildcard slots and `all_types` object constants get generated variable
    /// names that do not clash with the query's own.
    pub fn translate(&self, query: &Query) -> Result<String, QueryError> {
        query.validate()?;
        if query.is_count() {
            return Err(QueryError::Unsupported("count in SPARQL".to_owned()));
        }
        if !query.keywords().is_empty() && self.engine == SparqlEngine::Generic {
            return Err(QueryError::Unsupported(
                "keyword search on a generic SPARQL engine".to_owned(),
            ));
        }

        let mut names = NameGenerator::new(query);
        let mut clauses = Vec::new();
        let mut filters = Vec::new();

        for pattern in query.patterns() {
            let subject = render_slot(&pattern.subject, &mut names);
            let predicate = render_slot(&pattern.predicate, &mut names);
            let object = match &pattern.object {
                Slot::Literal(literal) if query.is_all_types() && literal.is_plain() => {
                    let var = names.fresh("o");
                    filters.push(format!("str({var}) = {}", literal.to_lexical()));
                    var.to_string()
                }
                slot => render_slot(slot, &mut names),
            };
            let triple = format!("{subject} {predicate} {object}");
            clauses.push(match &pattern.context {
                Some(context) => format!("GRAPH {} {{ {triple} }}", render_slot(context, &mut names)),
                None => triple,
            });
        }

        for (var, text) in query.keywords() {
            match self.engine {
                SparqlEngine::Yars2 => {
                    clauses.push(format!("{var} <{YARS_KEYWORD}> {}", quote_double(text)));
                }
                SparqlEngine::Virtuoso => {
                    filters.push(format!("bif:contains({var}, {})", quote_single(text)));
                }
                SparqlEngine::Generic => {}
            }
        }

        for (var, set) in query.filters() {
            filters.extend(render_filters(var, set));
        }

        let mut body = format!("{} .", clauses.join(" . "));
        if !filters.is_empty() {
            body.push_str(&format!(" FILTER ({})", filters.join(" && ")));
        }

        if query.is_ask() {
            return Ok(format!("ASK {{ {body} }}"));
        }

        let select: Vec<String> = query
            .select_variables()
            .iter()
            .map(ToString::to_string)
            .collect();
        let mut text = format!(
            "SELECT {}{} WHERE {{ {body} }}",
            if query.is_distinct() { "DISTINCT " } else { "" },
            select.join(" ")
        );
        if !query.sort_clauses().is_empty() {
            let keys: Vec<String> = query
                .sort_clauses()
                .iter()
                .map(|(var, direction)| match direction {
                    SortDirection::Ascending => var.to_string(),
                    SortDirection::Descending => format!("DESC({var})"),
                })
                .collect();
            text.push_str(&format!(" ORDER BY {}", keys.join(" ")));
        }
        if let Some(limit) = query.limits() {
            text.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = query.offsets() {
            text.push_str(&format!(" OFFSET {offset}"));
        }

        tracing::debug!(sparql = %text, engine = ?self.engine, "translated query");
        Ok(text)
    }
}

fn render_slot(slot: &Slot, names: &mut NameGenerator) -> String {
    match slot {
        Slot::Resource(r) => r.to_lexical(),
        Slot::Literal(l) => l.to_lexical(),
        Slot::Variable(v) => v.to_string(),
        Slot::Any => names.fresh("any").to_string(),
    }
}

fn render_filters(var: &Variable, set: &FilterSet) -> Vec<String> {
    let mut filters = Vec::new();
    if let Some(lang) = &set.lang {
        if lang.exact {
            filters.push(format!("lang({var}) = {}", quote_single(&lang.tag)));
        } else {
            let primary = lang.tag.split(['-', '_']).next().unwrap_or_default();
            filters.push(format!("regex(lang({var}), {})", quote_single(primary)));
        }
    }
    if let Some(datatype) = &set.datatype {
        filters.push(format!("datatype({var}) = {}", datatype.to_lexical()));
    }
    if let Some(pattern) = &set.regex {
        filters.push(format!("regex(str({var}), {})", quote_single(pattern)));
    }
    filters
}

fn quote_single(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn quote_double(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Hands out variable names that the query does not use yet.
///
/// Names are `{prefix}{n}` with a counter shared across prefixes, so output
/// is identical for identical queries.
#[derive(Debug)]
pub struct NameGenerator {
    used: BTreeSet<String>,
    next: usize,
}

impl NameGenerator {
    /// A generator avoiding every variable name of `query`.
    #[must_use]
    pub fn new(query: &Query) -> Self {
        let mut used = BTreeSet::new();
        for pattern in query.patterns() {
            for (_, slot) in pattern.slots() {
                if let Some(var) = slot.as_variable() {
                    used.insert(var.name.as_str().to_owned());
                }
            }
        }
        for var in query.select_variables() {
            used.insert(var.name.as_str().to_owned());
        }
        Self { used, next: 0 }
    }

    /// A fresh variable.
    pub fn fresh(&mut self, prefix: &str) -> Variable {
        loop {
            let name = format!("{prefix}{}", self.next);
            self.next += 1;
            if self.used.insert(name.as_str().to_owned()) {
                return Variable::new(name);
            }
        }
    }
}
