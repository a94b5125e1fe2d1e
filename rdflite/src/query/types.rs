//! Query types for the triple-pattern query model.
//!
//! This module defines the core types used in the query system:
//! - `Variable` - A placeholder in query patterns
//! - `Slot` - One position of a pattern: a constant, a variable or a wildcard
//! - `Pattern` - A where-clause: subject, predicate, object and optional context
//! - `FilterSet` - Language, datatype and regex filters on one variable
//! - `Query` - A complete query with its projection and modifiers

use std::fmt;

use super::error::QueryError;
use crate::types::{Literal, Position, Resource, Term, TypeError};

/// A query variable.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    /// The variable name, without the leading `?`.
    pub name: String,
}

impl Variable {
    /// Create a new variable.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Create a copy of this variable.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            name: self.name.as_str().to_owned(),
        }
    }
}

impl From<&str> for Variable {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Variable {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

/// One position of a where-clause.
#[derive(Debug, PartialEq)]
pub enum Slot {
    /// A concrete resource.
    Resource(Resource),
    /// A concrete literal. Only legal in object position.
    Literal(Literal),
    /// A variable to be bound.
    Variable(Variable),
    /// Matches anything and binds nothing.
    Any,
}

impl Slot {
    /// Create a variable slot.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(Variable::new(name))
    }

    /// Get the variable if this is one.
    #[must_use]
    pub const fn as_variable(&self) -> Option<&Variable> {
        match self {
            Self::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// The stored form of a constant slot.
    #[must_use]
    pub fn to_lexical(&self) -> Option<String> {
        match self {
            Self::Resource(r) => Some(r.to_lexical()),
            Self::Literal(l) => Some(l.to_lexical()),
            Self::Variable(_) | Self::Any => None,
        }
    }

    /// Create a copy of this slot.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        match self {
            Self::Resource(r) => Self::Resource(r.clone_value()),
            Self::Literal(l) => Self::Literal(l.clone_value()),
            Self::Variable(v) => Self::Variable(v.clone_value()),
            Self::Any => Self::Any,
        }
    }

    fn check_not_literal(&self, position: Position) -> Result<(), TypeError> {
        match self {
            Self::Literal(l) => Err(TypeError::new(position, l.to_lexical())),
            _ => Ok(()),
        }
    }
}

impl From<Resource> for Slot {
    fn from(r: Resource) -> Self {
        Self::Resource(r)
    }
}

impl From<Literal> for Slot {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

impl From<Variable> for Slot {
    fn from(v: Variable) -> Self {
        Self::Variable(v)
    }
}

impl From<Term> for Slot {
    fn from(t: Term) -> Self {
        match t {
            Term::Resource(r) => Self::Resource(r),
            Term::Literal(l) => Self::Literal(l),
        }
    }
}

impl<T: Into<Self>> From<Option<T>> for Slot {
    fn from(slot: Option<T>) -> Self {
        slot.map_or(Self::Any, Into::into)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(r) => r.fmt(f),
            Self::Literal(l) => l.fmt(f),
            Self::Variable(v) => v.fmt(f),
            Self::Any => f.write_str("_"),
        }
    }
}

/// A where-clause.
#[derive(Debug, PartialEq)]
pub struct Pattern {
    /// The subject (resource, variable or wildcard).
    pub subject: Slot,
    /// The predicate (resource, variable or wildcard).
    pub predicate: Slot,
    /// The object (any slot).
    pub object: Slot,
    /// The graph, or `None` to match every graph.
    pub context: Option<Slot>,
}

impl Pattern {
    /// Create a pattern, rejecting literals outside object position.
    pub fn new(
        subject: impl Into<Slot>,
        predicate: impl Into<Slot>,
        object: impl Into<Slot>,
        context: Option<Slot>,
    ) -> Result<Self, TypeError> {
        let subject = subject.into();
        let predicate = predicate.into();
        subject.check_not_literal(Position::Subject)?;
        predicate.check_not_literal(Position::Predicate)?;
        if let Some(context) = &context {
            context.check_not_literal(Position::Context)?;
        }
        Ok(Self {
            subject,
            predicate,
            object: object.into(),
            context,
        })
    }

    /// The slots in `(s, p, o, c)` order, skipping an absent context.
    pub fn slots(&self) -> impl Iterator<Item = (Position, &Slot)> {
        [
            (Position::Subject, Some(&self.subject)),
            (Position::Predicate, Some(&self.predicate)),
            (Position::Object, Some(&self.object)),
            (Position::Context, self.context.as_ref()),
        ]
        .into_iter()
        .filter_map(|(position, slot)| slot.map(|s| (position, s)))
    }

    /// Whether `variable` occurs in this pattern.
    #[must_use]
    pub fn binds(&self, variable: &Variable) -> bool {
        self.slots()
            .any(|(_, slot)| slot.as_variable() == Some(variable))
    }

    /// Create a copy of this pattern.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            subject: self.subject.clone_value(),
            predicate: self.predicate.clone_value(),
            object: self.object.clone_value(),
            context: self.context.as_ref().map(Slot::clone_value),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(context) = &self.context {
            write!(f, " {context}")?;
        }
        Ok(())
    }
}

/// Language tag filter.
#[derive(Debug, PartialEq, Eq)]
pub struct LangFilter {
    /// Lowercase tag without leading `@`.
    pub tag: String,
    /// Match the full tag, or any tag containing it.
    pub exact: bool,
}

/// Filters on one variable.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub lang: Option<LangFilter>,
    pub datatype: Option<Resource>,
    /// A pattern already checked to compile.
    pub regex: Option<String>,
}

impl FilterSet {
    fn clone_value(&self) -> Self {
        Self {
            lang: self.lang.as_ref().map(|l| LangFilter {
                tag: l.tag.as_str().to_owned(),
                exact: l.exact,
            }),
            datatype: self.datatype.as_ref().map(Resource::clone_value),
            regex: self.regex.as_deref().map(str::to_owned),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A complete query.
///
/// Built by chaining; translation and execution borrow it immutably, so a
/// query can be executed any number of times.
#[derive(Debug, Default)]
pub struct Query {
    select: Vec<Variable>,
    patterns: Vec<Pattern>,
    filters: Vec<(Variable, FilterSet)>,
    keywords: Vec<(Variable, String)>,
    sort: Vec<(Variable, SortDirection)>,
    distinct: bool,
    count: bool,
    ask: bool,
    all_types: bool,
    reasoning: Option<bool>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Query {
    /// Create a new empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add variables to the projection. Duplicates are ignored.
    #[must_use]
    pub fn select<V: Into<Variable>>(mut self, vars: impl IntoIterator<Item = V>) -> Self {
        for var in vars {
            let var = var.into();
            if !self.select.contains(&var) {
                self.select.push(var);
            }
        }
        self
    }

    /// Add variables to the projection and return distinct rows only.
    #[must_use]
    pub fn distinct<V: Into<Variable>>(mut self, vars: impl IntoIterator<Item = V>) -> Self {
        self.distinct = true;
        self.select(vars)
    }

    /// Add variables to the projection and return the number of rows.
    #[must_use]
    pub fn count<V: Into<Variable>>(mut self, vars: impl IntoIterator<Item = V>) -> Self {
        self.count = true;
        self.select(vars)
    }

    /// Return whether any row exists.
    #[must_use]
    pub const fn ask(mut self) -> Self {
        self.ask = true;
        self
    }

    /// Empty the projection and reset distinctness.
    #[must_use]
    pub fn clear_select(mut self) -> Self {
        self.select.clear();
        self.distinct = false;
        self
    }

    /// Add a where-clause matching every graph.
    pub fn where_clause(
        self,
        subject: impl Into<Slot>,
        predicate: impl Into<Slot>,
        object: impl Into<Slot>,
    ) -> Result<Self, QueryError> {
        self.push_pattern(Pattern::new(subject, predicate, object, None)?)
    }

    /// Add a where-clause restricted to a graph.
    pub fn where_in_context(
        self,
        subject: impl Into<Slot>,
        predicate: impl Into<Slot>,
        object: impl Into<Slot>,
        context: impl Into<Slot>,
    ) -> Result<Self, QueryError> {
        self.push_pattern(Pattern::new(
            subject,
            predicate,
            object,
            Some(context.into()),
        )?)
    }

    /// Add an already built where-clause.
    pub fn where_pattern(self, pattern: Pattern) -> Result<Self, QueryError> {
        self.push_pattern(pattern)
    }

    fn push_pattern(mut self, pattern: Pattern) -> Result<Self, QueryError> {
        pattern.subject.check_not_literal(Position::Subject)?;
        pattern.predicate.check_not_literal(Position::Predicate)?;
        if let Some(context) = &pattern.context {
            context.check_not_literal(Position::Context)?;
        }
        self.patterns.push(pattern);
        Ok(self)
    }

    /// Keep rows whose `var` has the language `tag`.
    ///
    /// Without `exact`, any tag containing `tag` matches, so `en` also
    /// matches `en-gb`.
    pub fn filter_lang(
        mut self,
        var: impl Into<Variable>,
        tag: &str,
        exact: bool,
    ) -> Result<Self, QueryError> {
        let var = var.into();
        let name = var.name.as_str().to_owned();
        let filters = self.filters_mut(var);
        if filters.datatype.is_some() {
            return Err(QueryError::ConflictingFilter(name));
        }
        filters.lang = Some(LangFilter {
            tag: tag.trim_start_matches('@').to_ascii_lowercase(),
            exact,
        });
        Ok(self)
    }

    /// Keep rows whose `var` is a literal of `datatype`.
    pub fn filter_datatype(
        mut self,
        var: impl Into<Variable>,
        datatype: Resource,
    ) -> Result<Self, QueryError> {
        let var = var.into();
        let name = var.name.as_str().to_owned();
        let filters = self.filters_mut(var);
        if filters.lang.is_some() {
            return Err(QueryError::ConflictingFilter(name));
        }
        filters.datatype = Some(datatype);
        Ok(self)
    }

    /// Keep rows whose `var` value matches `pattern`.
    pub fn filter_regex(mut self, var: impl Into<Variable>, pattern: &str) -> Result<Self, QueryError> {
        if let Err(e) = regex::Regex::new(pattern) {
            return Err(QueryError::InvalidRegex {
                pattern: pattern.to_owned(),
                message: e.to_string(),
            });
        }
        self.filters_mut(var.into()).regex = Some(pattern.to_owned());
        Ok(self)
    }

    fn filters_mut(&mut self, var: Variable) -> &mut FilterSet {
        let index = match self.filters.iter().position(|(v, _)| *v == var) {
            Some(index) => index,
            None => {
                self.filters.push((var, FilterSet::default()));
                self.filters.len() - 1
            }
        };
        &mut self.filters[index].1
    }

    /// Keep rows whose `var` has indexed literal text matching `text`.
    ///
    /// Repeated keywords on one variable are joined into one search.
    #[must_use]
    pub fn keyword(mut self, var: impl Into<Variable>, text: &str) -> Self {
        let var = var.into();
        if let Some((_, existing)) = self.keywords.iter_mut().find(|(v, _)| *v == var) {
            existing.push(' ');
            existing.push_str(text);
        } else {
            self.keywords.push((var, text.to_owned()));
        }
        self
    }

    /// Append ascending sort keys.
    ///
    /// Numeric `xsd` literals come first, ordered by value. Other nodes
    /// follow in the order of their stored lexical form.
    #[must_use]
    pub fn sort<V: Into<Variable>>(mut self, vars: impl IntoIterator<Item = V>) -> Self {
        self.sort
            .extend(vars.into_iter().map(|v| (v.into(), SortDirection::Ascending)));
        self
    }

    /// Append descending sort keys.
    #[must_use]
    pub fn reverse_sort<V: Into<Variable>>(mut self, vars: impl IntoIterator<Item = V>) -> Self {
        self.sort
            .extend(vars.into_iter().map(|v| (v.into(), SortDirection::Descending)));
        self
    }

    /// Return at most `n` rows.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skip the first `n` rows.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Let plain literal constants in object position match the same text
    /// with any datatype or language tag.
    #[must_use]
    pub const fn all_types(mut self) -> Self {
        self.all_types = true;
        self
    }

    /// Match constant predicates together with their `rdfs:subPropertyOf`
    /// descendants. Unset, the store's default applies.
    #[must_use]
    pub const fn reasoning(mut self, enabled: bool) -> Self {
        self.reasoning = Some(enabled);
        self
    }

    #[must_use]
    pub fn select_variables(&self) -> &[Variable] {
        &self.select
    }

    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    #[must_use]
    pub fn filters(&self) -> &[(Variable, FilterSet)] {
        &self.filters
    }

    #[must_use]
    pub fn keywords(&self) -> &[(Variable, String)] {
        &self.keywords
    }

    #[must_use]
    pub fn sort_clauses(&self) -> &[(Variable, SortDirection)] {
        &self.sort
    }

    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    #[must_use]
    pub const fn is_count(&self) -> bool {
        self.count
    }

    #[must_use]
    pub const fn is_ask(&self) -> bool {
        self.ask
    }

    #[must_use]
    pub const fn is_all_types(&self) -> bool {
        self.all_types
    }

    #[must_use]
    pub const fn reasoning_setting(&self) -> Option<bool> {
        self.reasoning
    }

    #[must_use]
    pub const fn limits(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub const fn offsets(&self) -> Option<u64> {
        self.offset
    }

    /// Whether some where-clause binds `var`.
    #[must_use]
    pub fn is_bound(&self, var: &Variable) -> bool {
        self.patterns.iter().any(|p| p.binds(var))
    }

    /// Check what can be checked without a backend.
    ///
    /// Every select, filter, sort and keyword variable must be bound by a
    /// where-clause, `count` cannot be combined with `ask`, and only `ask` and
    /// `count` queries may have an empty projection.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.patterns.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        if self.count && self.ask {
            return Err(QueryError::ConflictingModifiers(
                "count cannot be combined with ask".to_owned(),
            ));
        }
        if !(self.ask || self.count) && self.select.is_empty() {
            return Err(QueryError::EmptyProjection);
        }
        let referenced = self
            .select
            .iter()
            .chain(self.filters.iter().map(|(v, _)| v))
            .chain(self.sort.iter().map(|(v, _)| v))
            .chain(self.keywords.iter().map(|(v, _)| v));
        for var in referenced {
            if !self.is_bound(var) {
                return Err(QueryError::UnboundVariable(var.name.as_str().to_owned()));
            }
        }
        Ok(())
    }

    /// Create a copy of this query.
    ///
    /// This is used instead of Clone to comply with project policy.
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            select: self.select.iter().map(Variable::clone_value).collect(),
            patterns: self.patterns.iter().map(Pattern::clone_value).collect(),
            filters: self
                .filters
                .iter()
                .map(|(v, f)| (v.clone_value(), f.clone_value()))
                .collect(),
            keywords: self
                .keywords
                .iter()
                .map(|(v, t)| (v.clone_value(), t.as_str().to_owned()))
                .collect(),
            sort: self.sort.iter().map(|(v, d)| (v.clone_value(), *d)).collect(),
            distinct: self.distinct,
            count: self.count,
            ask: self.ask,
            all_types: self.all_types,
            reasoning: self.reasoning,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let select: Vec<String> = self.select.iter().map(ToString::to_string).collect();
        let patterns: Vec<String> = self.patterns.iter().map(ToString::to_string).collect();
        write!(f, "select [{}] where [{}]", select.join(" "), patterns.join(", "))
    }
}
