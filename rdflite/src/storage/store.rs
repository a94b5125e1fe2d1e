//! The SQLite-backed triple store.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, params, params_from_iter};

use super::backend::{Cell, KeywordSubquery, SqlBackend, SqlRow};
use super::keyword::KeywordIndex;
use super::schema::{self, DEFAULT_CONTEXT};
use super::suggest;
use crate::config::StoreConfig;
use crate::types::{
    NTriplesError, Position, RDFS_SUB_PROPERTY_OF, Resource, Term, TypeError, parse_document,
};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A triple store holding one `triple(s, p, o, c)` table.
///
/// Queries borrow the store immutably; every mutation takes `&mut self` and
/// runs in its own transaction.
pub struct TripleStore {
    conn: Connection,
    keyword: Option<KeywordIndex>,
    location: Option<PathBuf>,
    reasoning: bool,
    /// Number of N-Triples documents loaded so far. Scopes blank node labels.
    batches: u64,
}

impl TripleStore {
    /// Open (or create) the store described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut conn = match &config.location {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        conn.pragma_update(None, "synchronous", "OFF")?;
        schema::create(&mut conn, config.indices, config.fresh)?;
        register_regexp(&conn)?;

        let keyword = if config.keyword_search {
            Some(KeywordIndex::create(&conn, config.fresh)?)
        } else {
            None
        };

        let store = Self {
            conn,
            keyword,
            location: config.location.as_deref().map(Path::to_path_buf),
            reasoning: config.reasoning,
            batches: 0,
        };
        let size = store.size()?;
        tracing::info!(
            location = %store.location.as_deref().map_or(Cow::Borrowed("memory"), Path::to_string_lossy),
            keyword_search = store.keyword.is_some(),
            reasoning = store.reasoning,
            size,
            "opened triple store"
        );
        Ok(store)
    }

    /// A fresh in-memory store with default settings.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(&StoreConfig::default())
    }

    /// The database file, or `None` for an in-memory store.
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Whether literal objects are keyword-indexed.
    #[must_use]
    pub const fn keyword_search_enabled(&self) -> bool {
        self.keyword.is_some()
    }

    /// Add one statement, in `context` or the default graph.
    ///
    /// Returns `false` if the statement was already stored.
    pub fn add(
        &mut self,
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
        context: Option<&Resource>,
    ) -> Result<bool, StoreError> {
        let subject = subject.into();
        let predicate = predicate.into();
        let object = object.into();
        let subject = subject.expect_resource(Position::Subject)?;
        let predicate = predicate.expect_resource(Position::Predicate)?;

        let tx = self.conn.transaction()?;
        let inserted = insert(&tx, self.keyword.as_ref(), subject, predicate, &object, context)?;
        tx.commit()?;

        tracing::debug!(%subject, %predicate, %object, inserted, "add");
        Ok(inserted)
    }

    /// Delete every statement matching the given terms. `None` matches anything.
    ///
    /// Returns the number of statements removed.
    pub fn delete(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        context: Option<&Resource>,
    ) -> Result<usize, StoreError> {
        if let Some(subject) = subject {
            subject.expect_resource(Position::Subject)?;
        }
        if let Some(predicate) = predicate {
            predicate.expect_resource(Position::Predicate)?;
        }

        let mut conditions = Vec::new();
        let mut values = Vec::new();
        let bound = [
            ("s", subject.map(Term::to_lexical)),
            ("p", predicate.map(Term::to_lexical)),
            ("o", object.map(Term::to_lexical)),
            ("c", context.map(Resource::to_lexical)),
        ];
        for (column, value) in bound {
            if let Some(value) = value {
                conditions.push(format!("{column} = ?"));
                values.push(value);
            }
        }
        let mut sql = String::from("DELETE FROM triple");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        let tx = self.conn.transaction()?;
        let removed = tx.execute(&sql, params_from_iter(values.iter()))?;
        if let Some(keyword) = &self.keyword {
            keyword.prune(&tx)?;
        }
        tx.commit()?;

        tracing::debug!(removed, "delete");
        Ok(removed)
    }

    /// Number of stored statements.
    pub fn size(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM triple", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Every statement as `"s p o"`, or `"s p o c"` outside the default graph.
    pub fn dump(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT s, p, o, c FROM triple ORDER BY rowid")?;
        let lines = stmt
            .query_map([], |row| {
                let s: String = row.get(0)?;
                let p: String = row.get(1)?;
                let o: String = row.get(2)?;
                let c: String = row.get(3)?;
                Ok(if c == DEFAULT_CONTEXT {
                    format!("{s} {p} {o}")
                } else {
                    format!("{s} {p} {o} {c}")
                })
            })?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(lines)
    }

    /// Remove every statement and keyword entry.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch("DELETE FROM triple")?;
        if let Some(keyword) = &self.keyword {
            keyword.clear(&tx)?;
        }
        tx.commit()?;
        tracing::debug!("cleared triple store");
        Ok(())
    }

    /// Add every statement of an N-Triples document.
    ///
    /// Returns the number of statements read, duplicates included. Nothing is
    /// added when any line is malformed.
    pub fn load_ntriples(
        &mut self,
        text: &str,
        context: Option<&Resource>,
    ) -> Result<usize, StoreError> {
        let batch = self.batches;
        self.batches += 1;
        let statements = parse_document(text, batch)?;

        let tx = self.conn.transaction()?;
        for statement in &statements {
            insert(
                &tx,
                self.keyword.as_ref(),
                &statement.subject,
                &statement.predicate,
                &statement.object,
                context,
            )?;
        }
        tx.commit()?;

        tracing::info!(statements = statements.len(), "loaded n-triples");
        Ok(statements.len())
    }

    /// Read and add an N-Triples file.
    pub fn load(&mut self, path: &Path, context: Option<&Resource>) -> Result<usize, StoreError> {
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading file");
        self.load_ntriples(&text, context)
    }

    /// Named graphs holding at least one statement.
    pub fn contexts(&self) -> Result<Vec<Resource>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT c FROM triple WHERE c <> '' ORDER BY c")?;
        let stored = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        stored
            .into_iter()
            .map(|c| match Term::from_lexical(&c) {
                Ok(Term::Resource(r)) => Ok(r),
                _ => Err(StoreError::MalformedNode(c)),
            })
            .collect()
    }

    /// Predicates that resources similar to `resource` use and it does not.
    ///
    /// Returns `None` when no candidate qualifies.
    pub fn suggest(&self, resource: &Resource) -> Result<Option<Vec<(Resource, f64)>>, StoreError> {
        suggest::suggest(&self.conn, resource)
    }
}

impl SqlBackend for TripleStore {
    fn execute_sql(&self, sql: &str, params: &[String]) -> Result<Vec<SqlRow>, StoreError> {
        if sql.trim().is_empty() {
            return Err(StoreError::EmptyQuery);
        }
        let mut stmt = self.conn.prepare(sql)?;
        let columns = stmt.column_count();
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..columns)
                    .map(|i| row.get_ref(i).map(Cell::from))
                    .collect::<rusqlite::Result<SqlRow>>()
            })?
            .collect::<rusqlite::Result<Vec<SqlRow>>>()?;
        Ok(rows)
    }

    fn keyword_search(&self, text: &str) -> Result<Option<Vec<String>>, StoreError> {
        match &self.keyword {
            Some(keyword) => Ok(Some(keyword.search(&self.conn, text)?)),
            None => Ok(None),
        }
    }

    fn keyword_subquery(&self, text: &str) -> Option<KeywordSubquery> {
        self.keyword.as_ref().map(|_| KeywordIndex::subquery(text))
    }

    /// `UNION` drops rows already produced, so cycles terminate.
    fn sub_properties(&self, predicate: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "WITH RECURSIVE sub(p) AS (
                SELECT s FROM triple WHERE p = ?1 AND o = ?2
                UNION
                SELECT triple.s FROM triple JOIN sub ON triple.o = sub.p WHERE triple.p = ?1
            )
            SELECT p FROM sub WHERE p <> ?2 ORDER BY p",
        )?;
        let subs = stmt
            .query_map(
                params![Resource::new(RDFS_SUB_PROPERTY_OF).to_lexical(), predicate],
                |row| row.get(0),
            )?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        tracing::debug!(predicate, sub_properties = subs.len(), "expanded predicate");
        Ok(subs)
    }

    fn reasoning(&self) -> bool {
        self.reasoning
    }
}

fn insert(
    conn: &Connection,
    keyword: Option<&KeywordIndex>,
    subject: &Resource,
    predicate: &Resource,
    object: &Term,
    context: Option<&Resource>,
) -> Result<bool, StoreError> {
    let s = subject.to_lexical();
    let o = object.to_lexical();
    let c = context.map_or_else(|| DEFAULT_CONTEXT.to_owned(), Resource::to_lexical);
    let mut stmt = conn.prepare_cached("INSERT INTO triple(s, p, o, c) VALUES (?1, ?2, ?3, ?4)")?;
    let inserted = stmt.execute(params![s, predicate.to_lexical(), o, c])? > 0;
    if let (Some(keyword), Term::Literal(literal)) = (keyword, object) {
        keyword.index(conn, &s, &o, literal.lexical_value())?;
    }
    Ok(inserted)
}

/// Register `regexp(pattern, node)`, matching against the node's value.
///
/// A stored resource matches on its IRI and a literal on its unescaped text.
/// The compiled pattern is cached for the lifetime of the statement.
fn register_regexp(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let pattern: std::sync::Arc<Regex> =
                ctx.get_or_create_aux(0, |v| -> Result<Regex, BoxError> {
                    Ok(Regex::new(v.as_str()?)?)
                })?;
            let node = ctx.get_raw(1);
            if matches!(node, rusqlite::types::ValueRef::Null) {
                return Ok(false);
            }
            let text = node
                .as_str()
                .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;
            let value = match Term::from_lexical(text) {
                Ok(Term::Resource(r)) => Cow::Owned(r.iri().to_owned()),
                Ok(Term::Literal(l)) => Cow::Owned(l.lexical_value().to_owned()),
                Err(_) => Cow::Borrowed(text),
            };
            Ok(pattern.is_match(&value))
        },
    )
}

/// Errors from the triple store.
#[derive(Debug)]
pub enum StoreError {
    /// A literal where a resource is required.
    Type(TypeError),
    /// SQLite failed.
    Sqlite(rusqlite::Error),
    /// Empty SQL text.
    EmptyQuery,
    /// A stored value that is not a valid lexical term.
    MalformedNode(String),
    /// Malformed N-Triples input.
    Parse(NTriplesError),
    /// Reading an input file failed.
    Io(std::io::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type(e) => write!(f, "{e}"),
            Self::Sqlite(e) => write!(f, "sqlite error: {e}"),
            Self::EmptyQuery => write!(f, "empty query"),
            Self::MalformedNode(node) => write!(f, "malformed node in result: {node:?}"),
            Self::Parse(e) => write!(f, "n-triples parse error: {e}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Type(e) => Some(e),
            Self::Sqlite(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::EmptyQuery | Self::MalformedNode(_) => None,
        }
    }
}

impl From<TypeError> for StoreError {
    fn from(e: TypeError) -> Self {
        Self::Type(e)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e)
    }
}

impl From<NTriplesError> for StoreError {
    fn from(e: NTriplesError) -> Self {
        Self::Parse(e)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
