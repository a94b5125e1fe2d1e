//! Table layout and lookup indices of the triple store.
//!
//! # Table
//!
//! `triple(s, p, o, c)` holds one row per statement, every column in lexical
//! form. The default graph is stored as the empty string in `c`, never NULL,
//! so that `UNIQUE(s, p, o, c) ON CONFLICT IGNORE` also folds duplicate
//! default-graph statements.
//!
//! # Indices
//!
//! `(s, p)` and `(p, o)` always exist: they serve attribute lookup by subject
//! and reverse lookup by predicate and object. The others are opt-in.

use rusqlite::Connection;

/// Name of the triple table.
pub const TRIPLE_TABLE: &str = "triple";

/// Stored value of the context column for the default graph.
pub const DEFAULT_CONTEXT: &str = "";

/// Optional lookup indices on the triple table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexSet {
    /// Index on `s`.
    pub subject: bool,
    /// Index on `p`.
    pub predicate: bool,
    /// Index on `o`.
    pub object: bool,
    /// Index on `(s, o)`.
    pub subject_object: bool,
    /// Index on `(o, p)`.
    pub object_predicate: bool,
}

impl IndexSet {
    /// Every optional index enabled.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            subject: true,
            predicate: true,
            object: true,
            subject_object: true,
            object_predicate: true,
        }
    }

    /// Parse a comma-separated list of index names (`s`, `p`, `o`, `so`, `op`).
    ///
    /// Returns the first unknown name as the error.
    pub fn parse(list: &str) -> Result<Self, String> {
        let mut set = Self::default();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match name {
                "s" => set.subject = true,
                "p" => set.predicate = true,
                "o" => set.object = true,
                "so" => set.subject_object = true,
                "op" => set.object_predicate = true,
                other => return Err(other.to_owned()),
            }
        }
        Ok(set)
    }

    /// `CREATE INDEX` statements for this set, the mandatory ones first.
    fn statements(self) -> Vec<&'static str> {
        let mut statements = vec![
            "CREATE INDEX IF NOT EXISTS spidx ON triple(s, p)",
            "CREATE INDEX IF NOT EXISTS poidx ON triple(p, o)",
        ];
        let optional = [
            (self.subject, "CREATE INDEX IF NOT EXISTS sidx ON triple(s)"),
            (self.predicate, "CREATE INDEX IF NOT EXISTS pidx ON triple(p)"),
            (self.object, "CREATE INDEX IF NOT EXISTS oidx ON triple(o)"),
            (
                self.subject_object,
                "CREATE INDEX IF NOT EXISTS soidx ON triple(s, o)",
            ),
            (
                self.object_predicate,
                "CREATE INDEX IF NOT EXISTS opidx ON triple(o, p)",
            ),
        ];
        statements.extend(
            optional
                .into_iter()
                .filter_map(|(enabled, sql)| enabled.then_some(sql)),
        );
        statements
    }
}

/// Create the triple table and its indices.
///
/// With `fresh`, an existing table is dropped first.
pub fn create(conn: &mut Connection, indices: IndexSet, fresh: bool) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    if fresh {
        tx.execute_batch("DROP TABLE IF EXISTS triple")?;
    }
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS triple(
            s TEXT NOT NULL,
            p TEXT NOT NULL,
            o TEXT NOT NULL,
            c TEXT NOT NULL DEFAULT '',
            UNIQUE(s, p, o, c) ON CONFLICT IGNORE
        )",
    )?;
    for sql in indices.statements() {
        tx.execute_batch(sql)?;
    }
    tx.commit()
}

/// Names of the indices currently defined on the triple table.
pub fn index_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([TRIPLE_TABLE], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}
