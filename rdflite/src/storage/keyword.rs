//! Keyword index over literal objects.
//!
//! The index maps lowercase word tokens to the `(subject, object)` pairs whose
//! literal text contains them.
//!
//! # Table Format
//!
//! `keyword(s, o, term)`, all text, unique over `(term, s, o)`. `s` and `o` are
//! in lexical form so that entries can be pruned against the triple table once
//! the statements they came from are deleted.
//!
//! # Matching
//!
//! A search text is tokenized the same way as indexed text; a subject matches
//! when it has entries for every token.

use rusqlite::{Connection, params, params_from_iter};

use super::backend::KeywordSubquery;

/// Keyword index stored next to the triple table.
#[derive(Debug, Default)]
pub struct KeywordIndex;

impl KeywordIndex {
    /// Create the keyword table if it does not exist. With `fresh`, drop it first.
    pub fn create(conn: &Connection, fresh: bool) -> rusqlite::Result<Self> {
        if fresh {
            conn.execute_batch("DROP TABLE IF EXISTS keyword")?;
        }
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS keyword(
                s TEXT NOT NULL,
                o TEXT NOT NULL,
                term TEXT NOT NULL,
                UNIQUE(term, s, o) ON CONFLICT IGNORE
            );
            CREATE INDEX IF NOT EXISTS keyword_so ON keyword(s, o);",
        )?;
        Ok(Self)
    }

    /// Index `text` as the literal object `object` of `subject`.
    ///
    /// Returns the number of tokens indexed.
    pub fn index(
        &self,
        conn: &Connection,
        subject: &str,
        object: &str,
        text: &str,
    ) -> rusqlite::Result<usize> {
        let tokens = tokenize(text);
        let mut stmt = conn.prepare_cached("INSERT INTO keyword(s, o, term) VALUES (?1, ?2, ?3)")?;
        for token in &tokens {
            stmt.execute(params![subject, object, token])?;
        }
        Ok(tokens.len())
    }

    /// Subjects with entries for every token of `text`, sorted and distinct.
    pub fn search(&self, conn: &Connection, text: &str) -> rusqlite::Result<Vec<String>> {
        let subquery = Self::subquery(text);
        let mut stmt = conn.prepare(&format!("{} ORDER BY s", subquery.sql))?;
        let subjects = stmt
            .query_map(params_from_iter(subquery.params.iter()), |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(subjects)
    }

    /// The `SELECT` behind [`search`](Self::search), one bound token per term.
    ///
    /// A text without tokens selects nothing.
    #[must_use]
    pub fn subquery(text: &str) -> KeywordSubquery {
        let tokens = tokenize(text);
        let sql = if tokens.is_empty() {
            "SELECT s FROM keyword WHERE 0".to_owned()
        } else {
            vec!["SELECT s FROM keyword WHERE term = ?"; tokens.len()].join(" INTERSECT ")
        };
        KeywordSubquery {
            sql,
            params: tokens,
        }
    }

    /// Drop entries whose `(s, o)` pair no longer occurs in the triple table.
    pub fn prune(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "DELETE FROM keyword WHERE NOT EXISTS (
                SELECT 1 FROM triple WHERE triple.s = keyword.s AND triple.o = keyword.o
            )",
            [],
        )
    }

    /// Remove every entry.
    pub fn clear(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch("DELETE FROM keyword")
    }
}

/// Lowercase alphanumeric words of `text`, deduplicated, in first-seen order.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let token = word.to_lowercase();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}
