//! Store configuration.
//!
//! Configuration is loaded from environment variables or assembled with the
//! builder methods on [`StoreConfig`].
//!
//! # Environment Variables
//!
//! - `RDFLITE_LOCATION`: Path of the database file (default: in-memory)
//! - `RDFLITE_KEYWORD`: Maintain the keyword index (default: `false`)
//! - `RDFLITE_NEW`: Drop existing tables on open (default: `false`)
//! - `RDFLITE_REASONING`: Expand predicates to their `rdfs:subPropertyOf`
//!   descendants in queries that do not choose (default: `false`)
//! - `RDFLITE_INDICES`: Comma-separated optional indices, any of `s`, `p`,
//!   `o`, `so`, `op` (default: none)
//!
//! # Invariants
//!
//! - `location == None` means an in-memory store, which is always fresh
//! - the `(s, p)` and `(p, o)` indices exist regardless of `indices`

use std::path::PathBuf;

use crate::storage::IndexSet;

/// Options for opening a [`TripleStore`](crate::storage::TripleStore).
#[derive(Debug, Default)]
pub struct StoreConfig {
    /// Database file. `None` opens an in-memory database.
    pub location: Option<PathBuf>,
    /// Whether literal text is tokenized into the keyword index.
    pub keyword_search: bool,
    /// Whether existing tables are dropped before use.
    pub fresh: bool,
    /// Default for [`Query::reasoning`](crate::query::Query::reasoning).
    pub reasoning: bool,
    /// Optional indices to create on the triple table.
    pub indices: IndexSet,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl StoreConfig {
    pub const LOCATION_VAR: &'static str = "RDFLITE_LOCATION";
    pub const KEYWORD_VAR: &'static str = "RDFLITE_KEYWORD";
    pub const FRESH_VAR: &'static str = "RDFLITE_NEW";
    pub const INDICES_VAR: &'static str = "RDFLITE_INDICES";
    pub const REASONING_VAR: &'static str = "RDFLITE_REASONING";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a flag is not a boolean or an index name is
    /// unknown.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let location = lookup(Self::LOCATION_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let keyword_search = Self::load_flag(&lookup, Self::KEYWORD_VAR)?;
        let fresh = Self::load_flag(&lookup, Self::FRESH_VAR)?;
        let reasoning = Self::load_flag(&lookup, Self::REASONING_VAR)?;
        let indices = match lookup(Self::INDICES_VAR) {
            Some(value) => IndexSet::parse(&value).map_err(|unknown| ConfigError::InvalidValue {
                name: Self::INDICES_VAR.to_owned(),
                message: format!("unknown index '{unknown}' (expected s, p, o, so or op)"),
            })?,
            None => IndexSet::default(),
        };

        Ok(Self {
            location,
            keyword_search,
            fresh,
            reasoning,
            indices,
        })
    }

    /// Load a boolean flag. Unset means `false`.
    fn load_flag(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<bool, ConfigError> {
        let Some(value) = lookup(name) else {
            return Ok(false);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "" | "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: name.to_owned(),
                message: format!("'{value}' is not a boolean"),
            }),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub const fn with_keyword_search(mut self, enabled: bool) -> Self {
        self.keyword_search = enabled;
        self
    }

    #[must_use]
    pub const fn with_fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    #[must_use]
    pub const fn with_reasoning(mut self, enabled: bool) -> Self {
        self.reasoning = enabled;
        self
    }

    #[must_use]
    pub const fn with_indices(mut self, indices: IndexSet) -> Self {
        self.indices = indices;
        self
    }
}
