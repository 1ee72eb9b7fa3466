//! Facet types for the cqlsync configuration file, `.config/cqlsync.styx`.
//!
//! ```styx
//! keyspace app
//! statement-timeout-ms 5000
//! key-mismatch fail
//! snapshot "snapshots/app.json"
//! entities {
//!   users {
//!     keys id
//!     columns {
//!       id uuid
//!       name string
//!       tags "set<string>"
//!     }
//!   }
//!   events {
//!     keys "tenant, at"
//!     columns { tenant string, at timestamp, payload "list<i64>" }
//!   }
//! }
//! ```
//!
//! Column types use the spellings accepted by [`FieldType::parse`].

use std::time::Duration;

use cqlsync::{Entity, FieldType, KeyMismatchPolicy, Model, Options, UnresolvedPolicy};
use facet::Facet;
use indexmap::IndexMap;

/// The whole configuration file.
#[derive(Debug, Clone, Facet)]
#[facet(rename_all = "kebab-case")]
pub struct Config {
    /// Keyspace the model is reconciled against.
    pub keyspace: String,

    /// Per-statement timeout, in milliseconds.
    pub statement_timeout_ms: Option<u64>,

    /// `fail` (default) or `skip`.
    pub unresolved: Option<String>,

    /// `warn` (default) or `fail`.
    pub key_mismatch: Option<String>,

    /// JSON keyspace snapshot used for offline planning, relative to the
    /// directory holding `.config/`.
    pub snapshot: Option<String>,

    /// Declared entities, by table name.
    #[facet(default)]
    pub entities: IndexMap<String, EntityDecl>,
}

/// One declared entity.
#[derive(Debug, Clone, Facet)]
pub struct EntityDecl {
    /// Primary key columns, separated by commas or whitespace.
    pub keys: String,

    /// Column name to field type.
    pub columns: IndexMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no .config/cqlsync.styx found in current directory or any parent")]
    NotFound,

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("invalid {setting} {value:?}, expected one of: {expected}")]
    InvalidSetting {
        setting: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Model(#[from] cqlsync::Error),
}

impl Config {
    /// Parse a configuration from styx source.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        facet_styx::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn unresolved_policy(&self) -> Result<UnresolvedPolicy, ConfigError> {
        match self.unresolved.as_deref() {
            None | Some("fail") => Ok(UnresolvedPolicy::Fail),
            Some("skip") => Ok(UnresolvedPolicy::Skip),
            Some(other) => Err(ConfigError::InvalidSetting {
                setting: "unresolved",
                value: other.to_string(),
                expected: "fail, skip",
            }),
        }
    }

    pub fn key_mismatch_policy(&self) -> Result<KeyMismatchPolicy, ConfigError> {
        match self.key_mismatch.as_deref() {
            None | Some("warn") => Ok(KeyMismatchPolicy::Warn),
            Some("fail") => Ok(KeyMismatchPolicy::Fail),
            Some(other) => Err(ConfigError::InvalidSetting {
                setting: "key-mismatch",
                value: other.to_string(),
                expected: "warn, fail",
            }),
        }
    }

    /// Run settings, with defaults for everything left out.
    pub fn options(&self) -> Result<Options, ConfigError> {
        let defaults = Options::default();
        Ok(Options {
            statement_timeout: self
                .statement_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.statement_timeout),
            key_mismatch: self.key_mismatch_policy()?,
        })
    }

    /// Build the declared model, in file order.
    pub fn model(&self) -> Result<Model, ConfigError> {
        let policy = self.unresolved_policy()?;
        let mut model = Model::new();
        for (name, decl) in &self.entities {
            let entity = decl.to_entity(name, policy)?;
            tracing::debug!(
                entity = %name,
                columns = entity.columns().len(),
                "declared entity"
            );
            model.push(entity)?;
        }
        Ok(model)
    }
}

impl EntityDecl {
    pub fn key_names(&self) -> impl Iterator<Item = &str> {
        self.keys
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|k| !k.is_empty())
    }

    pub fn to_entity(&self, name: &str, policy: UnresolvedPolicy) -> cqlsync::Result<Entity> {
        self.columns
            .iter()
            .fold(Entity::builder(name), |builder, (column, spec)| {
                builder.field(column, FieldType::parse(spec))
            })
            .keys(self.key_names())
            .unresolved(policy)
            .build()
    }
}
