//! An in-memory catalog, optionally loaded from a JSON keyspace snapshot.
//!
//! ```json
//! {
//!   "keyspace": "app",
//!   "tables": [
//!     {
//!       "name": "users",
//!       "columns": { "id": "timeuuid", "name": "text" },
//!       "primary_key": ["id"]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use facet::Facet;
use indexmap::IndexMap;

use crate::error::CatalogError;
use crate::live::LiveTable;
use crate::session::{BoxFuture, Catalog};
use crate::{Error, Result};

/// Serialized form of one keyspace's tables.
#[derive(Debug, Clone, Facet)]
pub struct KeyspaceSnapshot {
    pub keyspace: String,
    #[facet(default)]
    pub tables: Vec<TableSnapshot>,
}

/// Serialized form of one table.
#[derive(Debug, Clone, Facet)]
pub struct TableSnapshot {
    pub name: String,
    /// Column name to native type name.
    pub columns: IndexMap<String, String>,
    #[facet(default)]
    pub primary_key: Vec<String>,
}

impl KeyspaceSnapshot {
    pub fn from_json(source: &str) -> Result<Self> {
        facet_json::from_str(source).map_err(|e| Error::Snapshot(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }
}

impl From<&TableSnapshot> for LiveTable {
    fn from(table: &TableSnapshot) -> Self {
        table
            .columns
            .iter()
            .fold(LiveTable::new(&table.name), |live, (name, ty)| {
                live.column(name, ty)
            })
            .primary_key(&table.primary_key)
    }
}

/// A [`Catalog`] backed by tables held in memory.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    keyspaces: IndexMap<String, IndexMap<String, LiveTable>>,
}

impl SnapshotCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty keyspace.
    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspaces.entry(keyspace.into()).or_default();
        self
    }

    /// Add or replace a table, creating its keyspace if needed.
    pub fn insert(&mut self, keyspace: impl Into<String>, table: LiveTable) {
        self.keyspaces
            .entry(keyspace.into())
            .or_default()
            .insert(table.name.clone(), table);
    }

    pub fn with_table(mut self, keyspace: impl Into<String>, table: LiveTable) -> Self {
        self.insert(keyspace, table);
        self
    }

    pub fn from_snapshot(snapshot: &KeyspaceSnapshot) -> Self {
        let mut catalog = Self::new().with_keyspace(&snapshot.keyspace);
        for table in &snapshot.tables {
            catalog.insert(&snapshot.keyspace, LiveTable::from(table));
        }
        catalog
    }

    fn keyspace(&self, keyspace: &str) -> Option<&IndexMap<String, LiveTable>> {
        self.keyspaces.get(keyspace)
    }
}

impl Catalog for SnapshotCatalog {
    fn describe_table<'a>(
        &'a self,
        keyspace: &'a str,
        table: &'a str,
    ) -> BoxFuture<'a, std::result::Result<Option<LiveTable>, CatalogError>> {
        let result = match self.keyspace(keyspace) {
            Some(tables) => Ok(tables.get(&table.to_lowercase()).cloned()),
            None => Err(CatalogError::Query(format!("unknown keyspace {}", keyspace))),
        };
        Box::pin(std::future::ready(result))
    }

    fn table_names<'a>(
        &'a self,
        keyspace: &'a str,
    ) -> BoxFuture<'a, std::result::Result<Vec<String>, CatalogError>> {
        let result = match self.keyspace(keyspace) {
            Some(tables) => Ok(tables.keys().cloned().collect()),
            None => Err(CatalogError::Query(format!("unknown keyspace {}", keyspace))),
        };
        Box::pin(std::future::ready(result))
    }

    fn has_keyspace<'a>(
        &'a self,
        keyspace: &'a str,
    ) -> BoxFuture<'a, std::result::Result<bool, CatalogError>> {
        Box::pin(std::future::ready(Ok(self.keyspaces.contains_key(keyspace))))
    }
}
