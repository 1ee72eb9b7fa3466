//! Schema reconciliation - compare a declared entity against its live table.
//!
//! [`reconcile`] produces the changes that bring one live table in line with
//! its declared [`Entity`]:
//!
//! - no live table: a single `CREATE TABLE IF NOT EXISTS`;
//! - otherwise the live columns are scanned in catalog order. A column the
//!   entity no longer declares is dropped, a column whose type name differs is
//!   altered, and every declared column the scan did not meet is added
//!   afterwards, in declaration order.
//!
//! Types are compared by canonical name, type arguments included, so
//! `set<text>` and `set<int>` differ.
//!
//! Primary keys are never changed. When the declared key differs from the live
//! one the plan records a [`KeyMismatch`] and emits nothing for it; the
//! driver decides whether that is fatal.
//!
//! ```text
//! users:
//!   - legacy
//!   + tags: set<text>
//! ```

use std::fmt;

use indexmap::IndexMap;

use crate::ddl;
use crate::entity::Entity;
use crate::live::LiveTable;
use crate::types::ColumnType;

/// A single schema change on one table.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Create the table.
    CreateTable(Entity),
    /// Drop a live column the entity no longer declares.
    DropColumn(String),
    /// Change a column's type.
    AlterColumnType {
        name: String,
        from: String,
        to: ColumnType,
    },
    /// Add a declared column the live table lacks.
    AddColumn { name: String, column_type: ColumnType },
}

impl Change {
    /// Generate the statement for this change.
    ///
    /// The `table_name` is required for column-level changes.
    pub fn to_sql(&self, table_name: &str) -> String {
        match self {
            Change::CreateTable(entity) => ddl::create_table_sql(entity),
            Change::DropColumn(name) => ddl::drop_column_sql(table_name, name),
            Change::AlterColumnType { name, to, .. } => {
                ddl::alter_column_type_sql(table_name, name, to)
            }
            Change::AddColumn { name, column_type } => {
                ddl::add_column_sql(table_name, name, column_type)
            }
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::CreateTable(entity) => write!(f, "+ table {}", entity.name()),
            Change::DropColumn(name) => write!(f, "- {}", name),
            Change::AlterColumnType { name, from, to } => {
                write!(f, "~ {}: {} -> {}", name, from, to)
            }
            Change::AddColumn { name, column_type } => write!(f, "+ {}: {}", name, column_type),
        }
    }
}

/// Declared and live primary keys of a table that disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMismatch {
    pub declared: Vec<String>,
    pub live: Vec<String>,
}

/// Changes for a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePlan {
    /// Table name.
    pub table: String,
    /// Changes, in execution order.
    pub changes: Vec<Change>,
    /// Set when the live primary key differs from the declared one.
    pub key_mismatch: Option<KeyMismatch>,
}

impl TablePlan {
    /// Returns true if the table needs no statement.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// The statements for this table, in execution order.
    pub fn statements(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.to_sql(&self.table)).collect()
    }
}

/// Compute the changes that bring `live` in line with `entity`.
///
/// `live` is `None` when the table does not exist.
pub fn reconcile(entity: &Entity, live: Option<&LiveTable>) -> TablePlan {
    let table = entity.name().to_string();

    let Some(live) = live else {
        return TablePlan {
            table,
            changes: vec![Change::CreateTable(entity.clone())],
            key_mismatch: None,
        };
    };

    let mut changes = Vec::new();
    let mut remaining: IndexMap<&str, &ColumnType> = entity
        .columns()
        .iter()
        .map(|(name, ty)| (name.as_str(), ty))
        .collect();

    for (name, live_type) in &live.columns {
        match remaining.shift_remove(name.as_str()) {
            None => changes.push(Change::DropColumn(name.clone())),
            Some(declared) if declared.name() == *live_type => {}
            Some(declared) => changes.push(Change::AlterColumnType {
                name: name.clone(),
                from: live_type.clone(),
                to: *declared,
            }),
        }
    }

    for (name, column_type) in remaining {
        changes.push(Change::AddColumn {
            name: name.to_string(),
            column_type: *column_type,
        });
    }

    let key_mismatch = (entity.keys() != live.primary_key.as_slice()).then(|| KeyMismatch {
        declared: entity.keys().to_vec(),
        live: live.primary_key.clone(),
    });

    TablePlan {
        table,
        changes,
        key_mismatch,
    }
}

/// The changes for a whole model against one keyspace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// Keyspace the plan applies to.
    pub keyspace: String,
    /// One entry per declared entity, in declaration order.
    pub tables: Vec<TablePlan>,
}

impl Plan {
    /// Returns true if no table needs a statement.
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(TablePlan::is_empty)
    }

    /// Count total number of changes.
    pub fn change_count(&self) -> usize {
        self.tables.iter().map(|t| t.changes.len()).sum()
    }

    /// Every statement of the plan as one flat list. Each table's statements
    /// stay contiguous and in order.
    pub fn statements(&self) -> Vec<String> {
        self.tables.iter().flat_map(TablePlan::statements).collect()
    }

    /// Tables whose live primary key differs from the declared one.
    pub fn key_mismatches(&self) -> impl Iterator<Item = (&str, &KeyMismatch)> {
        self.tables
            .iter()
            .filter_map(|t| t.key_mismatch.as_ref().map(|m| (t.table.as_str(), m)))
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            writeln!(f, "No changes detected.")?;
        } else {
            writeln!(f, "Changes detected:\n")?;
            for table in self.tables.iter().filter(|t| !t.is_empty()) {
                writeln!(f, "  {}:", table.table)?;
                for change in &table.changes {
                    writeln!(f, "    {}", change)?;
                }
            }
        }
        for (table, mismatch) in self.key_mismatches() {
            writeln!(
                f,
                "\n  {}: primary key ({}) differs from live ({}), not changed",
                table,
                mismatch.declared.join(", "),
                mismatch.live.join(", ")
            )?;
        }
        Ok(())
    }
}
