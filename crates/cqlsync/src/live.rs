//! Live table descriptions, as reported by the catalog.

use indexmap::IndexMap;

use crate::entity::Entity;

/// A snapshot of one table's schema in the keyspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveTable {
    /// Table name.
    pub name: String,
    /// Column name to normalized native type name, in catalog order.
    pub columns: IndexMap<String, String>,
    /// Primary key columns, partition key first.
    pub primary_key: Vec<String>,
}

impl LiveTable {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_lowercase(),
            columns: IndexMap::new(),
            primary_key: Vec::new(),
        }
    }

    /// Add a column with its native type name as the catalog spells it.
    pub fn column(mut self, name: impl AsRef<str>, native_type: impl AsRef<str>) -> Self {
        self.columns.insert(
            name.as_ref().to_lowercase(),
            normalize_type_name(native_type.as_ref()),
        );
        self
    }

    /// Set the primary key columns.
    pub fn primary_key<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.primary_key = keys.into_iter().map(|k| k.as_ref().to_lowercase()).collect();
        self
    }

    pub fn column_type(&self, name: &str) -> Option<&str> {
        self.columns.get(name).map(String::as_str)
    }

    /// The table as it looks once `entity` has been fully applied.
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            name: entity.name().to_string(),
            columns: entity
                .columns()
                .iter()
                .map(|(name, ty)| (name.clone(), ty.name()))
                .collect(),
            primary_key: entity.keys().to_vec(),
        }
    }
}

/// Normalize a native type name so it compares equal to [`ColumnType::name`].
///
/// Lower-cases, drops whitespace and folds the `varchar` alias into `text`:
/// `"SET<varchar>"` becomes `"set<text>"`, `"map<text, int>"` becomes
/// `"map<text,int>"`.
///
/// [`ColumnType::name`]: crate::ColumnType::name
pub fn normalize_type_name(native: &str) -> String {
    let compact: String = native
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    compact.replace("varchar", "text")
}
