//! Declared entities.
//!
//! An [`Entity`] is the declared schema of one table: its name, its columns
//! with their resolved [`ColumnType`]s, and its primary key. Entities are
//! declared explicitly with [`Entity::builder`]:
//!
//! ```ignore
//! let users = Entity::builder("users")
//!     .key::<Uuid>("id")
//!     .column::<String>("name")
//!     .column::<BTreeSet<String>>("tags")
//!     .build()?;
//! ```
//!
//! Entity, column and key names are lower-cased. The primary key is one flat list, in
//! declaration order.

use indexmap::IndexMap;

use crate::types::{self, ColumnType, Field, FieldType};
use crate::{Error, Result};

/// What to do with a field whose type has no column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Refuse to build the entity.
    #[default]
    Fail,
    /// Leave the column out of the entity and log a warning.
    Skip,
}

/// The declared schema of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    name: String,
    columns: IndexMap<String, ColumnType>,
    keys: Vec<String>,
}

impl Entity {
    /// Start declaring an entity.
    pub fn builder(name: impl Into<String>) -> EntityBuilder {
        EntityBuilder::new(name)
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns, in declaration order.
    pub fn columns(&self) -> &IndexMap<String, ColumnType> {
        &self.columns
    }

    /// Primary key columns, in key order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn column_type(&self, name: &str) -> Option<&ColumnType> {
        self.columns.get(name)
    }
}

/// Builder for [`Entity`].
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    name: String,
    fields: Vec<(String, FieldType)>,
    keys: Vec<String>,
    unresolved: UnresolvedPolicy,
}

impl EntityBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            keys: Vec::new(),
            unresolved: UnresolvedPolicy::default(),
        }
    }

    /// Declare a column of Rust type `T`.
    pub fn column<T: Field>(self, name: impl AsRef<str>) -> Self {
        self.field(name, T::field_type())
    }

    /// Declare a column of Rust type `T` and append it to the primary key.
    pub fn key<T: Field>(self, name: impl AsRef<str>) -> Self {
        self.key_field(name, T::field_type())
    }

    /// Declare a column by its field type.
    ///
    /// Declaring the same name twice keeps the first position and the last type.
    pub fn field(mut self, name: impl AsRef<str>, field_type: FieldType) -> Self {
        let name = name.as_ref().to_lowercase();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = field_type,
            None => self.fields.push((name, field_type)),
        }
        self
    }

    /// Declare a column by its field type and append it to the primary key.
    pub fn key_field(self, name: impl AsRef<str>, field_type: FieldType) -> Self {
        let name = name.as_ref().to_lowercase();
        self.field(&name, field_type).keys([name])
    }

    /// Append already-declared (or later-declared) columns to the primary key.
    pub fn keys<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().to_lowercase();
            if !self.keys.contains(&name) {
                self.keys.push(name);
            }
        }
        self
    }

    /// Choose what happens to fields whose type has no column type.
    pub fn unresolved(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved = policy;
        self
    }

    /// Resolve every field and validate the primary key.
    pub fn build(self) -> Result<Entity> {
        let name = self.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(Error::EmptyEntityName);
        }

        let mut columns = IndexMap::with_capacity(self.fields.len());
        for (column, field_type) in self.fields {
            match types::resolve(&field_type) {
                Some(column_type) => {
                    columns.insert(column, column_type);
                }
                None => match self.unresolved {
                    UnresolvedPolicy::Fail => {
                        return Err(Error::UnresolvableType {
                            entity: name,
                            column,
                            field_type,
                        });
                    }
                    UnresolvedPolicy::Skip => {
                        tracing::warn!(
                            entity = %name,
                            column = %column,
                            field_type = %field_type,
                            "skipping column with no column type"
                        );
                    }
                },
            }
        }

        if self.keys.is_empty() {
            return Err(Error::NoPrimaryKey { entity: name });
        }
        if let Some(missing) = self.keys.iter().find(|k| !columns.contains_key(*k)) {
            return Err(Error::MissingKeyColumn {
                entity: name,
                column: missing.clone(),
            });
        }

        Ok(Entity {
            name,
            columns,
            keys: self.keys,
        })
    }
}

/// The full declared model: entities with unique names, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    entities: Vec<Entity>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model, rejecting duplicate entity names.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Result<Self> {
        let mut model = Self::new();
        for entity in entities {
            model.push(entity)?;
        }
        Ok(model)
    }

    /// Add an entity. Fails if an entity with the same name is already declared.
    pub fn push(&mut self, entity: Entity) -> Result<()> {
        if self.get(entity.name()).is_some() {
            return Err(Error::DuplicateEntity(entity.name().to_string()));
        }
        self.entities.push(entity);
        Ok(())
    }

    /// Look up an entity by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        let name = name.to_lowercase();
        self.entities.iter().find(|e| e.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
