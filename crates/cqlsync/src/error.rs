use std::time::Duration;

use thiserror::Error;

use crate::types::FieldType;

#[derive(Debug, Error)]
pub enum Error {
    #[error("entity name must not be empty")]
    EmptyEntityName,

    #[error("entity {0} is declared more than once")]
    DuplicateEntity(String),

    #[error("entity {entity} declares no primary key")]
    NoPrimaryKey { entity: String },

    #[error("key {column} of entity {entity} is not a declared column")]
    MissingKeyColumn { entity: String, column: String },

    #[error("column {column} of entity {entity} has type {field_type}, which has no column type")]
    UnresolvableType {
        entity: String,
        column: String,
        field_type: FieldType,
    },

    #[error("catalog query for {target} failed")]
    Catalog {
        target: String,
        #[source]
        source: CatalogError,
    },

    #[error("keyspace {0} does not exist")]
    UnknownKeyspace(String),

    #[error(
        "primary key of {table} differs from the live table: declared ({}), live ({})",
        .declared.join(", "),
        .live.join(", ")
    )]
    PrimaryKeyMismatch {
        table: String,
        declared: Vec<String>,
        live: Vec<String>,
    },

    #[error("statement failed: {statement}")]
    Execution {
        statement: String,
        #[source]
        source: SessionError,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid snapshot: {0}")]
    Snapshot(String),
}

/// Errors reported by a [`Catalog`](crate::Catalog).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    #[error("catalog query failed: {0}")]
    Query(String),
}

/// Errors reported by a [`Session`](crate::Session).
#[derive(Debug, Error)]
pub enum SessionError {
    /// The object a statement creates is already there.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Failed(String),
}
