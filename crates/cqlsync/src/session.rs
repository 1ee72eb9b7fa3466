//! The two things cqlsync needs from a cluster driver.
//!
//! [`Catalog`] reads schema metadata, [`Session`] runs statements. Both are
//! object safe and return boxed futures so any driver can sit behind them.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{CatalogError, SessionError};
use crate::live::LiveTable;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to the cluster's schema metadata.
pub trait Catalog: Send + Sync {
    /// Describe a table, or `None` if it does not exist.
    fn describe_table<'a>(
        &'a self,
        keyspace: &'a str,
        table: &'a str,
    ) -> BoxFuture<'a, Result<Option<LiveTable>, CatalogError>>;

    /// Names of every table in the keyspace.
    fn table_names<'a>(&'a self, keyspace: &'a str)
    -> BoxFuture<'a, Result<Vec<String>, CatalogError>>;

    /// Whether the keyspace exists.
    fn has_keyspace<'a>(&'a self, keyspace: &'a str) -> BoxFuture<'a, Result<bool, CatalogError>>;
}

/// Something that executes statements.
///
/// Implementations report "object already exists" as
/// [`SessionError::AlreadyExists`] so callers can treat it as a benign race.
pub trait Session: Send + Sync {
    /// Execute one statement, scoped to `keyspace` when given.
    fn execute<'a>(
        &'a self,
        keyspace: Option<&'a str>,
        statement: &'a str,
    ) -> BoxFuture<'a, Result<(), SessionError>>;
}

impl<T: Catalog + ?Sized> Catalog for Arc<T> {
    fn describe_table<'a>(
        &'a self,
        keyspace: &'a str,
        table: &'a str,
    ) -> BoxFuture<'a, Result<Option<LiveTable>, CatalogError>> {
        (**self).describe_table(keyspace, table)
    }

    fn table_names<'a>(
        &'a self,
        keyspace: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, CatalogError>> {
        (**self).table_names(keyspace)
    }

    fn has_keyspace<'a>(&'a self, keyspace: &'a str) -> BoxFuture<'a, Result<bool, CatalogError>> {
        (**self).has_keyspace(keyspace)
    }
}

impl<T: Session + ?Sized> Session for Arc<T> {
    fn execute<'a>(
        &'a self,
        keyspace: Option<&'a str>,
        statement: &'a str,
    ) -> BoxFuture<'a, Result<(), SessionError>> {
        (**self).execute(keyspace, statement)
    }
}
