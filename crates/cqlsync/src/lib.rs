//! Reconcile a declared data model against a live CQL keyspace.
//!
//! Declare entities with [`Entity::builder`], collect them in a [`Model`],
//! then let a [`Reconciler`] compare them with what the [`Catalog`] reports
//! and apply the difference through a [`Session`]:
//!
//! ```ignore
//! let user = Entity::builder("user")
//!     .key::<uuid::Uuid>("id")
//!     .column::<String>("name")
//!     .column::<BTreeSet<String>>("tags")
//!     .build()?;
//!
//! let model = Model::from_entities([user])?;
//! let report = Reconciler::new(&catalog, "app").run(&model, &session).await?;
//! println!("{}", report.plan);
//! ```
//!
//! # What gets changed
//!
//! - missing tables are created with `CREATE TABLE IF NOT EXISTS`;
//! - live columns the entity no longer declares are dropped;
//! - columns whose type changed are altered;
//! - declared columns missing from the table are added.
//!
//! Primary keys are never altered. A differing live key is reported as a
//! [`KeyMismatch`] and handled per [`KeyMismatchPolicy`].

mod ddl;
mod diff;
mod driver;
mod entity;
mod error;
mod executor;
mod live;
pub mod maintenance;
mod session;
pub mod snapshot;
mod types;

pub use ddl::{
    add_column_sql, alter_column_type_sql, create_table_sql, drop_column_sql, drop_keyspace_sql,
    drop_table_sql, truncate_table_sql,
};
pub use diff::{Change, KeyMismatch, Plan, TablePlan, reconcile};
pub use driver::{KeyMismatchPolicy, Options, Reconciler, RunReport};
pub use entity::{Entity, EntityBuilder, Model, UnresolvedPolicy};
pub use error::{CatalogError, Error, SessionError};
pub use executor::{DEFAULT_STATEMENT_TIMEOUT, ExecutionReport, Executor, Outcome};
pub use live::{LiveTable, normalize_type_name};
pub use maintenance::{BulkReport, Maintenance};
pub use session::{BoxFuture, Catalog, Session};
pub use snapshot::{KeyspaceSnapshot, SnapshotCatalog};
pub use types::{CollectionKind, ColumnType, Field, FieldKind, FieldType, ScalarType, resolve};

pub type Result<T> = std::result::Result<T, Error>;
