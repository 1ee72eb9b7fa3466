//! The reconciliation run.
//!
//! [`Reconciler::plan`] queries the catalog for every declared entity and
//! collects the changes; [`Reconciler::run`] then executes them in order.
//!
//! Failure policy:
//!
//! - a catalog failure for any entity aborts the whole run before anything is
//!   executed;
//! - the first failing statement aborts the rest of the run, across tables.
//!   Statements already applied are kept.
//!
//! # Example
//!
//! ```ignore
//! let reconciler = Reconciler::new(&catalog, "app");
//! let report = reconciler.run(&model, &session).await?;
//! println!("{}", report.plan);
//! ```

use std::time::Duration;

use tracing::Instrument;

use crate::diff::{self, Plan};
use crate::entity::Model;
use crate::executor::{DEFAULT_STATEMENT_TIMEOUT, ExecutionReport, Executor};
use crate::session::{Catalog, Session};
use crate::{Error, Result};

/// What to do when a live primary key differs from the declared one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMismatchPolicy {
    /// Log a warning and reconcile the columns anyway.
    #[default]
    Warn,
    /// Abort the run before executing anything.
    Fail,
}

/// Run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Timeout for each statement.
    pub statement_timeout: Duration,
    pub key_mismatch: KeyMismatchPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
            key_mismatch: KeyMismatchPolicy::default(),
        }
    }
}

/// Outcome of [`Reconciler::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// The plan that was executed.
    pub plan: Plan,
    /// What happened to its statements.
    pub execution: ExecutionReport,
}

/// Reconciles a declared model against one keyspace.
pub struct Reconciler<'c, C: Catalog + ?Sized> {
    catalog: &'c C,
    keyspace: String,
    options: Options,
}

impl<'c, C: Catalog + ?Sized> Reconciler<'c, C> {
    pub fn new(catalog: &'c C, keyspace: impl Into<String>) -> Self {
        Self {
            catalog,
            keyspace: keyspace.into(),
            options: Options::default(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Compute the changes for every entity of `model`.
    ///
    /// The catalog is queried afresh on every call.
    pub async fn plan(&self, model: &Model) -> Result<Plan> {
        let span = tracing::info_span!(
            "cql.plan",
            keyspace = %self.keyspace,
            entities = model.len(),
        );
        self.plan_inner(model).instrument(span).await
    }

    async fn plan_inner(&self, model: &Model) -> Result<Plan> {
        let keyspace = self.keyspace.as_str();

        let exists = self
            .catalog
            .has_keyspace(keyspace)
            .await
            .map_err(|source| Error::Catalog {
                target: keyspace.to_string(),
                source,
            })?;
        if !exists {
            return Err(Error::UnknownKeyspace(keyspace.to_string()));
        }

        let mut tables = Vec::with_capacity(model.len());
        for entity in model {
            let live = self
                .catalog
                .describe_table(keyspace, entity.name())
                .await
                .map_err(|source| Error::Catalog {
                    target: format!("{}.{}", keyspace, entity.name()),
                    source,
                })?;

            let table_plan = diff::reconcile(entity, live.as_ref());

            if let Some(mismatch) = &table_plan.key_mismatch {
                tracing::warn!(
                    table = %table_plan.table,
                    declared = ?mismatch.declared,
                    live = ?mismatch.live,
                    "primary key differs from the live table; primary keys are never altered"
                );
                if self.options.key_mismatch == KeyMismatchPolicy::Fail {
                    return Err(Error::PrimaryKeyMismatch {
                        table: table_plan.table.clone(),
                        declared: mismatch.declared.clone(),
                        live: mismatch.live.clone(),
                    });
                }
            }

            tracing::debug!(
                table = %table_plan.table,
                exists = live.is_some(),
                changes = table_plan.changes.len(),
                "reconciled"
            );
            tables.push(table_plan);
        }

        Ok(Plan {
            keyspace: self.keyspace.clone(),
            tables,
        })
    }

    /// Plan, then execute every statement in the keyspace.
    pub async fn run<S: Session + ?Sized>(&self, model: &Model, session: &S) -> Result<RunReport> {
        let plan = self.plan(model).await?;
        let statements = plan.statements();

        if statements.is_empty() {
            tracing::info!(keyspace = %self.keyspace, "schema is up to date");
        } else {
            tracing::info!(
                keyspace = %self.keyspace,
                statements = statements.len(),
                "applying schema changes"
            );
        }

        let executor = Executor::new(session).with_timeout(self.options.statement_timeout);
        let execution = executor
            .execute_all(Some(&self.keyspace), &statements)
            .await?;

        tracing::info!(
            keyspace = %self.keyspace,
            applied = execution.applied.len(),
            already_existing = execution.already_existing.len(),
            "reconciliation complete"
        );

        Ok(RunReport { plan, execution })
    }
}
