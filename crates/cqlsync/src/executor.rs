//! Traced statement execution.
//!
//! Wraps a [`Session`] and runs every statement inside a
//! `tracing::debug_span!`, with a per-statement timeout.

use std::time::Duration;

use tracing::Instrument;

use crate::error::SessionError;
use crate::session::Session;
use crate::{Error, Result};

/// Timeout applied to each statement unless configured otherwise.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// How a single statement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The session reported the object as already existing.
    AlreadyExists,
}

/// Statements run by [`Executor::execute_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Statements that were applied.
    pub applied: Vec<String>,
    /// Statements skipped because their object already existed.
    pub already_existing: Vec<String>,
}

/// A traced statement executor.
///
/// # Example
///
/// ```ignore
/// let executor = Executor::new(&session).with_timeout(Duration::from_secs(5));
/// executor.execute_all(Some("app"), &statements).await?;
/// ```
pub struct Executor<'s, S: Session + ?Sized> {
    session: &'s S,
    timeout: Duration,
}

impl<'s, S: Session + ?Sized> Executor<'s, S> {
    pub fn new(session: &'s S) -> Self {
        Self {
            session,
            timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }

    /// Set the per-statement timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute one statement.
    ///
    /// "Already exists" is logged and reported as [`Outcome::AlreadyExists`];
    /// every other failure, including the timeout, is returned.
    pub async fn execute(
        &self,
        keyspace: Option<&str>,
        statement: &str,
    ) -> std::result::Result<Outcome, SessionError> {
        let span = tracing::debug_span!(
            "cql.execute",
            keyspace = keyspace.unwrap_or_default(),
            statement = %statement,
            outcome = tracing::field::Empty,
        );

        let result = tokio::time::timeout(self.timeout, self.session.execute(keyspace, statement))
            .instrument(span.clone())
            .await;

        match result {
            Err(_elapsed) => {
                span.record("outcome", "timeout");
                Err(SessionError::Timeout(self.timeout))
            }
            Ok(Ok(())) => {
                span.record("outcome", "applied");
                Ok(Outcome::Applied)
            }
            Ok(Err(SessionError::AlreadyExists(message))) => {
                span.record("outcome", "already_exists");
                span.in_scope(|| {
                    tracing::warn!(%statement, %message, "object already exists, continuing");
                });
                Ok(Outcome::AlreadyExists)
            }
            Ok(Err(e)) => {
                span.record("outcome", "failed");
                Err(e)
            }
        }
    }

    /// Execute statements in order, stopping at the first failure.
    ///
    /// Statements before the failing one stay applied.
    pub async fn execute_all(
        &self,
        keyspace: Option<&str>,
        statements: &[String],
    ) -> Result<ExecutionReport> {
        let mut report = ExecutionReport::default();
        for statement in statements {
            match self.execute(keyspace, statement).await {
                Ok(Outcome::Applied) => report.applied.push(statement.clone()),
                Ok(Outcome::AlreadyExists) => report.already_existing.push(statement.clone()),
                Err(source) => {
                    tracing::error!(
                        %statement,
                        error = %source,
                        applied = report.applied.len(),
                        remaining = statements.len() - report.applied.len() - report.already_existing.len() - 1,
                        "statement failed, aborting"
                    );
                    return Err(Error::Execution {
                        statement: statement.clone(),
                        source,
                    });
                }
            }
        }
        Ok(report)
    }
}
