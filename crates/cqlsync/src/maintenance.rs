//! Keyspace-wide housekeeping: listing, bulk drop/truncate and scripts.

use std::path::Path;

use crate::ddl;
use crate::error::SessionError;
use crate::executor::{ExecutionReport, Executor};
use crate::session::{Catalog, Session};
use crate::{Error, Result};

/// Split a statement script into statements.
///
/// Statements are separated by blank lines. The lines of one statement are
/// trimmed and joined with a single space.
///
/// ```text
/// CREATE TABLE a (        ->  "CREATE TABLE a ( id int PRIMARY KEY );"
///   id int PRIMARY KEY
/// );
///
/// DROP TABLE b;           ->  "DROP TABLE b;"
/// ```
pub fn split_script(source: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                statements.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        statements.push(current.join(" "));
    }

    statements
}

/// Read and split a statement script.
pub fn read_script(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let statements = split_script(&source);
    tracing::debug!(path = %path.display(), statements = statements.len(), "read script");
    Ok(statements)
}

/// Tables touched by a bulk operation.
#[derive(Debug, Default)]
pub struct BulkReport {
    pub succeeded: Vec<String>,
    /// Tables whose statement failed, with the failure.
    pub failed: Vec<(String, SessionError)>,
}

impl BulkReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Housekeeping operations over a catalog and a session.
pub struct Maintenance<'a, C: Catalog + ?Sized, S: Session + ?Sized> {
    catalog: &'a C,
    executor: Executor<'a, S>,
}

impl<'a, C: Catalog + ?Sized, S: Session + ?Sized> Maintenance<'a, C, S> {
    pub fn new(catalog: &'a C, executor: Executor<'a, S>) -> Self {
        Self { catalog, executor }
    }

    async fn tables(&self, keyspace: &str) -> Result<Vec<String>> {
        self.catalog
            .table_names(keyspace)
            .await
            .map_err(|source| Error::Catalog {
                target: keyspace.to_string(),
                source,
            })
    }

    pub async fn table_count(&self, keyspace: &str) -> Result<usize> {
        Ok(self.tables(keyspace).await?.len())
    }

    pub async fn contains_table(&self, keyspace: &str, table: &str) -> Result<bool> {
        let live = self
            .catalog
            .describe_table(keyspace, table)
            .await
            .map_err(|source| Error::Catalog {
                target: format!("{}.{}", keyspace, table),
                source,
            })?;
        Ok(live.is_some())
    }

    pub async fn drop_keyspace(&self, keyspace: &str) -> Result<()> {
        tracing::info!(%keyspace, "dropping keyspace");
        let statement = ddl::drop_keyspace_sql(keyspace);
        self.executor
            .execute(None, &statement)
            .await
            .map_err(|source| Error::Execution { statement, source })?;
        Ok(())
    }

    /// Drop every table in the keyspace. Failures are logged and collected.
    pub async fn drop_all_tables(&self, keyspace: &str) -> Result<BulkReport> {
        let tables = self.tables(keyspace).await?;
        tracing::info!(%keyspace, tables = tables.len(), "dropping all tables");
        Ok(self
            .for_each_table(tables, |table| ddl::drop_table_sql(keyspace, table))
            .await)
    }

    /// Truncate every table in the keyspace. Failures are logged and collected.
    pub async fn truncate_all_tables(&self, keyspace: &str) -> Result<BulkReport> {
        let tables = self.tables(keyspace).await?;
        tracing::info!(%keyspace, tables = tables.len(), "truncating all tables");
        Ok(self
            .for_each_table(tables, |table| ddl::truncate_table_sql(keyspace, table))
            .await)
    }

    async fn for_each_table(
        &self,
        tables: Vec<String>,
        statement_for: impl Fn(&str) -> String,
    ) -> BulkReport {
        let mut report = BulkReport::default();
        for table in tables {
            let statement = statement_for(&table);
            match self.executor.execute(None, &statement).await {
                Ok(_) => report.succeeded.push(table),
                Err(error) => {
                    tracing::error!(%table, %error, "bulk statement failed");
                    report.failed.push((table, error));
                }
            }
        }
        report
    }

    /// Split a script and execute it in order, stopping at the first failure.
    pub async fn execute_script(
        &self,
        keyspace: Option<&str>,
        source: &str,
    ) -> Result<ExecutionReport> {
        let statements = split_script(source);
        tracing::debug!(statements = statements.len(), "executing script");
        self.executor.execute_all(keyspace, &statements).await
    }

    /// Read a script file and execute it like [`Maintenance::execute_script`].
    pub async fn execute_script_file(
        &self,
        keyspace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<ExecutionReport> {
        let statements = read_script(path)?;
        self.executor.execute_all(keyspace, &statements).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_script() {
        let source = "CREATE TABLE a (\n  id int PRIMARY KEY\n);\n\n\n  \nDROP TABLE b;\nTRUNCATE c;";
        assert_eq!(
            split_script(source),
            [
                "CREATE TABLE a ( id int PRIMARY KEY );",
                "DROP TABLE b; TRUNCATE c;"
            ]
        );
    }

    #[test]
    fn test_split_script_trailing_statement() {
        assert_eq!(split_script("\n\nSELECT 1;\n"), ["SELECT 1;"]);
        assert!(split_script(" \n\t\n").is_empty());
    }
}
