mod common;

use std::collections::BTreeSet;
use std::time::Duration;

use common::{RecordingSession, Reply};
use cqlsync::{
    BoxFuture, Catalog, CatalogError, Entity, Error, KeyMismatchPolicy, LiveTable, Model, Options,
    Reconciler, SessionError, SnapshotCatalog,
};

fn users() -> Entity {
    Entity::builder("users")
        .key::<uuid::Uuid>("id")
        .column::<String>("name")
        .column::<BTreeSet<String>>("tags")
        .build()
        .unwrap()
}

fn events() -> Entity {
    Entity::builder("events")
        .key::<String>("tenant")
        .key::<jiff::Timestamp>("at")
        .column::<Vec<i64>>("payload")
        .build()
        .unwrap()
}

fn model() -> Model {
    Model::from_entities([users(), events()]).unwrap()
}

/// A catalog that fails for one table.
struct FailingCatalog {
    inner: SnapshotCatalog,
    table: &'static str,
}

impl Catalog for FailingCatalog {
    fn describe_table<'a>(
        &'a self,
        keyspace: &'a str,
        table: &'a str,
    ) -> BoxFuture<'a, Result<Option<LiveTable>, CatalogError>> {
        if table == self.table {
            return Box::pin(async { Err(CatalogError::Unavailable("connection reset".into())) });
        }
        self.inner.describe_table(keyspace, table)
    }

    fn table_names<'a>(
        &'a self,
        keyspace: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, CatalogError>> {
        self.inner.table_names(keyspace)
    }

    fn has_keyspace<'a>(&'a self, keyspace: &'a str) -> BoxFuture<'a, Result<bool, CatalogError>> {
        self.inner.has_keyspace(keyspace)
    }
}

#[tokio::test]
async fn test_fresh_keyspace_creates_every_table() {
    let catalog = SnapshotCatalog::new().with_keyspace("app");
    let session = RecordingSession::new();

    let report = Reconciler::new(&catalog, "app")
        .run(&model(), &session)
        .await
        .unwrap();

    assert_eq!(
        session.statements(),
        [
            "CREATE TABLE IF NOT EXISTS users (\nid timeuuid,\nname text,\ntags set<text>,\nPRIMARY KEY (id)\n);",
            "CREATE TABLE IF NOT EXISTS events (\ntenant text,\nat timestamp,\npayload list<bigint>,\nPRIMARY KEY (tenant, at)\n);",
        ]
    );
    assert!(
        session
            .keyspaces()
            .iter()
            .all(|k| k.as_deref() == Some("app"))
    );
    assert_eq!(report.execution.applied.len(), 2);
    assert_eq!(report.plan.change_count(), 2);
}

#[tokio::test]
async fn test_existing_table_is_altered_in_place() {
    let live = LiveTable::new("users")
        .column("id", "timeuuid")
        .column("name", "int")
        .column("legacy", "text")
        .primary_key(["id"]);
    let catalog = SnapshotCatalog::new().with_table("app", live);
    let session = RecordingSession::new();

    let model = Model::from_entities([users()]).unwrap();
    Reconciler::new(&catalog, "app")
        .run(&model, &session)
        .await
        .unwrap();

    assert_eq!(
        session.statements(),
        [
            "ALTER TABLE users ALTER name TYPE text;",
            "ALTER TABLE users DROP legacy;",
            "ALTER TABLE users ADD tags SET<text>;",
        ]
    );
}

#[tokio::test]
async fn test_mixed_case_entity_matches_live_table() {
    let live = LiveTable::new("users")
        .column("id", "timeuuid")
        .column("name", "text")
        .column("legacy", "text")
        .primary_key(["id"]);
    let catalog = SnapshotCatalog::new().with_table("app", live);
    let session = RecordingSession::new();

    let entity = Entity::builder("Users")
        .key::<uuid::Uuid>("id")
        .column::<String>("name")
        .column::<BTreeSet<String>>("tags")
        .build()
        .unwrap();
    let model = Model::from_entities([entity]).unwrap();
    Reconciler::new(&catalog, "app")
        .run(&model, &session)
        .await
        .unwrap();

    assert_eq!(
        session.statements(),
        [
            "ALTER TABLE users DROP legacy;",
            "ALTER TABLE users ADD tags SET<text>;",
        ]
    );
}

#[tokio::test]
async fn test_up_to_date_keyspace_executes_nothing() {
    let catalog = SnapshotCatalog::new()
        .with_table("app", LiveTable::from_entity(&users()))
        .with_table("app", LiveTable::from_entity(&events()));
    let session = RecordingSession::new();

    let report = Reconciler::new(&catalog, "app")
        .run(&model(), &session)
        .await
        .unwrap();

    assert!(report.plan.is_empty());
    assert!(session.statements().is_empty());
    assert_eq!(report.plan.to_string(), "No changes detected.\n");
}

#[tokio::test]
async fn test_unknown_keyspace() {
    let catalog = SnapshotCatalog::new().with_keyspace("other");
    let session = RecordingSession::new();

    let err = Reconciler::new(&catalog, "app")
        .run(&model(), &session)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownKeyspace(ref ks) if ks == "app"));
    assert!(session.statements().is_empty());
}

#[tokio::test]
async fn test_catalog_failure_aborts_before_executing() {
    let catalog = FailingCatalog {
        inner: SnapshotCatalog::new().with_keyspace("app"),
        table: "events",
    };
    let session = RecordingSession::new();

    let err = Reconciler::new(&catalog, "app")
        .run(&model(), &session)
        .await
        .unwrap_err();

    match err {
        Error::Catalog { target, source } => {
            assert_eq!(target, "app.events");
            assert!(matches!(source, CatalogError::Unavailable(_)));
        }
        other => panic!("expected catalog error, got {other:?}"),
    }
    assert!(session.statements().is_empty());
}

#[tokio::test]
async fn test_key_mismatch_policies() {
    let live = LiveTable::new("users")
        .column("id", "timeuuid")
        .column("name", "text")
        .column("region", "text")
        .primary_key(["id", "region"]);
    let catalog = SnapshotCatalog::new().with_table("app", live);
    let model = Model::from_entities([users()]).unwrap();

    let session = RecordingSession::new();
    let report = Reconciler::new(&catalog, "app")
        .run(&model, &session)
        .await
        .unwrap();
    let mismatches: Vec<_> = report.plan.key_mismatches().collect();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].1.live, ["id", "region"]);
    assert_eq!(
        session.statements(),
        [
            "ALTER TABLE users DROP region;",
            "ALTER TABLE users ADD tags SET<text>;",
        ]
    );

    let session = RecordingSession::new();
    let err = Reconciler::new(&catalog, "app")
        .with_options(Options {
            key_mismatch: KeyMismatchPolicy::Fail,
            ..Options::default()
        })
        .run(&model, &session)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PrimaryKeyMismatch { ref table, .. } if table == "users"));
    assert!(session.statements().is_empty());
}

#[tokio::test]
async fn test_already_exists_is_not_fatal() {
    let catalog = SnapshotCatalog::new().with_keyspace("app");
    let session = RecordingSession::new().reply("TABLE IF NOT EXISTS users", Reply::AlreadyExists);

    let report = Reconciler::new(&catalog, "app")
        .run(&model(), &session)
        .await
        .unwrap();

    assert_eq!(report.execution.already_existing.len(), 1);
    assert_eq!(report.execution.applied.len(), 1);
    assert!(report.execution.applied[0].contains("events"));
}

#[tokio::test]
async fn test_first_failure_aborts_remaining_tables() {
    let catalog = SnapshotCatalog::new().with_keyspace("app");
    let session = RecordingSession::new().reply("users", Reply::Fail("invalid column type"));

    let err = Reconciler::new(&catalog, "app")
        .run(&model(), &session)
        .await
        .unwrap_err();

    match err {
        Error::Execution { statement, source } => {
            assert!(statement.starts_with("CREATE TABLE IF NOT EXISTS users"));
            assert!(matches!(source, SessionError::Failed(_)));
        }
        other => panic!("expected execution error, got {other:?}"),
    }
    assert_eq!(session.statements().len(), 1);
}

#[tokio::test]
async fn test_statement_timeout() {
    let catalog = SnapshotCatalog::new().with_keyspace("app");
    let session = RecordingSession::new().reply("users", Reply::Hang(Duration::from_secs(5)));

    let err = Reconciler::new(&catalog, "app")
        .with_options(Options {
            statement_timeout: Duration::from_millis(20),
            ..Options::default()
        })
        .run(&model(), &session)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Execution {
            source: SessionError::Timeout(_),
            ..
        }
    ));
    assert_eq!(session.statements().len(), 1);
}

#[tokio::test]
async fn test_plan_queries_catalog_every_time() {
    let mut catalog = SnapshotCatalog::new().with_keyspace("app");
    let model = Model::from_entities([users()]).unwrap();

    let first = Reconciler::new(&catalog, "app").plan(&model).await.unwrap();
    assert_eq!(first.change_count(), 1);

    catalog.insert("app", LiveTable::from_entity(&users()));
    let second = Reconciler::new(&catalog, "app").plan(&model).await.unwrap();
    assert!(second.is_empty());
}
