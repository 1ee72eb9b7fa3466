use std::time::Duration;

use cqlsync::{
    CollectionKind, ColumnType, Error, KeyMismatchPolicy, ScalarType, UnresolvedPolicy,
};
use cqlsync_config::{Config, ConfigError};

const SOURCE: &str = r#"
keyspace app
statement-timeout-ms 5000
key-mismatch fail
entities {
  users {
    keys id
    columns {
      id uuid
      Name string
      tags "set<string>"
    }
  }
  events {
    keys "tenant, at"
    columns {
      tenant string
      at timestamp
      payload "list<i64>"
    }
  }
}
"#;

#[test]
fn test_parse_full_config() {
    let config = Config::parse(SOURCE).unwrap();
    assert_eq!(config.keyspace, "app");
    assert_eq!(config.snapshot, None);

    let options = config.options().unwrap();
    assert_eq!(options.statement_timeout, Duration::from_millis(5000));
    assert_eq!(options.key_mismatch, KeyMismatchPolicy::Fail);
    assert_eq!(config.unresolved_policy().unwrap(), UnresolvedPolicy::Fail);
}

#[test]
fn test_model_from_config() {
    let model = Config::parse(SOURCE).unwrap().model().unwrap();
    let names: Vec<_> = model.iter().map(|e| e.name()).collect();
    assert_eq!(names, ["users", "events"]);

    let users = model.get("users").unwrap();
    assert_eq!(users.keys(), ["id"]);
    assert_eq!(
        users.column_type("name"),
        Some(&ColumnType::Scalar(ScalarType::Text))
    );
    assert_eq!(
        users.column_type("tags"),
        Some(&ColumnType::Collection(CollectionKind::Set, ScalarType::Text))
    );

    let events = model.get("events").unwrap();
    assert_eq!(events.keys(), ["tenant", "at"]);
    insta::assert_snapshot!(cqlsync::create_table_sql(events), @r"
    CREATE TABLE IF NOT EXISTS events (
    tenant text,
    at timestamp,
    payload list<bigint>,
    PRIMARY KEY (tenant, at)
    );
    ");
}

#[test]
fn test_defaults() {
    let config = Config::parse("keyspace app").unwrap();
    let options = config.options().unwrap();
    assert_eq!(options, cqlsync::Options::default());
    assert!(config.model().unwrap().is_empty());
}

#[test]
fn test_invalid_policy() {
    let config = Config::parse("keyspace app\nunresolved maybe").unwrap();
    let err = config.model().unwrap_err();
    insta::assert_snapshot!(err, @r#"invalid unresolved "maybe", expected one of: fail, skip"#);
}

#[test]
fn test_unresolvable_column() {
    let source = r#"
keyspace app
entities {
  users {
    keys id
    columns { id uuid, scores "map<string, i64>" }
  }
}
"#;
    let err = Config::parse(source).unwrap().model().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Model(Error::UnresolvableType { ref column, .. }) if column == "scores"
    ));

    let skipping = format!("{}\nunresolved skip", source);
    let model = Config::parse(&skipping).unwrap().model().unwrap();
    let users = model.get("users").unwrap();
    assert_eq!(users.columns().len(), 1);
}

#[test]
fn test_key_not_declared() {
    let source = r#"
keyspace app
entities {
  users {
    keys "id, region"
    columns { id uuid }
  }
}
"#;
    let err = Config::parse(source).unwrap().model().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Model(Error::MissingKeyColumn { ref column, .. }) if column == "region"
    ));
}

#[test]
fn test_parse_error() {
    let err = Config::parse("entities {").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
