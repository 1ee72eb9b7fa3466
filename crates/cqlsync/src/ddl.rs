//! Statement text.
//!
//! Lists are built by joining, so no statement ever carries a dangling
//! separator.

use crate::entity::Entity;
use crate::types::ColumnType;

/// Generate the CREATE TABLE statement for an entity.
///
/// ```text
/// CREATE TABLE IF NOT EXISTS users (
/// id timeuuid,
/// name text,
/// PRIMARY KEY (id)
/// );
/// ```
pub fn create_table_sql(entity: &Entity) -> String {
    let mut parts: Vec<String> = entity
        .columns()
        .iter()
        .map(|(name, column_type)| format!("{} {}", name, column_type))
        .collect();

    parts.push(format!("PRIMARY KEY ({})", entity.keys().join(", ")));

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        entity.name(),
        parts.join(",\n")
    )
}

pub fn drop_column_sql(table: &str, column: &str) -> String {
    format!("ALTER TABLE {} DROP {};", table, column)
}

pub fn alter_column_type_sql(table: &str, column: &str, column_type: &ColumnType) -> String {
    format!("ALTER TABLE {} ALTER {} TYPE {};", table, column, column_type)
}

pub fn add_column_sql(table: &str, column: &str, column_type: &ColumnType) -> String {
    format!(
        "ALTER TABLE {} ADD {} {};",
        table,
        column,
        column_type.to_add_sql()
    )
}

pub fn drop_keyspace_sql(keyspace: &str) -> String {
    format!("DROP KEYSPACE {};", keyspace)
}

pub fn drop_table_sql(keyspace: &str, table: &str) -> String {
    format!("DROP TABLE {}.{};", keyspace, table)
}

pub fn truncate_table_sql(keyspace: &str, table: &str) -> String {
    format!("TRUNCATE TABLE {}.{};", keyspace, table)
}
