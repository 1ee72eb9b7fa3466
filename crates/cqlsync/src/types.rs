//! Field types and their native column types.
//!
//! A declared field carries a [`FieldType`]: one of the supported scalar kinds,
//! a `list`/`set` of one of them, or something the keyspace cannot store.
//! [`resolve`] maps it to the [`ColumnType`] the table column is created with.
//!
//! Only single-level collections resolve. `map<k, v>` fields and collections of
//! collections have no column type.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::net::IpAddr;

/// Native scalar column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// TEXT (UTF-8 string)
    Text,
    /// BIGINT (64-bit signed)
    BigInt,
    /// BLOB (arbitrary bytes)
    Blob,
    /// INT (32-bit signed)
    Int,
    /// BOOLEAN
    Boolean,
    /// TIMESTAMP (milliseconds since the epoch)
    Timestamp,
    /// DOUBLE (64-bit float)
    Double,
    /// INET (IPv4 or IPv6 address)
    Inet,
    /// TIMEUUID (version 1 UUID)
    TimeUuid,
}

impl ScalarType {
    /// The lower-case type name, as the catalog reports it.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Text => "text",
            ScalarType::BigInt => "bigint",
            ScalarType::Blob => "blob",
            ScalarType::Int => "int",
            ScalarType::Boolean => "boolean",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Double => "double",
            ScalarType::Inet => "inet",
            ScalarType::TimeUuid => "timeuuid",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Collection kinds a column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Set,
}

impl CollectionKind {
    /// The lower-case name (`list`, `set`).
    pub fn name(&self) -> &'static str {
        match self {
            CollectionKind::List => "list",
            CollectionKind::Set => "set",
        }
    }

    /// The upper-case keyword used when adding a column (`LIST`, `SET`).
    pub fn keyword(&self) -> &'static str {
        match self {
            CollectionKind::List => "LIST",
            CollectionKind::Set => "SET",
        }
    }
}

/// The native type of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Scalar(ScalarType),
    Collection(CollectionKind, ScalarType),
}

impl ColumnType {
    /// Canonical type name, e.g. `text` or `set<text>`.
    ///
    /// This is the form live catalog types are normalized to, so two types are
    /// the same column type exactly when their names are equal.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Type text for `ALTER TABLE ... ADD`: scalars by name, collections as
    /// `LIST<scalar>` / `SET<scalar>`.
    pub fn to_add_sql(&self) -> String {
        match self {
            ColumnType::Scalar(scalar) => scalar.name().to_string(),
            ColumnType::Collection(kind, element) => {
                format!("{}<{}>", kind.keyword(), element)
            }
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Scalar(scalar) => write!(f, "{}", scalar),
            ColumnType::Collection(kind, element) => write!(f, "{}<{}>", kind.name(), element),
        }
    }
}

/// Supported scalar field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    I64,
    Bytes,
    I32,
    Bool,
    Timestamp,
    F64,
    IpAddr,
    Uuid,
}

impl FieldKind {
    /// Every supported scalar kind.
    pub const ALL: [FieldKind; 9] = [
        FieldKind::String,
        FieldKind::I64,
        FieldKind::Bytes,
        FieldKind::I32,
        FieldKind::Bool,
        FieldKind::Timestamp,
        FieldKind::F64,
        FieldKind::IpAddr,
        FieldKind::Uuid,
    ];

    /// The scalar column type this kind is stored as.
    pub fn column_type(&self) -> ScalarType {
        match self {
            FieldKind::String => ScalarType::Text,
            FieldKind::I64 => ScalarType::BigInt,
            FieldKind::Bytes => ScalarType::Blob,
            FieldKind::I32 => ScalarType::Int,
            FieldKind::Bool => ScalarType::Boolean,
            FieldKind::Timestamp => ScalarType::Timestamp,
            FieldKind::F64 => ScalarType::Double,
            FieldKind::IpAddr => ScalarType::Inet,
            // UUID keys are generated time-ordered.
            FieldKind::Uuid => ScalarType::TimeUuid,
        }
    }

    /// Name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::I64 => "i64",
            FieldKind::Bytes => "bytes",
            FieldKind::I32 => "i32",
            FieldKind::Bool => "bool",
            FieldKind::Timestamp => "timestamp",
            FieldKind::F64 => "f64",
            FieldKind::IpAddr => "inet",
            FieldKind::Uuid => "uuid",
        }
    }

    /// Look up a kind by its configuration name or native type name.
    pub fn from_name(name: &str) -> Option<FieldKind> {
        let kind = match name {
            "string" | "text" => FieldKind::String,
            "i64" | "bigint" => FieldKind::I64,
            "bytes" | "blob" => FieldKind::Bytes,
            "i32" | "int" => FieldKind::I32,
            "bool" | "boolean" => FieldKind::Bool,
            "timestamp" => FieldKind::Timestamp,
            "f64" | "double" => FieldKind::F64,
            "inet" | "ip" => FieldKind::IpAddr,
            "uuid" | "timeuuid" => FieldKind::Uuid,
            _ => return None,
        };
        Some(kind)
    }
}

/// The semantic type of a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Scalar(FieldKind),
    List(Box<FieldType>),
    Set(Box<FieldType>),
    Map(Box<FieldType>, Box<FieldType>),
    /// A type the keyspace has no column type for.
    Other(String),
}

impl FieldType {
    /// Parse a field type from its configuration spelling.
    ///
    /// Accepts scalar names (`string`, `i64`, `uuid`, ... or their native
    /// names), `list<T>`, `set<T>` and `map<K, V>`. Anything else becomes
    /// [`FieldType::Other`], which does not resolve.
    pub fn parse(spec: &str) -> FieldType {
        let spec = spec.trim();
        let lower = spec.to_ascii_lowercase();

        if let Some(kind) = FieldKind::from_name(&lower) {
            return FieldType::Scalar(kind);
        }

        if let Some((head, args)) = split_generic(&lower) {
            match head {
                "list" | "vec" => return FieldType::List(Box::new(FieldType::parse(args))),
                "set" => return FieldType::Set(Box::new(FieldType::parse(args))),
                "map" => {
                    if let Some((key, value)) = split_top_level_comma(args) {
                        return FieldType::Map(
                            Box::new(FieldType::parse(key)),
                            Box::new(FieldType::parse(value)),
                        );
                    }
                }
                _ => {}
            }
        }

        FieldType::Other(spec.to_string())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(kind) => f.write_str(kind.name()),
            FieldType::List(inner) => write!(f, "list<{}>", inner),
            FieldType::Set(inner) => write!(f, "set<{}>", inner),
            FieldType::Map(key, value) => write!(f, "map<{}, {}>", key, value),
            FieldType::Other(name) => f.write_str(name),
        }
    }
}

/// `"list<map<a, b>>"` -> `("list", "map<a, b>")`
fn split_generic(spec: &str) -> Option<(&str, &str)> {
    let open = spec.find('<')?;
    let inner = spec.strip_suffix('>')?;
    let head = spec[..open].trim();
    let args = inner[open + 1..].trim();
    if head.is_empty() || args.is_empty() {
        return None;
    }
    Some((head, args))
}

fn split_top_level_comma(args: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (idx, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some((args[..idx].trim(), args[idx + 1..].trim())),
            _ => {}
        }
    }
    None
}

/// Map a declared field type to its column type.
///
/// Returns `None` for maps, nested collections and unsupported kinds.
pub fn resolve(field_type: &FieldType) -> Option<ColumnType> {
    match field_type {
        FieldType::Scalar(kind) => Some(ColumnType::Scalar(kind.column_type())),
        FieldType::List(inner) => resolve_element(inner, CollectionKind::List),
        FieldType::Set(inner) => resolve_element(inner, CollectionKind::Set),
        FieldType::Map(..) | FieldType::Other(_) => None,
    }
}

fn resolve_element(element: &FieldType, kind: CollectionKind) -> Option<ColumnType> {
    match element {
        FieldType::Scalar(scalar) => Some(ColumnType::Collection(kind, scalar.column_type())),
        _ => None,
    }
}

/// Rust types that can be declared as entity fields.
///
/// ```ignore
/// let users = Entity::builder("users")
///     .key::<Uuid>("id")
///     .column::<String>("name")
///     .column::<BTreeSet<String>>("tags")
///     .build()?;
/// ```
pub trait Field {
    /// The semantic type of this Rust type.
    fn field_type() -> FieldType;
}

macro_rules! scalar_field {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Field for $ty {
                fn field_type() -> FieldType {
                    FieldType::Scalar(FieldKind::$kind)
                }
            }
        )*
    };
}

scalar_field! {
    String => String,
    i64 => I64,
    bytes::Bytes => Bytes,
    i32 => I32,
    bool => Bool,
    jiff::Timestamp => Timestamp,
    f64 => F64,
    IpAddr => IpAddr,
    uuid::Uuid => Uuid,
}

macro_rules! unsupported_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                fn field_type() -> FieldType {
                    FieldType::Other(stringify!($ty).to_string())
                }
            }
        )*
    };
}

unsupported_field!(f32, i16, i8, u8, u16, u32, u64, char);

// Every column is nullable, so `Option<T>` declares the same column as `T`.
impl<T: Field> Field for Option<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }
}

impl<T: Field> Field for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::List(Box::new(T::field_type()))
    }
}

impl<T: Field> Field for BTreeSet<T> {
    fn field_type() -> FieldType {
        FieldType::Set(Box::new(T::field_type()))
    }
}

impl<T: Field, S> Field for HashSet<T, S> {
    fn field_type() -> FieldType {
        FieldType::Set(Box::new(T::field_type()))
    }
}

impl<K: Field, V: Field> Field for BTreeMap<K, V> {
    fn field_type() -> FieldType {
        FieldType::Map(Box::new(K::field_type()), Box::new(V::field_type()))
    }
}

impl<K: Field, V: Field, S> Field for HashMap<K, V, S> {
    fn field_type() -> FieldType {
        FieldType::Map(Box::new(K::field_type()), Box::new(V::field_type()))
    }
}
