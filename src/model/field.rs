//! Property descriptors declared by model types.

/// Declared type of a model property.
///
/// Everything except `Array`, `Custom` and `Relation` is a simple, directly bindable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Text,
    Char,
    Uuid,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    Interval,
    Bytes,
    Json,
    /// A Rust enum stored as its integer discriminant or name.
    Enum,
    /// One-dimensional array of a simple element type (`PostgreSQL` only).
    Array(&'static ColumnType),
    /// A type bound and read through the type handler registered under this name.
    Custom(&'static str),
    /// A navigation property (nested record or collection); never mapped.
    Relation,
}

impl ColumnType {
    /// Flat, bindable scalar types.
    #[must_use]
    pub const fn is_simple(&self) -> bool {
        !matches!(
            self,
            ColumnType::Array(_) | ColumnType::Custom(_) | ColumnType::Relation
        )
    }

    /// One-dimensional array of a simple type.
    #[must_use]
    pub const fn is_simple_array(&self) -> bool {
        match self {
            ColumnType::Array(element) => element.is_simple(),
            _ => false,
        }
    }

    /// Integer types a database can generate as an identity key.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::Int8
                | ColumnType::Int16
                | ColumnType::Int32
                | ColumnType::Int64
                | ColumnType::UInt8
                | ColumnType::UInt16
                | ColumnType::UInt32
                | ColumnType::UInt64
        )
    }
}

/// Metadata about one model property.
///
/// Built in `const` context so a model can keep its descriptors in a `const` slice:
/// ```rust
/// use sql_crud::prelude::*;
///
/// const FIELDS: &[FieldInfo] = &[
///     FieldInfo::new("Id", ColumnType::Int32).key(),
///     FieldInfo::new("Name", ColumnType::Text).column("user_name"),
///     FieldInfo::new("CreatedDate", ColumnType::DateTime).read_only(),
/// ];
/// assert_eq!(FIELDS[1].column_name(), "user_name");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Rust-side property name, also the bind parameter name
    pub name: &'static str,
    /// Column name override
    pub column: Option<&'static str>,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub key: bool,
    pub ignore_insert: bool,
    pub ignore_update: bool,
    pub ignore_select: bool,
    pub not_mapped: bool,
    pub read_only: bool,
    /// `Some(false)` drops the property everywhere; `Some(true)` keeps a non-simple property.
    pub editable: Option<bool>,
}

impl FieldInfo {
    #[must_use]
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column: None,
            column_type,
            nullable: false,
            key: false,
            ignore_insert: false,
            ignore_update: false,
            ignore_select: false,
            not_mapped: false,
            read_only: false,
            editable: None,
        }
    }

    #[must_use]
    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark as a key; several key fields form a composite key in declaration order.
    #[must_use]
    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }

    #[must_use]
    pub const fn ignore_insert(mut self) -> Self {
        self.ignore_insert = true;
        self
    }

    #[must_use]
    pub const fn ignore_update(mut self) -> Self {
        self.ignore_update = true;
        self
    }

    #[must_use]
    pub const fn ignore_select(mut self) -> Self {
        self.ignore_select = true;
        self
    }

    #[must_use]
    pub const fn not_mapped(mut self) -> Self {
        self.not_mapped = true;
        self
    }

    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    #[must_use]
    pub const fn editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    /// Column name used in SQL; the property name unless overridden.
    #[must_use]
    pub const fn column_name(&self) -> &'static str {
        match self.column {
            Some(column) => column,
            None => self.name,
        }
    }
}
