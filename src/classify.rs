//! Partition a model's properties into key, insert, update and select roles.

use crate::error::SqlCrudError;
use crate::handlers::HandlerRegistry;
use crate::model::{ColumnType, FieldInfo, Model, Projection, TableInfo, short_type_name};

/// One mapped property, with its logical (unquoted) column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub column: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl PropertyDescriptor {
    fn from_field(field: &FieldInfo) -> Self {
        Self {
            name: field.name,
            column: field.column_name(),
            column_type: field.column_type,
            nullable: field.nullable,
        }
    }

    #[must_use]
    pub fn has_explicit_column(&self) -> bool {
        self.name != self.column
    }
}

/// Where the key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// One or more fields marked `key()`.
    Explicit,
    /// No explicit key; a property named `Id` (any case).
    Convention,
    /// No key could be determined.
    Missing,
}

/// The persistence roles of a model's properties.
///
/// Lists keep declaration order. Not-mapped, `editable(false)` and non-simple properties appear
/// in none of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub model: &'static str,
    pub table: TableInfo,
    pub key_source: KeySource,
    pub keys: Vec<PropertyDescriptor>,
    pub insertable: Vec<PropertyDescriptor>,
    pub updatable: Vec<PropertyDescriptor>,
    pub selectable: Vec<PropertyDescriptor>,
    /// Every mapped property, whatever its ignore flags.
    pub mapped: Vec<PropertyDescriptor>,
}

impl Classification {
    /// Key properties, or `MissingKey` when the model has none.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::MissingKey` for models without a key.
    pub fn require_keys(&self) -> Result<&[PropertyDescriptor], SqlCrudError> {
        if self.keys.is_empty() {
            Err(SqlCrudError::MissingKey {
                model: self.model,
                reason: "no property is marked as key and none is named Id".to_string(),
            })
        } else {
            Ok(&self.keys)
        }
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.keys.len() > 1
    }

    /// Look up a mapped property, exactly first and then ignoring ASCII case.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.mapped
            .iter()
            .find(|p| p.name == name)
            .or_else(|| self.mapped.iter().find(|p| p.name.eq_ignore_ascii_case(name)))
    }
}

fn participates(field: &FieldInfo, handlers: &HandlerRegistry) -> bool {
    if field.not_mapped || field.editable == Some(false) {
        return false;
    }
    match field.column_type {
        ColumnType::Relation => false,
        ColumnType::Custom(handler) => handlers.contains(handler) || field.editable == Some(true),
        ColumnType::Array(_) => {
            field.column_type.is_simple_array() || field.editable == Some(true)
        }
        _ => true,
    }
}

/// Classify a model type.
#[must_use]
pub fn classify<M: Model>(handlers: &HandlerRegistry) -> Classification {
    classify_fields(
        short_type_name(std::any::type_name::<M>()),
        M::table(),
        M::FIELDS,
        handlers,
    )
}

pub(crate) fn classify_fields(
    model: &'static str,
    table: TableInfo,
    fields: &'static [FieldInfo],
    handlers: &HandlerRegistry,
) -> Classification {
    let mapped_fields: Vec<&FieldInfo> = fields
        .iter()
        .filter(|f| participates(f, handlers))
        .collect();

    let explicit: Vec<&FieldInfo> = mapped_fields.iter().copied().filter(|f| f.key).collect();
    let (key_source, key_fields) = if !explicit.is_empty() {
        (KeySource::Explicit, explicit)
    } else if let Some(id) = mapped_fields
        .iter()
        .copied()
        .find(|f| f.name.eq_ignore_ascii_case("id"))
    {
        (KeySource::Convention, vec![id])
    } else {
        (KeySource::Missing, Vec::new())
    };
    let is_key = |f: &FieldInfo| key_fields.iter().any(|k| k.name == f.name);

    let pick = |keep: &dyn Fn(&FieldInfo) -> bool| -> Vec<PropertyDescriptor> {
        mapped_fields
            .iter()
            .copied()
            .filter(|f| keep(f))
            .map(PropertyDescriptor::from_field)
            .collect()
    };

    Classification {
        model,
        table,
        key_source,
        keys: key_fields
            .iter()
            .copied()
            .map(PropertyDescriptor::from_field)
            .collect(),
        insertable: pick(&|f| !f.ignore_insert && !f.read_only),
        updatable: pick(&|f| !is_key(f) && !f.ignore_update && !f.read_only),
        selectable: pick(&|f| !f.ignore_select),
        mapped: pick(&|_| true),
    }
}

/// A limited-field view of a model: the projection's properties intersected with each role.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionShape {
    pub projection: &'static str,
    /// Projection properties, in the projection's order.
    pub properties: Vec<PropertyDescriptor>,
    pub insertable: Vec<PropertyDescriptor>,
    pub updatable: Vec<PropertyDescriptor>,
}

impl ProjectionShape {
    #[must_use]
    pub fn carries(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p.name == property)
    }
}

/// Cache key for a projection: its fully qualified property names, in order.
#[must_use]
pub fn projection_key<P: Projection>() -> String {
    let target = std::any::type_name::<P::Target>();
    P::PROPERTIES
        .iter()
        .map(|p| format!("{target}.{p}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Validate a projection against its target's classification.
///
/// # Errors
///
/// Returns `SqlCrudError::AmbiguousProjection` when a projection property is not a mapped
/// property of the target.
pub fn classify_projection<P: Projection>(
    target: &Classification,
) -> Result<ProjectionShape, SqlCrudError> {
    let projection = short_type_name(std::any::type_name::<P>());
    let properties = P::PROPERTIES
        .iter()
        .map(|name| {
            target
                .mapped
                .iter()
                .find(|p| p.name == *name)
                .copied()
                .ok_or_else(|| SqlCrudError::AmbiguousProjection {
                    projection,
                    model: target.model,
                    property: (*name).to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let within = |list: &[PropertyDescriptor]| -> Vec<PropertyDescriptor> {
        list.iter()
            .filter(|p| properties.iter().any(|q| q.name == p.name))
            .copied()
            .collect()
    };

    Ok(ProjectionShape {
        projection,
        insertable: within(&target.insertable),
        updatable: within(&target.updatable),
        properties,
    })
}
