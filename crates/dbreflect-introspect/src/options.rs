use serde::{Deserialize, Serialize};

use dbreflect_core::{DESCRIPTION_PROPERTY, DbObject, ObjectKind};

/// Options that control how an import behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub include_tables: bool,
    pub include_views: bool,
    pub include_procedures: bool,
    pub include_table_functions: bool,
    pub include_scalar_functions: bool,
    pub include_extended_properties: bool,
    /// Schemas to import; `None` imports every schema.
    pub schemas: Option<Vec<String>>,
    /// Schema-qualified names (`dbo.Orders`) that are never described.
    pub exclude: Vec<String>,
    /// Extended properties fetched for every addressable entity.
    pub property_names: Vec<String>,
    /// Property whose value is also copied into `description`.
    pub description_property: String,
    /// Abort on the first object failure instead of recording it.
    pub strict: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            include_tables: true,
            include_views: true,
            include_procedures: true,
            include_table_functions: true,
            include_scalar_functions: true,
            include_extended_properties: true,
            schemas: None,
            exclude: Vec::new(),
            property_names: vec![DESCRIPTION_PROPERTY.to_string()],
            description_property: DESCRIPTION_PROPERTY.to_string(),
            strict: false,
        }
    }
}

impl ImportOptions {
    /// Exact, case-sensitive match on the schema-qualified name.
    pub fn is_excluded(&self, object: &DbObject) -> bool {
        let full_name = object.full_name();
        self.exclude.iter().any(|item| *item == full_name)
    }

    pub fn includes_schema(&self, schema: &str) -> bool {
        match &self.schemas {
            Some(list) => list.iter().any(|item| item == schema),
            None => true,
        }
    }

    pub fn includes_kind(&self, kind: ObjectKind) -> bool {
        match kind {
            ObjectKind::Table => self.include_tables,
            ObjectKind::View => self.include_views,
            ObjectKind::StoredProcedure => self.include_procedures,
            ObjectKind::TableFunction => self.include_table_functions,
            ObjectKind::ScalarFunction => self.include_scalar_functions,
        }
    }
}
