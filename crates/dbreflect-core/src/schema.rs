use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::{
    CheckConstraint, DefaultConstraint, ForeignKey, Index, PrimaryKey, UniqueConstraint,
};
use crate::properties::ExtendedProperty;
use crate::types::{Identity, RowGuidCol};

/// Top-level schema snapshot for a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Database {
    /// Contract version for this schema format.
    pub schema_version: String,
    /// Database engine identifier (e.g. `mssql`).
    pub engine: String,
    /// Database name when available.
    pub name: Option<String>,
    pub description: Option<String>,
    pub tables: Vec<Table>,
    pub views: Vec<View>,
    pub stored_procedures: Vec<StoredProcedure>,
    pub table_functions: Vec<TableFunction>,
    pub scalar_functions: Vec<ScalarFunction>,
    /// Database-level extended properties.
    pub extended_properties: Vec<ExtendedProperty>,
    /// Naming convention handed to script generators.
    pub naming: NamingConvention,
    /// SQL type to target type mapping handed to script generators.
    pub type_map: Vec<TypeMapping>,
}

impl Database {
    /// Create an empty aggregate for the given engine.
    pub fn new(engine: impl Into<String>, name: Option<String>) -> Self {
        Self {
            schema_version: crate::SCHEMA_VERSION.to_string(),
            engine: engine.into(),
            name,
            description: None,
            tables: Vec::new(),
            views: Vec::new(),
            stored_procedures: Vec::new(),
            table_functions: Vec::new(),
            scalar_functions: Vec::new(),
            extended_properties: Vec::new(),
            naming: NamingConvention::default(),
            type_map: Vec::new(),
        }
    }

    /// Look up a table by schema and name.
    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|table| table.schema == schema && table.name == name)
    }

    /// Look up a view by schema and name.
    pub fn view(&self, schema: &str, name: &str) -> Option<&View> {
        self.views
            .iter()
            .find(|view| view.schema == schema && view.name == name)
    }

    /// Schema-qualified names of every imported object, in category order.
    pub fn object_names(&self) -> Vec<String> {
        let tables = self.tables.iter().map(|item| qualified(&item.schema, &item.name));
        let views = self.views.iter().map(|item| qualified(&item.schema, &item.name));
        let procedures = self
            .stored_procedures
            .iter()
            .map(|item| qualified(&item.schema, &item.name));
        let table_functions = self
            .table_functions
            .iter()
            .map(|item| qualified(&item.schema, &item.name));
        let scalar_functions = self
            .scalar_functions
            .iter()
            .map(|item| qualified(&item.schema, &item.name));

        tables
            .chain(views)
            .chain(procedures)
            .chain(table_functions)
            .chain(scalar_functions)
            .collect()
    }
}

/// Join a schema and object name the way exclusion lists spell them.
pub fn qualified(schema: &str, name: &str) -> String {
    format!("{schema}.{name}")
}

/// Category of a catalog object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Table,
    View,
    StoredProcedure,
    TableFunction,
    ScalarFunction,
}

impl ObjectKind {
    /// Map a `sys.objects.type` code to an object kind.
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "U" => Some(ObjectKind::Table),
            "V" => Some(ObjectKind::View),
            "P" => Some(ObjectKind::StoredProcedure),
            "IF" | "TF" => Some(ObjectKind::TableFunction),
            "FN" => Some(ObjectKind::ScalarFunction),
            _ => None,
        }
    }
}

/// One catalog entry as returned by object enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbObject {
    pub schema: String,
    pub name: String,
    /// Raw catalog type tag (`U`, `V`, `P`, `FN`, `IF`, `TF`).
    pub type_tag: String,
}

impl DbObject {
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            type_tag: type_tag.into(),
        }
    }

    pub fn full_name(&self) -> String {
        qualified(&self.schema, &self.name)
    }

    pub fn kind(&self) -> Option<ObjectKind> {
        ObjectKind::from_type_tag(&self.type_tag)
    }
}

/// A user table with its structure and resolved constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub description: Option<String>,
    pub columns: Vec<Column>,
    pub identity: Option<Identity>,
    pub row_guid_col: Option<RowGuidCol>,
    pub indexes: Vec<Index>,
    pub primary_key: Option<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub uniques: Vec<UniqueConstraint>,
    pub checks: Vec<CheckConstraint>,
    pub defaults: Vec<DefaultConstraint>,
    /// Raw notes naming foreign keys in other tables that point here.
    pub referenced_by: Vec<String>,
    pub extended_properties: Vec<ExtendedProperty>,
}

impl Table {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            description: None,
            columns: Vec::new(),
            identity: None,
            row_guid_col: None,
            indexes: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            uniques: Vec::new(),
            checks: Vec::new(),
            defaults: Vec::new(),
            referenced_by: Vec::new(),
            extended_properties: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        qualified(&self.schema, &self.name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// A view; indexed views also carry indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct View {
    pub schema: String,
    pub name: String,
    pub description: Option<String>,
    pub columns: Vec<Column>,
    pub identity: Option<Identity>,
    pub row_guid_col: Option<RowGuidCol>,
    pub indexes: Vec<Index>,
    pub extended_properties: Vec<ExtendedProperty>,
}

impl View {
    pub fn full_name(&self) -> String {
        qualified(&self.schema, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StoredProcedure {
    pub schema: String,
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
    pub extended_properties: Vec<ExtendedProperty>,
}

/// Inline or multi-statement table-valued function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableFunction {
    pub schema: String,
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
    pub columns: Vec<Column>,
    pub identity: Option<Identity>,
    pub extended_properties: Vec<ExtendedProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScalarFunction {
    pub schema: String,
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
    /// Declared return type, taken from the unnamed return-value parameter.
    pub return_type: Option<String>,
    pub extended_properties: Vec<ExtendedProperty>,
}

/// Column metadata for a table-like object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    /// Storage length in bytes as reported by the catalog.
    pub length: i32,
    pub precision: i32,
    pub scale: i32,
    pub nullable: bool,
    pub computed: bool,
    pub collation: Option<String>,
    pub description: Option<String>,
    pub extended_properties: Vec<ExtendedProperty>,
}

/// Routine parameter in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Parameter {
    pub name: String,
    pub data_type: String,
    pub length: i32,
    pub precision: i32,
    pub scale: i32,
    pub order: i32,
    pub collation: Option<String>,
}

/// Naming rules consumed by stored-procedure generators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NamingConvention {
    pub procedure_prefix: String,
    pub procedure_suffix: String,
    pub parameter_prefix: String,
}

/// Mapping from a SQL type name to a generator target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeMapping {
    pub sql_type: String,
    pub target_type: String,
    #[serde(default)]
    pub nullable_target_type: Option<String>,
}
