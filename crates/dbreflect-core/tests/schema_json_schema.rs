use dbreflect_core::{
    Column, Database, ExtendedProperty, FkAction, ForeignKey, Identity, ImportReport, PrimaryKey,
    Table,
};
use jsonschema::JSONSchema;
use schemars::schema_for;

fn sample_database() -> Database {
    let mut table = Table::new("dbo", "Orders");
    table.columns.push(Column {
        name: "Id".to_string(),
        data_type: "int".to_string(),
        length: 4,
        precision: 10,
        scale: 0,
        nullable: false,
        computed: false,
        collation: None,
        description: Some("Order number".to_string()),
        extended_properties: vec![ExtendedProperty {
            name: "MS_Description".to_string(),
            value: "Order number".to_string(),
        }],
    });
    table.identity = Some(Identity {
        column: "Id".to_string(),
        seed: 1,
        increment: 1,
    });
    table.primary_key = Some(PrimaryKey {
        name: "PK_Orders".to_string(),
        columns: vec!["Id".to_string()],
    });
    table.foreign_keys.push(ForeignKey {
        name: "FK_Orders_Customer".to_string(),
        columns: vec!["CustomerId".to_string()],
        referenced_table: Some("dbo.Customer".to_string()),
        referenced_columns: vec!["Id".to_string()],
        on_delete: FkAction::Cascade,
        on_update: FkAction::NoAction,
        enabled: true,
        for_replication: false,
    });

    let mut database = Database::new("mssql", Some("shop".to_string()));
    database.tables.push(table);
    database
}

#[test]
fn serialized_database_conforms_to_json_schema() {
    let schema = serde_json::to_value(schema_for!(Database)).expect("serialize json schema");
    let compiled = JSONSchema::compile(&schema).expect("compile json schema");

    let instance = serde_json::to_value(sample_database()).expect("serialize database");
    assert!(compiled.is_valid(&instance));
}

#[test]
fn json_schema_rejects_missing_tables() {
    let schema = serde_json::to_value(schema_for!(Database)).expect("serialize json schema");
    let compiled = JSONSchema::compile(&schema).expect("compile json schema");

    let mut instance = serde_json::to_value(sample_database()).expect("serialize database");
    instance
        .as_object_mut()
        .expect("database serializes to an object")
        .remove("tables");
    assert!(!compiled.is_valid(&instance));
}

#[test]
fn import_report_schema_lists_failures() {
    let schema = serde_json::to_value(schema_for!(ImportReport)).expect("serialize json schema");
    let properties = schema
        .get("properties")
        .and_then(|value| value.as_object())
        .expect("report schema has properties");
    assert!(properties.contains_key("failures"));
    assert!(properties.contains_key("cancelled"));
}
