use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::graph::resolve_reference;
use crate::schema::{Column, Database, Table};

/// Validate internal consistency of an imported database.
///
/// This checks:
/// - duplicate object names and duplicate columns
/// - primary keys are non-empty and name real columns
/// - foreign key columns exist and every foreign key has a target
/// - referenced columns exist when the target table was imported
/// - unique and identity columns exist
pub fn validate_database(database: &Database) -> Result<()> {
    let mut names = BTreeSet::new();
    for name in database.object_names() {
        if !names.insert(name.clone()) {
            return Err(Error::InvalidSchema(format!("duplicate object name: {name}")));
        }
    }

    for view in &database.views {
        check_columns_unique(&view.full_name(), &view.columns)?;
    }
    for function in &database.table_functions {
        let full_name = format!("{}.{}", function.schema, function.name);
        check_columns_unique(&full_name, &function.columns)?;
    }

    for table in &database.tables {
        validate_table(database, table)?;
    }

    Ok(())
}

fn validate_table(database: &Database, table: &Table) -> Result<()> {
    let full_name = table.full_name();
    let columns = check_columns_unique(&full_name, &table.columns)?;

    let require = |kind: &str, column: &str| -> Result<()> {
        if columns.contains(key_column(column)) {
            Ok(())
        } else {
            Err(Error::InvalidSchema(format!(
                "{kind} column not found: {full_name}.{column}"
            )))
        }
    };

    if let Some(pk) = &table.primary_key {
        if pk.columns.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "primary key {} on {full_name} has no columns",
                pk.name
            )));
        }
        for column in &pk.columns {
            require("primary key", column)?;
        }
    }

    for fk in &table.foreign_keys {
        for column in &fk.columns {
            require("foreign key", column)?;
        }

        let target = fk.referenced_table.as_deref().ok_or_else(|| {
            Error::InvalidSchema(format!(
                "foreign key {} on {full_name} has no referenced table",
                fk.name
            ))
        })?;

        let (ref_schema, ref_name) = resolve_reference(&table.schema, target);
        if let Some(referenced) = database.table(&ref_schema, &ref_name) {
            for column in &fk.referenced_columns {
                if referenced.column(column).is_none() {
                    return Err(Error::InvalidSchema(format!(
                        "referenced column not found: {ref_schema}.{ref_name}.{column}"
                    )));
                }
            }
        }
    }

    for unique in &table.uniques {
        for column in &unique.columns {
            require("unique", column)?;
        }
    }

    if let Some(identity) = &table.identity {
        require("identity", &identity.column)?;
    }

    Ok(())
}

/// Constraint key lists mark descending columns as `Name(-)`.
fn key_column(key: &str) -> &str {
    key.trim().trim_end_matches("(-)").trim_end()
}

fn check_columns_unique<'a>(owner: &str, columns: &'a [Column]) -> Result<BTreeSet<&'a str>> {
    let mut seen = BTreeSet::new();
    for column in columns {
        if !seen.insert(column.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate column name: {owner}.{}",
                column.name
            )));
        }
    }
    Ok(seen)
}
