//! Row to entity conversion.
//!
//! Each function assumes the row was already classified as its kind; a
//! missing expected key is reported as [`Error::Contract`].

use dbreflect_core::{Column, Error, Identity, Index, Parameter, Result, RowGuidCol};

use crate::classify::keys;
use crate::resolve::ConstraintDetail;
use crate::row::Row;

const NO_IDENTITY: &str = "No identity column defined.";
const NO_ROWGUIDCOL: &str = "No rowguidcol column defined.";

pub fn column(row: &Row) -> Result<Column> {
    Ok(Column {
        name: row.text(keys::COLUMN_NAME)?,
        data_type: row.text(keys::TYPE)?,
        length: number(row, keys::LENGTH)?,
        precision: number(row, keys::PREC)?,
        scale: number(row, keys::SCALE)?,
        nullable: is_yes(&row.text(keys::NULLABLE)?),
        computed: row.get(keys::COMPUTED).is_some_and(is_yes),
        collation: row.get(keys::COLLATION).and_then(non_blank),
        description: None,
        extended_properties: Vec::new(),
    })
}

pub fn parameter(row: &Row) -> Result<Parameter> {
    Ok(Parameter {
        name: row.text(keys::PARAMETER_NAME)?.trim().to_string(),
        data_type: row.text(keys::TYPE)?,
        length: number(row, keys::LENGTH)?,
        precision: number(row, keys::PREC)?,
        scale: number(row, keys::SCALE)?,
        order: number(row, keys::PARAM_ORDER)?,
        collation: row.get(keys::COLLATION).and_then(non_blank),
    })
}

/// `None` when the row carries the "no identity" sentinel.
pub fn identity(row: &Row) -> Result<Option<Identity>> {
    let column = row.text(keys::IDENTITY)?;
    if column.trim().eq_ignore_ascii_case(NO_IDENTITY) {
        return Ok(None);
    }

    Ok(Some(Identity {
        column,
        seed: integer(row, keys::SEED)?,
        increment: integer(row, keys::INCREMENT)?,
    }))
}

/// `None` when the row carries the "no rowguidcol" sentinel.
pub fn row_guid_col(row: &Row) -> Result<Option<RowGuidCol>> {
    let column = row.text(keys::ROWGUIDCOL)?;
    if column.trim().eq_ignore_ascii_case(NO_ROWGUIDCOL) {
        return Ok(None);
    }
    Ok(Some(RowGuidCol { column }))
}

pub fn index(row: &Row) -> Result<Index> {
    Ok(Index {
        name: row.text(keys::INDEX_NAME)?,
        description: row.text(keys::INDEX_DESCRIPTION)?,
        keys: row.text(keys::INDEX_KEYS)?,
    })
}

pub fn constraint_detail(row: &Row) -> Result<ConstraintDetail> {
    Ok(ConstraintDetail {
        constraint_type: row.text(keys::CONSTRAINT_TYPE)?,
        constraint_name: row.text(keys::CONSTRAINT_NAME)?,
        delete_action: row.text(keys::DELETE_ACTION)?,
        update_action: row.text(keys::UPDATE_ACTION)?,
        status_enabled: row.text(keys::STATUS_ENABLED)?,
        status_for_replication: row.text(keys::STATUS_FOR_REPLICATION)?,
        constraint_keys: row.text(keys::CONSTRAINT_KEYS)?,
    })
}

/// Reference note text, read under the signature key of the active shape.
pub fn referenced_by(row: &Row, key: &str) -> Result<String> {
    row.text(key)
}

fn is_yes(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("yes")
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Blank numeric text means zero (the catalog pads non-numeric types with spaces).
fn number(row: &Row, key: &str) -> Result<i32> {
    let text = row.text(key)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i32>()
        .map_err(|_| Error::Contract(format!("`{key}` is not numeric: {trimmed:?}")))
}

fn integer(row: &Row, key: &str) -> Result<i64> {
    let text = row.text(key)?;
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| Error::Contract(format!("`{key}` is not an integer: {trimmed:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_column_row() -> Row {
        Row::new()
            .with("Column_name", "Id")
            .with("Type", "int")
            .with("Length", "4")
            .with("Prec", "")
            .with("Scale", "")
            .with("Nullable", "no")
            .with("Collation", "")
    }

    #[test]
    fn column_parses_blank_precision_as_zero() {
        let column = column(&id_column_row()).unwrap();
        assert_eq!(column.name, "Id");
        assert_eq!(column.data_type, "int");
        assert_eq!(column.length, 4);
        assert_eq!(column.precision, 0);
        assert_eq!(column.scale, 0);
        assert!(!column.nullable);
        assert!(!column.computed);
        assert_eq!(column.collation, None);
    }

    #[test]
    fn column_nullable_is_case_insensitive() {
        let row = id_column_row()
            .with("Nullable", "YES")
            .with("Prec", "10   ")
            .with("Collation", "SQL_Latin1_General_CP1_CI_AS")
            .with("Computed", "yes");
        let column = column(&row).unwrap();
        assert!(column.nullable);
        assert!(column.computed);
        assert_eq!(column.precision, 10);
        assert_eq!(
            column.collation.as_deref(),
            Some("SQL_Latin1_General_CP1_CI_AS")
        );
    }

    #[test]
    fn column_with_null_precision_reads_zero() {
        let mut row = id_column_row();
        row.insert("Prec", None);
        assert_eq!(column(&row).unwrap().precision, 0);
    }

    #[test]
    fn column_missing_length_is_contract_violation() {
        let row = Row::new()
            .with("Column_name", "Id")
            .with("Type", "int")
            .with("Prec", "")
            .with("Scale", "")
            .with("Nullable", "no");
        assert!(matches!(column(&row), Err(Error::Contract(_))));
    }

    #[test]
    fn column_rejects_garbage_length() {
        let row = id_column_row().with("Length", "four");
        let err = column(&row).unwrap_err();
        assert!(err.to_string().contains("Length"));
    }

    #[test]
    fn identity_sentinel_suppresses_identity() {
        let mut row = Row::new().with("Identity", "No identity column defined.");
        row.insert("Seed", None);
        row.insert("Increment", None);
        assert_eq!(identity(&row).unwrap(), None);

        let shouting = Row::new().with("Identity", "NO IDENTITY COLUMN DEFINED.");
        assert_eq!(identity(&shouting).unwrap(), None);
    }

    #[test]
    fn identity_parses_seed_and_increment() {
        let row = Row::new()
            .with("Identity", "OrderId")
            .with("Seed", "1000")
            .with("Increment", "5")
            .with("Not For Replication", "0");
        assert_eq!(
            identity(&row).unwrap(),
            Some(Identity {
                column: "OrderId".to_string(),
                seed: 1000,
                increment: 5,
            })
        );
    }

    #[test]
    fn row_guid_col_sentinel_suppresses_value() {
        let none = Row::new().with("RowGuidCol", "No rowguidcol column defined.");
        assert_eq!(row_guid_col(&none).unwrap(), None);

        let some = Row::new().with("RowGuidCol", "RowId");
        assert_eq!(
            row_guid_col(&some).unwrap(),
            Some(RowGuidCol {
                column: "RowId".to_string()
            })
        );
    }

    #[test]
    fn parameter_copies_fields() {
        let row = Row::new()
            .with("Parameter_name", "@CustomerId")
            .with("Type", "int")
            .with("Length", "4")
            .with("Prec", "10")
            .with("Scale", "0")
            .with("Param_order", "1")
            .with("Collation", "");
        let parameter = parameter(&row).unwrap();
        assert_eq!(parameter.name, "@CustomerId");
        assert_eq!(parameter.precision, 10);
        assert_eq!(parameter.order, 1);
        assert_eq!(parameter.collation, None);
    }

    #[test]
    fn constraint_detail_reads_all_fields() {
        let row = Row::new()
            .with("constraint_type", "FOREIGN KEY")
            .with("constraint_name", "FK_Orders_Customer")
            .with("delete_action", "Cascade")
            .with("update_action", "No Action")
            .with("status_enabled", "Enabled")
            .with("status_for_replication", "Is_For_Replication")
            .with("constraint_keys", "CustomerId");
        let detail = constraint_detail(&row).unwrap();
        assert_eq!(detail.constraint_name, "FK_Orders_Customer");
        assert_eq!(detail.delete_action, "Cascade");
        assert_eq!(detail.constraint_keys, "CustomerId");
    }
}
