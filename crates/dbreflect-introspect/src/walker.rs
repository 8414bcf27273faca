//! Multi-result-set walker.
//!
//! One introspection call per object. The collaborator hands back every
//! result set fully drained; rows are then routed in result-set order, then
//! row order, so continuation rows keep following the rows they continue.

use dbreflect_core::{
    Column, DbObject, Error, Identity, ImportStage, Index, Parameter, Result, RowGuidCol,
};

use crate::adapter::Introspector;
use crate::classify::{RowKind, RowSignatures};
use crate::materialize;
use crate::resolve::ConstraintDetail;
use crate::row::{ResultSet, Row};

/// Typed fragments collected for one catalog object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectFragments {
    pub columns: Vec<Column>,
    pub identity: Option<Identity>,
    pub row_guid_col: Option<RowGuidCol>,
    pub indexes: Vec<Index>,
    pub constraints: Vec<ConstraintDetail>,
    pub parameters: Vec<Parameter>,
    pub referenced_by: Vec<String>,
    /// Rows that matched no signature.
    pub ignored_rows: usize,
}

/// Error tagged with the pipeline stage it came from.
#[derive(Debug)]
pub struct StageError {
    pub stage: ImportStage,
    pub error: Error,
}

impl StageError {
    pub fn new(stage: ImportStage, error: Error) -> Self {
        Self { stage, error }
    }
}

/// Describe one object and collect its fragments.
pub async fn walk(
    introspector: &dyn Introspector,
    object: &DbObject,
    signatures: &RowSignatures,
) -> std::result::Result<ObjectFragments, StageError> {
    let result_sets = introspector
        .describe(object)
        .await
        .map_err(|err| StageError::new(ImportStage::Describe, err))?;

    let fragments = collect(&result_sets, signatures)
        .map_err(|err| StageError::new(ImportStage::Materialize, err))?;

    tracing::debug!(
        event = "object_walked",
        object = %object.full_name(),
        result_sets = result_sets.len(),
        columns = fragments.columns.len(),
        constraints = fragments.constraints.len(),
        ignored_rows = fragments.ignored_rows,
    );

    Ok(fragments)
}

/// Route every row of every result set through classification and
/// materialization.
pub fn collect(result_sets: &[ResultSet], signatures: &RowSignatures) -> Result<ObjectFragments> {
    let mut fragments = ObjectFragments::default();

    for (set_index, rows) in result_sets.iter().enumerate() {
        for (row_index, row) in rows.iter().enumerate() {
            route(row, signatures, &mut fragments).map_err(|err| match err {
                Error::Contract(message) => Error::Contract(format!(
                    "result set {set_index}, row {row_index}: {message}"
                )),
                other => other,
            })?;
        }
    }

    Ok(fragments)
}

fn route(row: &Row, signatures: &RowSignatures, fragments: &mut ObjectFragments) -> Result<()> {
    let Some(kind) = signatures.classify(row) else {
        fragments.ignored_rows += 1;
        return Ok(());
    };

    match kind {
        RowKind::Column => fragments.columns.push(materialize::column(row)?),
        RowKind::Parameter => fragments.parameters.push(materialize::parameter(row)?),
        RowKind::Identity => {
            if let Some(identity) = materialize::identity(row)? {
                fragments.identity = Some(identity);
            }
        }
        RowKind::RowGuidCol => {
            if let Some(column) = materialize::row_guid_col(row)? {
                fragments.row_guid_col = Some(column);
            }
        }
        RowKind::Index => fragments.indexes.push(materialize::index(row)?),
        RowKind::Constraint => fragments
            .constraints
            .push(materialize::constraint_detail(row)?),
        RowKind::ReferencedBy => {
            let key = signatures.key(RowKind::ReferencedBy);
            let note = materialize::referenced_by(row, key)?;
            if !note.trim().is_empty() {
                fragments.referenced_by.push(note);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(kind: &str, name: &str, keys: &str) -> Row {
        Row::new()
            .with("constraint_type", kind)
            .with("constraint_name", name)
            .with("delete_action", "No Action")
            .with("update_action", "No Action")
            .with("status_enabled", "Enabled")
            .with("status_for_replication", "Is_For_Replication")
            .with("constraint_keys", keys)
    }

    #[test]
    fn routes_rows_across_result_sets_in_order() {
        let result_sets = vec![
            vec![
                Row::new()
                    .with("Name", "Orders")
                    .with("Owner", "dbo")
                    .with("Type", "user table"),
            ],
            vec![
                Row::new()
                    .with("Column_name", "Id")
                    .with("Type", "int")
                    .with("Length", "4")
                    .with("Prec", "10")
                    .with("Scale", "0")
                    .with("Nullable", "no"),
            ],
            vec![
                Row::new()
                    .with("Identity", "Id")
                    .with("Seed", "1")
                    .with("Increment", "1"),
            ],
            vec![Row::new().with("RowGuidCol", "No rowguidcol column defined.")],
            vec![
                Row::new()
                    .with("index_name", "PK_Orders")
                    .with("index_description", "clustered, unique, primary key located on PRIMARY")
                    .with("index_keys", "Id"),
            ],
            vec![
                constraint("FOREIGN KEY", "FK_Orders_Customer", "CustomerId"),
                constraint(" ", " ", "REFERENCES dbo.Customer (Id)"),
            ],
            vec![constraint("PRIMARY KEY (clustered)", "PK_Orders", "Id")],
            vec![Row::new().with("Table is referenced by foreign key", "dbo.Lines: FK_Lines_Orders")],
        ];

        let fragments = collect(&result_sets, &RowSignatures::modern()).unwrap();
        assert_eq!(fragments.columns.len(), 1);
        assert_eq!(fragments.identity.as_ref().map(|i| i.seed), Some(1));
        assert_eq!(fragments.row_guid_col, None);
        assert_eq!(fragments.indexes[0].name, "PK_Orders");
        let kinds: Vec<_> = fragments
            .constraints
            .iter()
            .map(|detail| detail.constraint_type.as_str())
            .collect();
        assert_eq!(kinds, vec!["FOREIGN KEY", " ", "PRIMARY KEY (clustered)"]);
        assert_eq!(fragments.referenced_by, vec!["dbo.Lines: FK_Lines_Orders"]);
        assert_eq!(fragments.ignored_rows, 1);
    }

    #[test]
    fn contract_violation_names_its_position() {
        let result_sets = vec![
            vec![],
            vec![Row::new().with("Column_name", "Id").with("Type", "int")],
        ];
        let err = collect(&result_sets, &RowSignatures::modern()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("result set 1, row 0"), "{message}");
        assert!(message.contains("Length"), "{message}");
    }
}
