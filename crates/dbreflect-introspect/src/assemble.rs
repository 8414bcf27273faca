//! Schema assembler: drives one import pass end to end.

use tokio_util::sync::CancellationToken;

use dbreflect_core::{
    Database, DbObject, Error, ImportFailure, ImportReport, ImportStage, ObjectKind, Parameter,
    Result, ScalarFunction, StoredProcedure, Table, TableFunction, View,
};

use crate::ENGINE;
use crate::adapter::Collaborators;
use crate::classify::RowSignatures;
use crate::options::ImportOptions;
use crate::overlay::OverlayMerger;
use crate::resolve;
use crate::walker::{self, ObjectFragments, StageError};

/// Catalog objects bucketed by category, each bucket in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    pub tables: Vec<DbObject>,
    pub views: Vec<DbObject>,
    pub procedures: Vec<DbObject>,
    pub table_functions: Vec<DbObject>,
    pub scalar_functions: Vec<DbObject>,
}

impl ImportPlan {
    /// Objects in import order: tables, views, procedures, table functions,
    /// scalar functions.
    pub fn ordered(&self) -> impl Iterator<Item = (ObjectKind, &DbObject)> {
        tagged(ObjectKind::Table, &self.tables)
            .chain(tagged(ObjectKind::View, &self.views))
            .chain(tagged(ObjectKind::StoredProcedure, &self.procedures))
            .chain(tagged(ObjectKind::TableFunction, &self.table_functions))
            .chain(tagged(ObjectKind::ScalarFunction, &self.scalar_functions))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
            + self.views.len()
            + self.procedures.len()
            + self.table_functions.len()
            + self.scalar_functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn tagged(kind: ObjectKind, objects: &[DbObject]) -> impl Iterator<Item = (ObjectKind, &DbObject)> {
    objects.iter().map(move |object| (kind, object))
}

/// Bucket discovered objects and drop everything the options filter out.
///
/// Filtering happens here, before any object is described.
pub fn plan_objects(objects: Vec<DbObject>, options: &ImportOptions) -> ImportPlan {
    let mut plan = ImportPlan::default();

    for object in objects {
        let Some(kind) = object.kind() else {
            tracing::debug!(
                event = "object_skipped",
                object = %object.full_name(),
                type_tag = %object.type_tag,
                reason = "unknown_type_tag",
            );
            continue;
        };
        if !options.includes_kind(kind) || !options.includes_schema(&object.schema) {
            continue;
        }
        if options.is_excluded(&object) {
            tracing::debug!(
                event = "object_skipped",
                object = %object.full_name(),
                reason = "excluded",
            );
            continue;
        }

        match kind {
            ObjectKind::Table => plan.tables.push(object),
            ObjectKind::View => plan.views.push(object),
            ObjectKind::StoredProcedure => plan.procedures.push(object),
            ObjectKind::TableFunction => plan.table_functions.push(object),
            ObjectKind::ScalarFunction => plan.scalar_functions.push(object),
        }
    }

    plan
}

/// Builds a [`Database`] from injected collaborators.
pub struct SchemaAssembler<'a> {
    collaborators: Collaborators<'a>,
    options: &'a ImportOptions,
    signatures: RowSignatures,
    cancel: Option<CancellationToken>,
}

impl<'a> SchemaAssembler<'a> {
    pub fn new(collaborators: Collaborators<'a>, options: &'a ImportOptions) -> Self {
        Self {
            collaborators,
            options,
            signatures: RowSignatures::default(),
            cancel: None,
        }
    }

    /// Use the signature table matching the connected server.
    pub fn with_signatures(mut self, signatures: RowSignatures) -> Self {
        self.signatures = signatures;
        self
    }

    /// Stop between objects, or mid-describe, once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run one import pass.
    ///
    /// Catalog enumeration failures abort the import. Per-object failures are
    /// recorded in the report, or abort with [`Error::Import`] when the
    /// options are strict.
    pub async fn import(&self) -> Result<ImportReport> {
        let catalog = self.collaborators.catalog;
        let name = catalog.database_name().await.map_err(catalog_error)?;
        let objects = catalog.list_objects().await.map_err(catalog_error)?;
        let discovered = objects.len();
        let plan = plan_objects(objects, self.options);

        tracing::info!(
            event = "import_started",
            database = name.as_deref().unwrap_or_default(),
            discovered,
            planned = plan.len(),
            shape = ?self.signatures.version(),
        );

        let mut database = Database::new(ENGINE, name);
        let mut failures = Vec::new();
        let mut cancelled = false;

        for (kind, object) in plan.ordered() {
            let Some(outcome) = self.import_object(kind, object).await else {
                cancelled = true;
                tracing::warn!(
                    event = "import_cancelled",
                    object = %object.full_name(),
                );
                break;
            };

            match outcome {
                Ok(entity) => entity.attach_to(&mut database),
                Err(StageError { stage, error }) => {
                    let failure = ImportFailure {
                        object: object.full_name(),
                        stage,
                        message: error.to_string(),
                    };
                    if self.options.strict {
                        return Err(Error::Import {
                            object: failure.object,
                            stage: failure.stage,
                            message: failure.message,
                        });
                    }
                    tracing::warn!(
                        event = "object_failed",
                        object = %failure.object,
                        stage = %failure.stage,
                        error = %failure.message,
                    );
                    failures.push(failure);
                }
            }
        }

        if self.options.include_extended_properties && !cancelled {
            OverlayMerger::new(
                self.collaborators.properties,
                &self.options.property_names,
                &self.options.description_property,
                self.options.strict,
            )
            .merge(&mut database, &mut failures)
            .await?;
        }

        tracing::info!(
            event = "import_finished",
            tables = database.tables.len(),
            views = database.views.len(),
            stored_procedures = database.stored_procedures.len(),
            table_functions = database.table_functions.len(),
            scalar_functions = database.scalar_functions.len(),
            failures = failures.len(),
            cancelled,
        );

        Ok(ImportReport {
            database,
            failures,
            cancelled,
        })
    }

    /// `None` when cancellation won; the in-flight object's fragments are
    /// dropped.
    async fn import_object(
        &self,
        kind: ObjectKind,
        object: &DbObject,
    ) -> Option<std::result::Result<Entity, StageError>> {
        let work = async {
            walker::walk(self.collaborators.introspector, object, &self.signatures)
                .await
                .and_then(|fragments| build_entity(kind, object, fragments))
        };

        match &self.cancel {
            Some(token) => {
                if token.is_cancelled() {
                    return None;
                }
                tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    outcome = work => Some(outcome),
                }
            }
            None => Some(work.await),
        }
    }
}

fn catalog_error(err: Error) -> Error {
    Error::Import {
        object: "<catalog>".to_string(),
        stage: ImportStage::Catalog,
        message: err.to_string(),
    }
}

/// A fully resolved object waiting to be appended to the aggregate.
#[derive(Debug)]
enum Entity {
    Table(Table),
    View(View),
    Procedure(StoredProcedure),
    TableFunction(TableFunction),
    ScalarFunction(ScalarFunction),
}

impl Entity {
    fn attach_to(self, database: &mut Database) {
        match self {
            Entity::Table(table) => database.tables.push(table),
            Entity::View(view) => database.views.push(view),
            Entity::Procedure(procedure) => database.stored_procedures.push(procedure),
            Entity::TableFunction(function) => database.table_functions.push(function),
            Entity::ScalarFunction(function) => database.scalar_functions.push(function),
        }
    }
}

fn build_entity(
    kind: ObjectKind,
    object: &DbObject,
    fragments: ObjectFragments,
) -> std::result::Result<Entity, StageError> {
    let schema = object.schema.clone();
    let name = object.name.clone();

    let entity = match kind {
        ObjectKind::Table => {
            let resolved = resolve::resolve(&fragments.constraints)
                .map_err(|err| StageError::new(ImportStage::Resolve, err))?;
            Entity::Table(Table {
                columns: fragments.columns,
                identity: fragments.identity,
                row_guid_col: fragments.row_guid_col,
                indexes: fragments.indexes,
                primary_key: resolved.primary_key,
                foreign_keys: resolved.foreign_keys,
                uniques: resolved.uniques,
                checks: resolved.checks,
                defaults: resolved.defaults,
                referenced_by: fragments.referenced_by,
                ..Table::new(schema, name)
            })
        }
        ObjectKind::View => Entity::View(View {
            schema,
            name,
            description: None,
            columns: fragments.columns,
            identity: fragments.identity,
            row_guid_col: fragments.row_guid_col,
            indexes: fragments.indexes,
            extended_properties: Vec::new(),
        }),
        ObjectKind::StoredProcedure => Entity::Procedure(StoredProcedure {
            schema,
            name,
            description: None,
            parameters: fragments.parameters,
            extended_properties: Vec::new(),
        }),
        ObjectKind::TableFunction => Entity::TableFunction(TableFunction {
            schema,
            name,
            description: None,
            parameters: fragments.parameters,
            columns: fragments.columns,
            identity: fragments.identity,
            extended_properties: Vec::new(),
        }),
        ObjectKind::ScalarFunction => {
            let (return_type, parameters) = split_return_value(fragments.parameters);
            Entity::ScalarFunction(ScalarFunction {
                schema,
                name,
                description: None,
                parameters,
                return_type,
                extended_properties: Vec::new(),
            })
        }
    };

    Ok(entity)
}

// The return value of a scalar function is reported as a parameter with no name.
fn split_return_value(parameters: Vec<Parameter>) -> (Option<String>, Vec<Parameter>) {
    let mut return_type = None;
    let mut kept = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        if parameter.name.is_empty() && return_type.is_none() {
            return_type = Some(parameter.data_type);
        } else {
            kept.push(parameter);
        }
    }
    (return_type, kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objects() -> Vec<DbObject> {
        vec![
            DbObject::new("dbo", "GetTotal", "FN"),
            DbObject::new("dbo", "Orders", "U"),
            DbObject::new("sales", "OrderSummary", "V"),
            DbObject::new("dbo", "AddOrder", "P"),
            DbObject::new("dbo", "Lines", "U"),
            DbObject::new("dbo", "OrdersByDay", "IF"),
            DbObject::new("dbo", "TR_Orders", "TR"),
        ]
    }

    fn names(plan: &ImportPlan) -> Vec<String> {
        plan.ordered().map(|(_, object)| object.full_name()).collect()
    }

    #[test]
    fn plan_orders_categories_and_keeps_discovery_order() {
        let plan = plan_objects(objects(), &ImportOptions::default());
        assert_eq!(
            names(&plan),
            vec![
                "dbo.Orders",
                "dbo.Lines",
                "sales.OrderSummary",
                "dbo.AddOrder",
                "dbo.OrdersByDay",
                "dbo.GetTotal",
            ]
        );
    }

    #[test]
    fn plan_applies_exclusions_schemas_and_toggles() {
        let options = ImportOptions {
            exclude: vec!["dbo.Lines".to_string(), "dbo.orders".to_string()],
            schemas: Some(vec!["dbo".to_string()]),
            include_procedures: false,
            ..ImportOptions::default()
        };
        let plan = plan_objects(objects(), &options);
        assert_eq!(
            names(&plan),
            vec!["dbo.Orders", "dbo.OrdersByDay", "dbo.GetTotal"]
        );
    }

    #[test]
    fn blank_parameter_becomes_return_type() {
        let parameter = |name: &str, data_type: &str, order: i32| Parameter {
            name: name.to_string(),
            data_type: data_type.to_string(),
            length: 4,
            precision: 10,
            scale: 0,
            order,
            collation: None,
        };
        let (return_type, parameters) = split_return_value(vec![
            parameter("", "money", 0),
            parameter("@OrderId", "int", 1),
        ]);
        assert_eq!(return_type.as_deref(), Some("money"));
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].name, "@OrderId");
    }

    #[test]
    fn table_with_no_constraints_resolves_empty() {
        let object = DbObject::new("dbo", "Audit", "U");
        let Ok(Entity::Table(table)) =
            build_entity(ObjectKind::Table, &object, ObjectFragments::default())
        else {
            panic!("expected a table");
        };
        assert!(table.primary_key.is_none());
        assert!(table.foreign_keys.is_empty());
        assert!(table.uniques.is_empty());
        assert!(table.checks.is_empty());
    }
}
