//! Extended-property overlay.
//!
//! Runs after structural assembly and mutates entities in place. The first
//! value found for a property name at an address is kept; later duplicates
//! are dropped with a warning.

use dbreflect_core::{
    Column, Database, Error, ExtendedProperty, ImportFailure, ImportStage, PropertyAddress,
    PropertyValue, Result, ScalarFunction, StoredProcedure, Table, TableFunction, View,
};

use crate::adapter::PropertySource;

/// An entity that can carry extended properties and a description.
pub trait Documented: Send {
    fn description_mut(&mut self) -> &mut Option<String>;
    fn properties_mut(&mut self) -> &mut Vec<ExtendedProperty>;
}

macro_rules! documented {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Documented for $ty {
                fn description_mut(&mut self) -> &mut Option<String> {
                    &mut self.description
                }

                fn properties_mut(&mut self) -> &mut Vec<ExtendedProperty> {
                    &mut self.extended_properties
                }
            }
        )*
    };
}

documented!(Database, Table, View, StoredProcedure, TableFunction, ScalarFunction, Column);

/// Attaches extended properties onto an assembled database.
pub struct OverlayMerger<'a> {
    source: &'a dyn PropertySource,
    property_names: &'a [String],
    description_property: &'a str,
    strict: bool,
}

impl<'a> OverlayMerger<'a> {
    pub fn new(
        source: &'a dyn PropertySource,
        property_names: &'a [String],
        description_property: &'a str,
        strict: bool,
    ) -> Self {
        Self {
            source,
            property_names,
            description_property,
            strict,
        }
    }

    /// Query every addressable entity for every requested property.
    ///
    /// Lookup failures are recorded in `failures` unless the merger is strict.
    pub async fn merge(
        &self,
        database: &mut Database,
        failures: &mut Vec<ImportFailure>,
    ) -> Result<()> {
        for name in self.property_names {
            self.apply(name, &PropertyAddress::database(), database, failures)
                .await?;

            for table in &mut database.tables {
                let address = PropertyAddress::object(&table.schema, "TABLE", &table.name);
                self.apply(name, &address, table, failures).await?;
                for column in &mut table.columns {
                    let address =
                        PropertyAddress::column(&table.schema, "TABLE", &table.name, &column.name);
                    self.apply(name, &address, column, failures).await?;
                }
            }

            for view in &mut database.views {
                let address = PropertyAddress::object(&view.schema, "VIEW", &view.name);
                self.apply(name, &address, view, failures).await?;
                for column in &mut view.columns {
                    let address =
                        PropertyAddress::column(&view.schema, "VIEW", &view.name, &column.name);
                    self.apply(name, &address, column, failures).await?;
                }
            }

            for procedure in &mut database.stored_procedures {
                let address =
                    PropertyAddress::object(&procedure.schema, "PROCEDURE", &procedure.name);
                self.apply(name, &address, procedure, failures).await?;
            }

            for function in &mut database.table_functions {
                let address = PropertyAddress::object(&function.schema, "FUNCTION", &function.name);
                self.apply(name, &address, function, failures).await?;
            }

            for function in &mut database.scalar_functions {
                let address = PropertyAddress::object(&function.schema, "FUNCTION", &function.name);
                self.apply(name, &address, function, failures).await?;
            }
        }

        Ok(())
    }

    async fn apply<T: Documented>(
        &self,
        name: &str,
        address: &PropertyAddress,
        target: &mut T,
        failures: &mut Vec<ImportFailure>,
    ) -> Result<()> {
        match self.source.list_properties(name, address).await {
            Ok(values) => {
                attach(target, name, values, self.description_property, address);
                Ok(())
            }
            Err(err) => {
                let object = address.display_name();
                if self.strict {
                    return Err(Error::Import {
                        object,
                        stage: ImportStage::Overlay,
                        message: err.to_string(),
                    });
                }
                tracing::warn!(
                    event = "property_lookup_failed",
                    object = %object,
                    property = %name,
                    error = %err,
                );
                failures.push(ImportFailure {
                    object,
                    stage: ImportStage::Overlay,
                    message: err.to_string(),
                });
                Ok(())
            }
        }
    }
}

fn attach<T: Documented>(
    target: &mut T,
    requested: &str,
    values: Vec<PropertyValue>,
    description_property: &str,
    address: &PropertyAddress,
) {
    for value in values.into_iter().filter(|value| value.name == requested) {
        if target
            .properties_mut()
            .iter()
            .any(|existing| existing.name == value.name)
        {
            tracing::warn!(
                event = "property_collision",
                object = %address.display_name(),
                property = %value.name,
                "duplicate extended property dropped"
            );
            continue;
        }

        if value.name == description_property {
            *target.description_mut() = Some(value.value.clone());
        }
        target.properties_mut().push(ExtendedProperty {
            name: value.name,
            value: value.value,
        });
    }
}
