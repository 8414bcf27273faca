use async_trait::async_trait;

use dbreflect_core::{DbObject, ImportReport, PropertyAddress, PropertyValue, Result};

use crate::options::ImportOptions;
use crate::row::ResultSet;

/// Enumerates candidate catalog objects.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Name of the connected database, when the server reports one.
    async fn database_name(&self) -> Result<Option<String>>;

    /// Candidate objects in discovery order.
    async fn list_objects(&self) -> Result<Vec<DbObject>>;
}

/// Describes one catalog object with a single multi-result-set call.
#[async_trait]
pub trait Introspector: Send + Sync {
    /// Every result set the call produced, in order, each fully drained.
    async fn describe(&self, object: &DbObject) -> Result<Vec<ResultSet>>;
}

/// Read path for extended properties.
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Properties named `name` stored at `address`.
    async fn list_properties(
        &self,
        name: &str,
        address: &PropertyAddress,
    ) -> Result<Vec<PropertyValue>>;
}

/// Collaborators injected into the schema assembler.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub catalog: &'a dyn Catalog,
    pub introspector: &'a dyn Introspector,
    pub properties: &'a dyn PropertySource,
}

impl<'a> Collaborators<'a> {
    /// Use one value for all three roles, as a live connection does.
    pub fn from_single<T>(source: &'a T) -> Self
    where
        T: Catalog + Introspector + PropertySource,
    {
        Self {
            catalog: source,
            introspector: source,
            properties: source,
        }
    }
}

/// Trait implemented by database adapters that can import schemas.
#[async_trait]
pub trait Adapter {
    /// Returns the engine identifier (e.g. `mssql`).
    fn engine(&self) -> &'static str;

    /// Import the database and return the report.
    async fn introspect(&self, opts: &ImportOptions) -> Result<ImportReport>;
}
