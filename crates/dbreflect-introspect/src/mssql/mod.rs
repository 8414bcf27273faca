use async_trait::async_trait;
use tiberius::{Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tokio_util::sync::CancellationToken;

use dbreflect_core::{DbObject, ImportReport, PropertyAddress, PropertyValue, Result};

use crate::ENGINE;
use crate::adapter::{Adapter, Catalog, Collaborators, Introspector, PropertySource};
use crate::assemble::SchemaAssembler;
use crate::classify::RowSignatures;
use crate::options::ImportOptions;
use crate::row::ResultSet;

mod queries;
mod session;
mod values;

use queries::{MssqlClient, db_error};
use session::Exclusive;

/// Adapter for SQL Server databases.
///
/// One connection, used by one call at a time: `sp_help` streams have to be
/// drained before the next request goes out. An import cancelled mid-request
/// leaves the connection unusable; later calls fail with `Error::Db` and the
/// caller has to connect again.
pub struct MssqlAdapter {
    client: Exclusive<MssqlClient>,
    signatures: RowSignatures,
    cancel: Option<CancellationToken>,
}

impl MssqlAdapter {
    /// Connect with an ADO.NET connection string.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let config = Config::from_ado_string(connection_string).map_err(db_error)?;
        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|err| dbreflect_core::Error::Db(err.to_string()))?;
        tcp.set_nodelay(true)
            .map_err(|err| dbreflect_core::Error::Db(err.to_string()))?;
        let mut client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(db_error)?;

        let major = queries::fetch_major_version(&mut client).await?;
        let signatures = RowSignatures::for_major_version(major);
        tracing::debug!(
            event = "mssql_connected",
            major_version = major,
            shape = ?signatures.version(),
        );

        Ok(Self {
            client: Exclusive::new(client),
            signatures,
            cancel: None,
        })
    }

    /// Cancel imports run through [`Adapter::introspect`] with `token`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn signatures(&self) -> RowSignatures {
        self.signatures
    }
}

#[async_trait]
impl Catalog for MssqlAdapter {
    async fn database_name(&self) -> Result<Option<String>> {
        let mut client = self.client.lock().await?;
        let result = queries::fetch_database_name(&mut client).await;
        client.finish(result)
    }

    async fn list_objects(&self) -> Result<Vec<DbObject>> {
        let mut client = self.client.lock().await?;
        let result = queries::list_objects(&mut client, self.signatures.version()).await;
        client.finish(result)
    }
}

#[async_trait]
impl Introspector for MssqlAdapter {
    async fn describe(&self, object: &DbObject) -> Result<Vec<ResultSet>> {
        let mut client = self.client.lock().await?;
        let result = queries::describe_object(&mut client, object).await;
        client.finish(result)
    }
}

#[async_trait]
impl PropertySource for MssqlAdapter {
    async fn list_properties(
        &self,
        name: &str,
        address: &PropertyAddress,
    ) -> Result<Vec<PropertyValue>> {
        let mut client = self.client.lock().await?;
        let result = queries::list_properties(&mut client, name, address).await;
        client.finish(result)
    }
}

#[async_trait]
impl Adapter for MssqlAdapter {
    fn engine(&self) -> &'static str {
        ENGINE
    }

    async fn introspect(&self, opts: &ImportOptions) -> Result<ImportReport> {
        let mut assembler = SchemaAssembler::new(Collaborators::from_single(self), opts)
            .with_signatures(self.signatures);
        if let Some(token) = &self.cancel {
            assembler = assembler.with_cancellation(token.clone());
        }
        assembler.import().await
    }
}

/// Connect and import a SQL Server database with default options.
pub async fn introspect_mssql(connection_string: &str) -> Result<ImportReport> {
    introspect_mssql_with_options(connection_string, &ImportOptions::default()).await
}

/// Connect and import a SQL Server database with caller-provided options.
pub async fn introspect_mssql_with_options(
    connection_string: &str,
    opts: &ImportOptions,
) -> Result<ImportReport> {
    let adapter = MssqlAdapter::connect(connection_string).await?;
    adapter.introspect(opts).await
}
