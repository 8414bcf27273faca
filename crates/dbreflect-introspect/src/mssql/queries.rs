use tiberius::{Client, Query};
use tokio::net::TcpStream;
use tokio_util::compat::Compat;

use dbreflect_core::{DbObject, Error, PropertyAddress, PropertyValue, Result};

use crate::classify::ShapeVersion;
use crate::row::{ResultSet, Row};

use super::values;

pub type MssqlClient = Client<Compat<TcpStream>>;

pub(crate) fn db_error(err: tiberius::error::Error) -> Error {
    Error::Db(err.to_string())
}

/// Major version of the connected server (8 = SQL Server 2000, 9 = 2005, ...).
pub async fn fetch_major_version(client: &mut MssqlClient) -> Result<i32> {
    let row = client
        .simple_query("select @@MICROSOFTVERSION / 0x01000000 as major")
        .await
        .map_err(db_error)?
        .into_row()
        .await
        .map_err(db_error)?
        .ok_or_else(|| Error::Db("server version query returned no row".to_string()))?;

    row.try_get::<i32, _>("major")
        .map_err(db_error)?
        .ok_or_else(|| Error::Db("server version is null".to_string()))
}

pub async fn fetch_database_name(client: &mut MssqlClient) -> Result<Option<String>> {
    let row = client
        .simple_query("select db_name() as name")
        .await
        .map_err(db_error)?
        .into_row()
        .await
        .map_err(db_error)?;

    match row {
        Some(row) => Ok(row
            .try_get::<&str, _>("name")
            .map_err(db_error)?
            .map(str::to_string)),
        None => Ok(None),
    }
}

const LIST_OBJECTS: &str = r#"
    select
      s.name as schema_name,
      o.name as object_name,
      rtrim(o.type) as type_tag
    from sys.objects o
    join sys.schemas s on s.schema_id = o.schema_id
    where o.type in ('U', 'V', 'P', 'FN', 'IF', 'TF')
      and o.is_ms_shipped = 0
    order by o.object_id
"#;

const LIST_OBJECTS_LEGACY: &str = r#"
    select
      user_name(o.uid) as schema_name,
      o.name as object_name,
      rtrim(o.xtype) as type_tag
    from sysobjects o
    where o.xtype in ('U', 'V', 'P', 'FN', 'IF', 'TF')
      and objectproperty(o.id, 'IsMSShipped') = 0
    order by o.id
"#;

/// Candidate objects in catalog (creation) order.
pub async fn list_objects(client: &mut MssqlClient, shape: ShapeVersion) -> Result<Vec<DbObject>> {
    let sql = match shape {
        ShapeVersion::Modern => LIST_OBJECTS,
        ShapeVersion::Legacy => LIST_OBJECTS_LEGACY,
    };
    let rows = client
        .simple_query(sql)
        .await
        .map_err(db_error)?
        .into_first_result()
        .await
        .map_err(db_error)?;

    rows.iter()
        .map(|row| {
            Ok(DbObject::new(
                required(row, "schema_name")?,
                required(row, "object_name")?,
                required(row, "type_tag")?,
            ))
        })
        .collect()
}

/// Run `sp_help` for one object and drain every result set before returning.
pub async fn describe_object(client: &mut MssqlClient, object: &DbObject) -> Result<Vec<ResultSet>> {
    let mut query = Query::new("exec sp_help @objname = @P1");
    query.bind(quoted_name(object));

    let results = query
        .query(client)
        .await
        .map_err(db_error)?
        .into_results()
        .await
        .map_err(db_error)?;

    results
        .into_iter()
        .map(|rows| rows.iter().map(text_row).collect::<Result<ResultSet>>())
        .collect()
}

pub async fn list_properties(
    client: &mut MssqlClient,
    name: &str,
    address: &PropertyAddress,
) -> Result<Vec<PropertyValue>> {
    let mut query = Query::new(
        r#"
        select
          name,
          cast(value as nvarchar(max)) as value
        from fn_listextendedproperty(@P1, @P2, @P3, @P4, @P5, @P6, @P7)
        "#,
    );
    query.bind(name);
    for level in [&address.level0, &address.level1, &address.level2] {
        query.bind(level.as_ref().map(|level| level.kind.as_str()));
        query.bind(level.as_ref().map(|level| level.name.as_str()));
    }

    let rows = query
        .query(client)
        .await
        .map_err(db_error)?
        .into_first_result()
        .await
        .map_err(db_error)?;

    rows.iter()
        .map(|row| {
            Ok(PropertyValue {
                name: required(row, "name")?,
                value: row
                    .try_get::<&str, _>("value")
                    .map_err(db_error)?
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}

fn quoted_name(object: &DbObject) -> String {
    format!("{}.{}", bracket(&object.schema), bracket(&object.name))
}

fn bracket(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
}

fn required(row: &tiberius::Row, column: &str) -> Result<String> {
    row.try_get::<&str, _>(column)
        .map_err(db_error)?
        .map(str::to_string)
        .ok_or_else(|| Error::Db(format!("catalog column `{column}` is null")))
}

fn text_row(row: &tiberius::Row) -> Result<Row> {
    row.cells()
        .map(|(column, data)| Ok((column.name().to_string(), values::to_text(data)?)))
        .collect()
}
