//! Text coercion of TDS values.
//!
//! Catalog procedures mostly return character data, but a few columns
//! (`Length`, `Param_order`, `Seed`) arrive as numbers depending on the server
//! generation. Everything is flattened to text so rows keep one shape.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tiberius::{ColumnData, FromSql};

use dbreflect_core::Result;

use super::queries::db_error;

/// `None` for SQL `NULL`.
pub fn to_text(data: &ColumnData<'static>) -> Result<Option<String>> {
    let text = match data {
        ColumnData::U8(value) => value.as_ref().map(|v| v.to_string()),
        ColumnData::I16(value) => value.as_ref().map(|v| v.to_string()),
        ColumnData::I32(value) => value.as_ref().map(|v| v.to_string()),
        ColumnData::I64(value) => value.as_ref().map(|v| v.to_string()),
        ColumnData::F32(value) => value.as_ref().map(|v| v.to_string()),
        ColumnData::F64(value) => value.as_ref().map(|v| v.to_string()),
        ColumnData::Bit(value) => value.as_ref().map(|v| (if *v { "1" } else { "0" }).to_string()),
        ColumnData::String(value) => value.as_ref().map(|v| v.to_string()),
        ColumnData::Guid(value) => value.as_ref().map(|v| v.to_string()),
        ColumnData::Numeric(value) => value.as_ref().map(|v| v.to_string()),
        ColumnData::Binary(value) => value
            .as_ref()
            .map(|bytes| format!("0x{}", hex::encode_upper(bytes))),
        ColumnData::Xml(value) => value
            .as_ref()
            .map(|xml| xml.clone().into_owned().into_string()),
        ColumnData::Date(_) => NaiveDate::from_sql(data)
            .map_err(db_error)?
            .map(|v| v.to_string()),
        ColumnData::Time(_) => NaiveTime::from_sql(data)
            .map_err(db_error)?
            .map(|v| v.to_string()),
        ColumnData::DateTimeOffset(_) => DateTime::<Utc>::from_sql(data)
            .map_err(db_error)?
            .map(|v| v.to_rfc3339()),
        // datetime, smalldatetime, datetime2
        _ => NaiveDateTime::from_sql(data)
            .map_err(db_error)?
            .map(|v| v.to_string()),
    };
    Ok(text)
}
