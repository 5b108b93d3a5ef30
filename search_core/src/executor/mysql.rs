use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, MySql, MySqlPool, Row, TypeInfo};
use type_mapping::SqlValue;

use super::{RawRow, SqlExecutor};
use crate::errors::SearchError;
use crate::sql_resolver::SqlStatement;

/// MySQL executor backed by a sqlx pool
#[derive(Debug, Clone)]
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl SqlExecutor for MySqlExecutor {
    async fn fetch_rows(&self, statement: &SqlStatement) -> Result<Vec<RawRow>, SearchError> {
        let mut query = sqlx::query::<MySql>(&statement.sql);
        for value in &statement.params {
            query = bind_sql_value!(query, value);
        }

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| SearchError::execution(&statement.sql, e))?;
        let rows = query
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| SearchError::execution(&statement.sql, e))?;

        crate::trace_log!("Fetched {} rows", rows.len());

        rows.iter()
            .map(|row| decode_row(row).map_err(|e| SearchError::execution(&statement.sql, e)))
            .collect()
    }

    async fn fetch_count(&self, statement: &SqlStatement) -> Result<i64, SearchError> {
        let mut query = sqlx::query_scalar::<MySql, i64>(&statement.sql);
        for value in &statement.params {
            query = bind_sql_value!(query, value);
        }

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| SearchError::execution(&statement.sql, e))?;
        query
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| SearchError::execution(&statement.sql, e))
    }
}

fn decode_row(row: &MySqlRow) -> Result<RawRow, sqlx::Error> {
    let mut raw = RawRow::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        raw.insert(column.name().to_string(), decode_value(row, idx)?);
    }
    Ok(raw)
}

fn decode_value(row: &MySqlRow, idx: usize) -> Result<SqlValue, sqlx::Error> {
    let type_name = row.column(idx).type_info().name();
    let value = match type_name {
        "BOOLEAN" => row.try_get::<Option<bool>, _>(idx)?.map(SqlValue::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::Int)
        }
        name if name.ends_with(" UNSIGNED") => {
            row.try_get::<Option<u64>, _>(idx)?.map(|v| match i64::try_from(v) {
                Ok(v) => SqlValue::Int(v),
                Err(_) => SqlValue::Text(v.to_string()),
            })
        }
        "YEAR" => row
            .try_get::<Option<u16>, _>(idx)?
            .map(|v| SqlValue::Int(v.into())),
        "FLOAT" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(|v| SqlValue::Float(v.into())),
        "DOUBLE" => row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Float),
        "DECIMAL" => row
            .try_get::<Option<Decimal>, _>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(SqlValue::Date),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        "DATETIME" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(SqlValue::DateTime),
        "TIMESTAMP" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|v| SqlValue::DateTime(v.naive_utc())),
        "JSON" => row
            .try_get::<Option<serde_json::Value>, _>(idx)?
            .map(SqlValue::Json),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(idx)?
            .map(|v| SqlValue::Text(String::from_utf8_lossy(&v).into_owned())),
        // Text-compatible columns; others need a `CAST(... AS CHAR)` in the field expression
        _ => row.try_get::<Option<String>, _>(idx)?.map(SqlValue::Text),
    };
    Ok(value.unwrap_or(SqlValue::Null))
}
