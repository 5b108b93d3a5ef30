use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Postgres, Row, TypeInfo};
use type_mapping::SqlValue;
use uuid::Uuid;

use super::{RawRow, SqlExecutor};
use crate::errors::SearchError;
use crate::sql_resolver::SqlStatement;

/// PostgreSQL executor backed by a sqlx pool
#[derive(Debug, Clone)]
pub struct PgSqlExecutor {
    pool: PgPool,
}

impl PgSqlExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SqlExecutor for PgSqlExecutor {
    async fn fetch_rows(&self, statement: &SqlStatement) -> Result<Vec<RawRow>, SearchError> {
        let mut query = sqlx::query::<Postgres>(&statement.sql);
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
        let mut query = sqlx::query_scalar::<Postgres, i64>(&statement.sql);
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

fn decode_row(row: &PgRow) -> Result<RawRow, sqlx::Error> {
    let mut raw = RawRow::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        raw.insert(column.name().to_string(), decode_value(row, idx)?);
    }
    Ok(raw)
}

fn decode_value(row: &PgRow, idx: usize) -> Result<SqlValue, sqlx::Error> {
    let value = match row.column(idx).type_info().name() {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(SqlValue::Bool),
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)?
            .map(|v| SqlValue::Int(v.into())),
        "INT4" => row
            .try_get::<Option<i32>, _>(idx)?
            .map(|v| SqlValue::Int(v.into())),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::Int),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(|v| SqlValue::Float(v.into())),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Float),
        "NUMERIC" => row
            .try_get::<Option<Decimal>, _>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(SqlValue::Date),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(SqlValue::DateTime),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|v| SqlValue::DateTime(v.naive_utc())),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        "UUID" => row.try_get::<Option<Uuid>, _>(idx)?.map(SqlValue::Uuid),
        "JSON" | "JSONB" => row
            .try_get::<Option<serde_json::Value>, _>(idx)?
            .map(SqlValue::Json),
        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(idx)?
            .map(|v| SqlValue::Text(String::from_utf8_lossy(&v).into_owned())),
        // Text-compatible columns; others need a `::text` cast in the field expression
        _ => row.try_get::<Option<String>, _>(idx)?.map(SqlValue::Text),
    };
    Ok(value.unwrap_or(SqlValue::Null))
}
