//! Integration tests against a live PostgreSQL database
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

use std::sync::Arc;

use chrono::NaiveDate;
use searchhaus::prelude::*;
use sqlx::PgPool;

#[derive(Debug, Deserialize, PartialEq)]
struct Employee {
    name: String,
    active: bool,
    hired: NaiveDate,
    salary: f64,
}

async fn setup_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for integration tests");

    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

async fn seed(pool: &PgPool, table: &str) {
    let _ = sqlx::query(&format!("DROP TABLE IF EXISTS {} CASCADE", table))
        .execute(pool)
        .await;
    sqlx::query(&format!(
        "CREATE TABLE {} (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            dept TEXT NOT NULL,
            active BOOLEAN NOT NULL,
            hired DATE NOT NULL,
            salary NUMERIC(10, 2) NOT NULL
        )",
        table
    ))
    .execute(pool)
    .await
    .expect("Failed to create table");

    let rows = [
        ("Ann", "eng", true, "2020-01-15", "120000.00"),
        ("Bob", "eng", false, "2018-06-01", "95000.50"),
        ("Cid", "ops", true, "2021-03-20", "70000.00"),
        ("Dee", "ops", true, "2019-11-11", "82000.00"),
        ("Eve", "sales", true, "2022-08-30", "60000.00"),
    ];
    for (name, dept, active, hired, salary) in rows {
        sqlx::query(&format!(
            "INSERT INTO {} (name, dept, active, hired, salary) VALUES ($1, $2, $3, $4::date, $5::numeric)",
            table
        ))
        .bind(name)
        .bind(dept)
        .bind(active)
        .bind(hired)
        .bind(salary)
        .execute(pool)
        .await
        .expect("Failed to insert row");
    }
}

fn searcher(pool: PgPool) -> Searcher {
    let mut search = SearchConfig::default();
    search.sql.dialect = "postgresql".to_string();
    build_searcher(&search, Arc::new(PgSqlExecutor::new(pool))).expect("searcher")
}

#[tokio::test]
#[ignore]
async fn test_paged_search_with_count() {
    let pool = setup_pool().await;
    seed(&pool, "search_employees").await;

    let schema = SchemaDescriptor::builder("search_employees")
        .column("name", "name", FieldType::String)
        .column("active", "active", FieldType::Bool)
        .column("hired", "hired", FieldType::Date)
        .column("salary", "salary", FieldType::Float)
        .build()
        .unwrap();

    let params = SearchParams::new()
        .with("active", "true")
        .with("salary_ge", "65000")
        .with("sort", "salary")
        .with("order", "desc")
        .with("page", "2")
        .with("size", "2");

    let result: SearchResult<Employee> = searcher(pool)
        .search(&schema, &params)
        .await
        .expect("search failed");

    assert_eq!(result.total, 3);
    assert_eq!(
        result.data,
        vec![Employee {
            name: "Cid".to_string(),
            active: true,
            hired: NaiveDate::from_ymd_opt(2021, 3, 20).unwrap(),
            salary: 70000.0,
        }]
    );
}

#[tokio::test]
#[ignore]
async fn test_having_filter_on_aggregate() {
    let pool = setup_pool().await;
    seed(&pool, "search_departments").await;

    let schema = SchemaDescriptor::builder("search_departments")
        .column("dept", "dept", FieldType::String)
        .aggregate("headcount", "COUNT(*)", FieldType::Int)
        .aggregate("payroll", "SUM(salary)", FieldType::Float)
        .build()
        .unwrap();

    let params = SearchParams::new()
        .with("headcount_ge", "2")
        .with("dept_ic", "true")
        .with("dept_op", "ne")
        .with("dept", "OPS")
        .with("sort", "dept");

    let maps = searcher(pool)
        .search_all_maps(&schema, &params)
        .await
        .expect("search failed");

    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0]["dept"], serde_json::json!("eng"));
    assert_eq!(maps[0]["headcount"], serde_json::json!(2));
    assert_eq!(maps[0]["payroll"], serde_json::json!(215000.5));
}

#[tokio::test]
#[ignore]
async fn test_search_first_with_between() {
    let pool = setup_pool().await;
    seed(&pool, "search_first_employees").await;

    let schema = SchemaDescriptor::builder("search_first_employees")
        .column("name", "name", FieldType::String)
        .column("hired", "hired", FieldType::Date)
        .build()
        .unwrap();

    let params = SearchParams::new()
        .with("hired_op", "bt")
        .with("hired_0", "2019-01-01")
        .with("hired_1", "2021-12-31")
        .with("sort", "hired");

    #[derive(Debug, Deserialize)]
    struct Hire {
        name: String,
    }

    let first: Option<Hire> = searcher(pool)
        .search_first(&schema, &params)
        .await
        .expect("search failed");
    assert_eq!(first.map(|h| h.name), Some("Dee".to_string()));
}

#[tokio::test]
#[ignore]
async fn test_time_binary_and_cast_columns() {
    let pool = setup_pool().await;
    let _ = sqlx::query("DROP TABLE IF EXISTS search_sessions CASCADE")
        .execute(&pool)
        .await;
    sqlx::query(
        "CREATE TABLE search_sessions (
            id SERIAL PRIMARY KEY,
            opened TIME NOT NULL,
            token BYTEA NOT NULL,
            addr INET NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .expect("Failed to create table");
    sqlx::query(
        "INSERT INTO search_sessions (opened, token, addr)
         VALUES ('08:30:00', 'abc'::bytea, '10.0.0.1')",
    )
    .execute(&pool)
    .await
    .expect("Failed to insert row");

    let schema = SchemaDescriptor::builder("search_sessions")
        .column("opened", "opened", FieldType::String)
        .column("token", "token", FieldType::String)
        .column("addr", "addr::text", FieldType::String)
        .build()
        .unwrap();

    let maps = searcher(pool)
        .search_all_maps(&schema, &SearchParams::new())
        .await
        .expect("search failed");

    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0]["opened"], serde_json::json!("08:30:00"));
    assert_eq!(maps[0]["token"], serde_json::json!("abc"));
    assert_eq!(maps[0]["addr"], serde_json::json!("10.0.0.1/32"));
}
