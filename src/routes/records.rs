// src/routes/records.rs
//
// Generic table access: column introspection, upsert, keyed delete and full
// scan for any table in the public schema. Table and column names are the
// only unbound SQL fragments, so they are validated as bare identifiers
// before being spliced in; every value travels as a bind parameter.

use axum::{extract::{Path, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, Pool, Postgres};
use crate::AppState;
use super::{bad_request, internal_error, not_found};

#[derive(Deserialize)]
pub struct DeleteRecordsBody {
    pub column: String,
    pub value: serde_json::Value,
}

#[derive(Serialize)]
pub struct TableScan {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Value>,
}

fn valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    s.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_ident(s: &str) -> Result<(), (axum::http::StatusCode, String)> {
    if valid_ident(s) {
        Ok(())
    } else {
        Err(bad_request(format!("invalid identifier '{s}'")))
    }
}

async fn table_exists(pool: &Pool<Postgres>, table: &str) -> Result<bool, sqlx::Error> {
    let (exists,) = query_as::<_, (bool,)>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = $1
        )
        "#
    )
    .bind(table)
    .fetch_one(pool).await?;
    Ok(exists)
}

async fn column_names(pool: &Pool<Postgres>, table: &str) -> Result<Vec<String>, sqlx::Error> {
    let rows = query_as::<_, (String,)>(
        r#"
        SELECT column_name FROM information_schema.columns
        WHERE table_schema = 'public' AND table_name = $1
        ORDER BY ordinal_position
        "#
    )
    .bind(table)
    .fetch_all(pool).await?;
    Ok(rows.into_iter().map(|(c,)| c).collect())
}

async fn primary_key_columns(pool: &Pool<Postgres>, table: &str) -> Result<Vec<String>, sqlx::Error> {
    let rows = query_as::<_, (String,)>(
        r#"
        SELECT a.attname
        FROM pg_index i
        JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
        WHERE i.indrelid = ('public.' || $1)::regclass AND i.indisprimary
        ORDER BY a.attnum
        "#
    )
    .bind(table)
    .fetch_all(pool).await?;
    Ok(rows.into_iter().map(|(c,)| c).collect())
}

fn build_upsert_sql(table: &str, columns: &[String], key: &[String]) -> String {
    let conflict = key.iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = columns.iter()
        .filter(|c| !key.contains(c))
        .map(|c| format!("\"{c}\" = EXCLUDED.\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    if updates.is_empty() {
        format!(
            r#"INSERT INTO public."{table}" SELECT * FROM jsonb_populate_record(NULL::public."{table}", $1) ON CONFLICT ({conflict}) DO NOTHING"#
        )
    } else {
        format!(
            r#"INSERT INTO public."{table}" SELECT * FROM jsonb_populate_record(NULL::public."{table}", $1) ON CONFLICT ({conflict}) DO UPDATE SET {updates}"#
        )
    }
}

/// Ordered column names. Unknown tables are a 404, so an empty list can only
/// mean a genuinely column-less table.
pub async fn table_columns(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Vec<String>>, (axum::http::StatusCode, String)> {
    check_ident(&table)?;
    if !table_exists(&state.pool, &table).await.map_err(internal_error)? {
        return Err(not_found(format!("table '{table}'")));
    }
    let columns = column_names(&state.pool, &table).await.map_err(internal_error)?;
    Ok(Json(columns))
}

/// Upsert from a JSON object of column -> value. Missing keys become NULL
/// (`jsonb_populate_record` semantics); conflict target is the table's
/// primary key.
pub async fn upsert_record(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    check_ident(&table)?;
    if !body.is_object() {
        return Err(bad_request("body must be a JSON object of column -> value"));
    }
    if !table_exists(&state.pool, &table).await.map_err(internal_error)? {
        return Err(not_found(format!("table '{table}'")));
    }
    let key = primary_key_columns(&state.pool, &table).await.map_err(internal_error)?;
    if key.is_empty() {
        return Err(bad_request(format!("table '{table}' has no primary key to upsert on")));
    }
    let columns = column_names(&state.pool, &table).await.map_err(internal_error)?;

    let sql = build_upsert_sql(&table, &columns, &key);
    let res = query(&sql)
        .bind(body)
        .execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "upserted": res.rows_affected() })))
}

/// Deletes every row whose column matches the value (compared as text, so the
/// caller does not need to know the column's type). Reports the affected-row
/// count so "deleted" and "nothing matched" stay distinguishable.
pub async fn delete_records(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(b): Json<DeleteRecordsBody>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    check_ident(&table)?;
    check_ident(&b.column)?;
    if !table_exists(&state.pool, &table).await.map_err(internal_error)? {
        return Err(not_found(format!("table '{table}'")));
    }
    let needle = match &b.value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let sql = format!(
        r#"DELETE FROM public."{table}" WHERE "{column}"::text = $1"#,
        column = b.column,
    );
    let res = query(&sql)
        .bind(needle)
        .execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "deleted": res.rows_affected() })))
}

/// Full scan with column headers. An empty table is a 200 with no rows, never
/// a sentinel.
pub async fn scan_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<TableScan>, (axum::http::StatusCode, String)> {
    check_ident(&table)?;
    if !table_exists(&state.pool, &table).await.map_err(internal_error)? {
        return Err(not_found(format!("table '{table}'")));
    }
    let columns = column_names(&state.pool, &table).await.map_err(internal_error)?;
    let sql = format!(r#"SELECT to_jsonb(t) FROM public."{table}" t"#);
    let rows = query_as::<_, (serde_json::Value,)>(&sql)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(TableScan {
        columns,
        rows: rows.into_iter().map(|(r,)| r).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_accepts_plain_names() {
        assert!(valid_ident("employee"));
        assert!(valid_ident("_hidden"));
        assert!(valid_ident("perf_2024"));
    }

    #[test]
    fn ident_rejects_injection_attempts() {
        assert!(!valid_ident(""));
        assert!(!valid_ident("1table"));
        assert!(!valid_ident("emp loyee"));
        assert!(!valid_ident("employee;drop table employee"));
        assert!(!valid_ident("emp\"loyee"));
        assert!(!valid_ident(&"x".repeat(64)));
    }

    #[test]
    fn upsert_sql_updates_every_non_key_column() {
        let columns = ["dept_id", "name", "budget", "head"]
            .map(String::from)
            .to_vec();
        let key = vec!["dept_id".to_string()];
        let sql = build_upsert_sql("department", &columns, &key);
        assert!(sql.contains(r#"INSERT INTO public."department""#));
        assert!(sql.contains(r#"jsonb_populate_record(NULL::public."department", $1)"#));
        assert!(sql.contains(r#"ON CONFLICT ("dept_id") DO UPDATE SET"#));
        assert!(sql.contains(r#""name" = EXCLUDED."name""#));
        assert!(sql.contains(r#""budget" = EXCLUDED."budget""#));
        assert!(sql.contains(r#""head" = EXCLUDED."head""#));
        assert!(!sql.contains(r#""dept_id" = EXCLUDED"#));
    }

    #[test]
    fn upsert_sql_handles_composite_keys() {
        let columns = ["emp_id", "project_id", "accuracy_score"]
            .map(String::from)
            .to_vec();
        let key = vec!["emp_id".to_string(), "project_id".to_string()];
        let sql = build_upsert_sql("performance", &columns, &key);
        assert!(sql.contains(r#"ON CONFLICT ("emp_id", "project_id")"#));
        assert!(sql.contains(r#""accuracy_score" = EXCLUDED."accuracy_score""#));
    }

    #[test]
    fn upsert_sql_key_only_table_does_nothing_on_conflict() {
        let columns = vec!["id".to_string()];
        let key = vec!["id".to_string()];
        let sql = build_upsert_sql("lookup", &columns, &key);
        assert!(sql.ends_with("DO NOTHING"));
    }
}
