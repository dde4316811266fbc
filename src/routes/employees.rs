// src/routes/employees.rs

use axum::{extract::{Path, State}, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{query, query_as};
use crate::{AppState, models::{Deleted, Employee}};
use super::{internal_error, not_found};

#[derive(Deserialize)]
pub struct UpsertEmployeeBody {
    pub emp_id: i64,
    pub name: String,
    pub dept_id: Option<i64>,
    pub attendance_id: Option<i64>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub work_exp_years: Option<i32>,
    pub salary: Option<f64>,
}

pub async fn upsert_employee(
    State(state): State<AppState>,
    Json(b): Json<UpsertEmployeeBody>,
) -> Result<Json<Employee>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Employee>(
        r#"
        INSERT INTO public.employee
            (emp_id, name, dept_id, attendance_id, email, date_of_birth, address, work_exp_years, salary)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        ON CONFLICT (emp_id) DO UPDATE SET
            name           = EXCLUDED.name,
            dept_id        = EXCLUDED.dept_id,
            attendance_id  = EXCLUDED.attendance_id,
            email          = EXCLUDED.email,
            date_of_birth  = EXCLUDED.date_of_birth,
            address        = EXCLUDED.address,
            work_exp_years = EXCLUDED.work_exp_years,
            salary         = EXCLUDED.salary
        RETURNING emp_id, name, dept_id, attendance_id, email, date_of_birth, address, work_exp_years, salary
        "#
    )
    .bind(b.emp_id).bind(b.name).bind(b.dept_id).bind(b.attendance_id).bind(b.email)
    .bind(b.date_of_birth).bind(b.address).bind(b.work_exp_years).bind(b.salary)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Employee>(
        r#"SELECT * FROM public.employee ORDER BY emp_id"#)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Employee>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Employee>(
        r#"SELECT * FROM public.employee WHERE emp_id = $1"#)
        .bind(id)
        .fetch_optional(&state.pool).await.map_err(internal_error)?;
    row.map(Json).ok_or_else(|| not_found(format!("employee {id}")))
}

// Id list for selection dropdowns in the dashboard forms.
pub async fn list_employee_ids(
    State(state): State<AppState>,
) -> Result<Json<Vec<i64>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, (i64,)>(
        r#"SELECT emp_id FROM public.employee ORDER BY emp_id"#)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows.into_iter().map(|(id,)| id).collect()))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.employee WHERE emp_id = $1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(Deleted { deleted: res.rows_affected() > 0 }))
}
