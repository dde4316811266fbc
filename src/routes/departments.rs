// src/routes/departments.rs

use axum::{extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::{query, query_as};
use crate::{AppState, models::{Deleted, Department, DepartmentBudget, DepartmentHeadCount}};
use super::internal_error;

#[derive(Deserialize)]
pub struct UpsertDepartmentBody {
    pub dept_id: i64,
    pub name: String,
    pub budget: Option<f64>,
    pub head: Option<String>,
}

pub async fn upsert_department(
    State(state): State<AppState>,
    Json(b): Json<UpsertDepartmentBody>,
) -> Result<Json<Department>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Department>(
        r#"
        INSERT INTO public.department (dept_id, name, budget, head)
        VALUES ($1,$2,$3,$4)
        ON CONFLICT (dept_id) DO UPDATE SET
            name   = EXCLUDED.name,
            budget = EXCLUDED.budget,
            head   = EXCLUDED.head
        RETURNING dept_id, name, budget, head
        "#
    )
    .bind(b.dept_id).bind(b.name).bind(b.budget).bind(b.head)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Department>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Department>(
        r#"SELECT * FROM public.department ORDER BY dept_id"#)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn list_department_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, (String,)>(
        r#"SELECT DISTINCT name FROM public.department ORDER BY name"#)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows.into_iter().map(|(n,)| n).collect()))
}

// Departments with no employees still show up with a count of 0.
pub async fn employee_counts(
    State(state): State<AppState>,
) -> Result<Json<Vec<DepartmentHeadCount>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, DepartmentHeadCount>(
        r#"
        SELECT d.name, COUNT(e.emp_id) AS employee_count
        FROM public.department d
        LEFT JOIN public.employee e ON d.dept_id = e.dept_id
        GROUP BY d.name
        ORDER BY d.name
        "#
    )
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

// Salary totals per department, for the budget-distribution chart.
pub async fn budget_distribution(
    State(state): State<AppState>,
) -> Result<Json<Vec<DepartmentBudget>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, DepartmentBudget>(
        r#"
        SELECT d.name, SUM(e.salary) AS budget
        FROM public.department d
        JOIN public.employee e ON d.dept_id = e.dept_id
        GROUP BY d.name
        ORDER BY d.name
        "#
    )
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.department WHERE dept_id = $1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(Deleted { deleted: res.rows_affected() > 0 }))
}
