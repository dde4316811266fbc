// src/routes/dashboard.rs

use axum::{extract::State, Json};
use serde::Serialize;
use sqlx::query_as;
use crate::models::{EmployeeProjectCount, EmployeeScore, Project};
use crate::AppState;
use super::internal_error;

#[derive(Serialize)]
pub struct DashboardStats {
    pub total_employees: i64,
    pub total_departments: i64,
    pub active_projects: i64,
    // Null until any review exists.
    pub average_performance: Option<f64>,
}

#[derive(Serialize)]
pub struct DashboardInsights {
    pub top_performers: Vec<EmployeeScore>,
    pub most_projects: Vec<EmployeeProjectCount>,
    pub high_success_projects: Vec<Project>,
}

// Four independent statements; the numbers are not snapshot-consistent with
// one another.
pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, (axum::http::StatusCode, String)> {
    let (total_employees,) = query_as::<_, (i64,)>(
        r#"SELECT COUNT(*) FROM public.employee"#)
        .fetch_one(&state.pool).await.map_err(internal_error)?;

    let (total_departments,) = query_as::<_, (i64,)>(
        r#"SELECT COUNT(DISTINCT dept_id) FROM public.employee"#)
        .fetch_one(&state.pool).await.map_err(internal_error)?;

    let (active_projects,) = query_as::<_, (i64,)>(
        r#"SELECT COUNT(*) FROM public.project WHERE success_indicator = 'In Progress'"#)
        .fetch_one(&state.pool).await.map_err(internal_error)?;

    let (average_performance,) = query_as::<_, (Option<f64>,)>(
        r#"
        SELECT ROUND(AVG((accuracy_score + efficiency_score + quality_score + timeline_score) / 4)::numeric, 2)::float8
        FROM public.performance
        "#
    )
    .fetch_one(&state.pool).await.map_err(internal_error)?;

    Ok(Json(DashboardStats {
        total_employees,
        total_departments,
        active_projects,
        average_performance,
    }))
}

pub async fn insights(
    State(state): State<AppState>,
) -> Result<Json<DashboardInsights>, (axum::http::StatusCode, String)> {
    let top_performers = query_as::<_, EmployeeScore>(
        r#"
        SELECT e.emp_id, e.name,
               ROUND(AVG((p.accuracy_score + p.efficiency_score + p.quality_score + p.timeline_score) / 4)::numeric, 2)::float8 AS avg_score
        FROM public.performance p
        JOIN public.employee e ON p.emp_id = e.emp_id
        GROUP BY e.emp_id, e.name
        ORDER BY avg_score DESC
        LIMIT 5
        "#
    )
    .fetch_all(&state.pool).await.map_err(internal_error)?;

    let most_projects = query_as::<_, EmployeeProjectCount>(
        r#"
        SELECT e.emp_id, e.name, COUNT(pr.project_id) AS total_projects
        FROM public.project pr
        JOIN public.employee e ON pr.employee_id = e.emp_id
        GROUP BY e.emp_id, e.name
        ORDER BY total_projects DESC
        LIMIT 5
        "#
    )
    .fetch_all(&state.pool).await.map_err(internal_error)?;

    let high_success_projects = query_as::<_, Project>(
        r#"
        SELECT project_id, employee_id, project_info, success_indicator
        FROM public.project
        WHERE success_indicator = 'Completed on time'
        ORDER BY project_id ASC
        LIMIT 5
        "#
    )
    .fetch_all(&state.pool).await.map_err(internal_error)?;

    Ok(Json(DashboardInsights {
        top_performers,
        most_projects,
        high_success_projects,
    }))
}
