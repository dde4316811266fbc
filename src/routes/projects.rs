// src/routes/projects.rs

use axum::{extract::{Path, Query, State}, Json};
use serde::Deserialize;
use sqlx::{query, query_as};
use crate::{AppState, models::{Deleted, Project, ProjectScore, ProjectScoreBreakdown}};
use super::internal_error;

#[derive(Deserialize)]
pub struct UpsertProjectBody {
    pub project_id: i64,
    pub employee_id: Option<i64>,
    pub project_info: Option<String>,
    pub success_indicator: Option<String>,
}

#[derive(Deserialize)]
pub struct ThresholdQ { pub threshold: Option<f64> }

pub async fn upsert_project(
    State(state): State<AppState>,
    Json(b): Json<UpsertProjectBody>,
) -> Result<Json<Project>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Project>(
        r#"
        INSERT INTO public.project (project_id, employee_id, project_info, success_indicator)
        VALUES ($1,$2,$3,$4)
        ON CONFLICT (project_id) DO UPDATE SET
            employee_id       = EXCLUDED.employee_id,
            project_info      = EXCLUDED.project_info,
            success_indicator = EXCLUDED.success_indicator
        RETURNING project_id, employee_id, project_info, success_indicator
        "#
    )
    .bind(b.project_id).bind(b.employee_id).bind(b.project_info).bind(b.success_indicator)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Project>(
        r#"SELECT * FROM public.project ORDER BY project_id"#)
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

// Mean of each sub-score per project, for the per-project comparison chart.
pub async fn score_breakdown(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectScoreBreakdown>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, ProjectScoreBreakdown>(
        r#"
        SELECT p.project_id, pr.project_info,
               ROUND(AVG(p.efficiency_score)::numeric, 2)::float8 AS avg_efficiency,
               ROUND(AVG(p.timeline_score)::numeric, 2)::float8   AS avg_timeline,
               ROUND(AVG(p.quality_score)::numeric, 2)::float8    AS avg_quality,
               ROUND(AVG(p.accuracy_score)::numeric, 2)::float8   AS avg_accuracy
        FROM public.performance p
        JOIN public.project pr ON p.project_id = pr.project_id
        GROUP BY p.project_id, pr.project_info
        ORDER BY p.project_id
        "#
    )
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

// Projects whose overall average is at or above the threshold (default 8.5).
pub async fn top_projects(
    State(state): State<AppState>,
    Query(q): Query<ThresholdQ>,
) -> Result<Json<Vec<ProjectScore>>, (axum::http::StatusCode, String)> {
    let threshold = q.threshold.unwrap_or(8.5);
    let rows = query_as::<_, ProjectScore>(
        r#"
        SELECT pr.project_id, pr.project_info,
               ROUND(AVG((p.efficiency_score + p.timeline_score + p.quality_score + p.accuracy_score) / 4)::numeric, 2)::float8 AS avg_score
        FROM public.performance p
        JOIN public.project pr ON p.project_id = pr.project_id
        GROUP BY pr.project_id, pr.project_info
        HAVING ROUND(AVG((p.efficiency_score + p.timeline_score + p.quality_score + p.accuracy_score) / 4)::numeric, 2)::float8 >= $1
        ORDER BY avg_score DESC
        "#
    )
    .bind(threshold)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

// Strictly below the threshold (default 7), worst first.
pub async fn underperforming_projects(
    State(state): State<AppState>,
    Query(q): Query<ThresholdQ>,
) -> Result<Json<Vec<ProjectScore>>, (axum::http::StatusCode, String)> {
    let threshold = q.threshold.unwrap_or(7.0);
    let rows = query_as::<_, ProjectScore>(
        r#"
        SELECT pr.project_id, pr.project_info,
               ROUND(AVG((p.efficiency_score + p.timeline_score + p.quality_score + p.accuracy_score) / 4)::numeric, 2)::float8 AS avg_score
        FROM public.performance p
        JOIN public.project pr ON p.project_id = pr.project_id
        GROUP BY pr.project_id, pr.project_info
        HAVING ROUND(AVG((p.efficiency_score + p.timeline_score + p.quality_score + p.accuracy_score) / 4)::numeric, 2)::float8 < $1
        ORDER BY avg_score ASC
        "#
    )
    .bind(threshold)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.project WHERE project_id = $1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(Deleted { deleted: res.rows_affected() > 0 }))
}
