// src/routes/performance.rs

use axum::{extract::{Query, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, Pool, Postgres};
use crate::ingest;
use crate::models::{
    EmployeeScore, FilteredScore, PerformanceReview, ReviewWithEmployee, SubScoreAverages,
    UpsertCount,
};
use crate::AppState;
use super::{bad_request, internal_error};

#[derive(Deserialize)]
pub struct TopQ { pub limit: Option<i64> }

#[derive(Deserialize)]
pub struct ThresholdQ { pub threshold: Option<f64> }

#[derive(Deserialize)]
pub struct FilterQ {
    pub dept_id: Option<i64>,
    pub project_id: Option<i64>,
}

#[derive(Serialize)]
pub struct Analytics {
    pub best: Vec<EmployeeScore>,
    pub worst: Vec<EmployeeScore>,
}

const UPSERT_REVIEW: &str = r#"
    INSERT INTO public.performance
        (emp_id, project_id, accuracy_score, efficiency_score, quality_score, timeline_score)
    VALUES ($1,$2,$3,$4,$5,$6)
    ON CONFLICT (emp_id, project_id) DO UPDATE SET
        accuracy_score   = EXCLUDED.accuracy_score,
        efficiency_score = EXCLUDED.efficiency_score,
        quality_score    = EXCLUDED.quality_score,
        timeline_score   = EXCLUDED.timeline_score
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

fn valid_score(v: f64) -> bool {
    v.is_finite() && (0.0..=10.0).contains(&v)
}

fn check_scores(r: &PerformanceReview) -> Result<(), String> {
    for (name, value) in [
        ("accuracy_score", r.accuracy_score),
        ("efficiency_score", r.efficiency_score),
        ("quality_score", r.quality_score),
        ("timeline_score", r.timeline_score),
    ] {
        if !valid_score(value) {
            return Err(format!("{name} {value} is outside the 0-10 scale"));
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Read-only reports
// ─────────────────────────────────────────────────────────────────────────────

pub async fn list_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewWithEmployee>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, ReviewWithEmployee>(
        r#"
        SELECT e.emp_id, e.name, p.project_id,
               p.efficiency_score, p.timeline_score, p.quality_score, p.accuracy_score
        FROM public.performance p
        JOIN public.employee e ON p.emp_id = e.emp_id
        ORDER BY e.emp_id, p.project_id
        "#
    )
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn sub_score_averages(
    State(state): State<AppState>,
) -> Result<Json<SubScoreAverages>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, SubScoreAverages>(
        r#"
        SELECT ROUND(AVG(efficiency_score)::numeric, 2)::float8 AS efficiency,
               ROUND(AVG(timeline_score)::numeric, 2)::float8   AS timeline,
               ROUND(AVG(quality_score)::numeric, 2)::float8    AS quality,
               ROUND(AVG(accuracy_score)::numeric, 2)::float8   AS accuracy
        FROM public.performance
        "#
    )
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

// Top-N employees by overall average (default 5). Ties fall to store row
// order, which is not deterministic.
pub async fn top_performers(
    State(state): State<AppState>,
    Query(q): Query<TopQ>,
) -> Result<Json<Vec<EmployeeScore>>, (axum::http::StatusCode, String)> {
    let limit = q.limit.unwrap_or(5).clamp(1, 100);
    let rows = query_as::<_, EmployeeScore>(
        r#"
        SELECT e.emp_id, e.name,
               ROUND(AVG((p.efficiency_score + p.timeline_score + p.quality_score + p.accuracy_score) / 4)::numeric, 2)::float8 AS avg_score
        FROM public.performance p
        JOIN public.employee e ON p.emp_id = e.emp_id
        GROUP BY e.emp_id, e.name
        ORDER BY avg_score DESC
        LIMIT $1
        "#
    )
    .bind(limit)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

// Overall average strictly below the threshold (default 6), worst first.
pub async fn underperformers(
    State(state): State<AppState>,
    Query(q): Query<ThresholdQ>,
) -> Result<Json<Vec<EmployeeScore>>, (axum::http::StatusCode, String)> {
    let threshold = q.threshold.unwrap_or(6.0);
    let rows = query_as::<_, EmployeeScore>(
        r#"
        SELECT e.emp_id, e.name,
               ROUND(AVG((p.efficiency_score + p.timeline_score + p.quality_score + p.accuracy_score) / 4)::numeric, 2)::float8 AS avg_score
        FROM public.performance p
        JOIN public.employee e ON p.emp_id = e.emp_id
        GROUP BY e.emp_id, e.name
        HAVING ROUND(AVG((p.efficiency_score + p.timeline_score + p.quality_score + p.accuracy_score) / 4)::numeric, 2)::float8 < $1
        ORDER BY avg_score ASC
        "#
    )
    .bind(threshold)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

// Best three and worst three, for the analytics page cards.
pub async fn analytics(
    State(state): State<AppState>,
) -> Result<Json<Analytics>, (axum::http::StatusCode, String)> {
    const RANKED: &str = r#"
        SELECT e.emp_id, e.name,
               ROUND(AVG((p.accuracy_score + p.efficiency_score + p.quality_score + p.timeline_score) / 4)::numeric, 2)::float8 AS avg_score
        FROM public.performance p
        JOIN public.employee e ON p.emp_id = e.emp_id
        GROUP BY e.emp_id, e.name
    "#;

    let best = query_as::<_, EmployeeScore>(
        &format!("{RANKED} ORDER BY avg_score DESC LIMIT 3"))
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    let worst = query_as::<_, EmployeeScore>(
        &format!("{RANKED} ORDER BY avg_score ASC LIMIT 3"))
        .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(Analytics { best, worst }))
}

fn filter_sql(by_dept: bool, by_project: bool) -> String {
    let mut sql = String::from(
        "SELECT e.emp_id, e.name, e.dept_id, p.project_id, \
         ROUND(((p.accuracy_score + p.efficiency_score + p.quality_score + p.timeline_score) / 4)::numeric, 2)::float8 AS avg_score \
         FROM public.performance p \
         JOIN public.employee e ON p.emp_id = e.emp_id",
    );
    let mut conds: Vec<String> = Vec::new();
    if by_dept {
        conds.push(format!("e.dept_id = ${}", conds.len() + 1));
    }
    if by_project {
        conds.push(format!("p.project_id = ${}", conds.len() + 1));
    }
    if !conds.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conds.join(" AND "));
    }
    sql.push_str(" ORDER BY e.emp_id, p.project_id");
    sql
}

// Per-row averages; each filter applies only when supplied.
pub async fn filter_reviews(
    State(state): State<AppState>,
    Query(q): Query<FilterQ>,
) -> Result<Json<Vec<FilteredScore>>, (axum::http::StatusCode, String)> {
    let sql = filter_sql(q.dept_id.is_some(), q.project_id.is_some());
    let mut qy = query_as::<_, FilteredScore>(&sql);
    if let Some(dept_id) = q.dept_id {
        qy = qy.bind(dept_id);
    }
    if let Some(project_id) = q.project_id {
        qy = qy.bind(project_id);
    }
    let rows = qy.fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

// ─────────────────────────────────────────────────────────────────────────────
// Writes
// ─────────────────────────────────────────────────────────────────────────────

pub async fn upsert_review(
    State(state): State<AppState>,
    Json(b): Json<PerformanceReview>,
) -> Result<Json<PerformanceReview>, (axum::http::StatusCode, String)> {
    check_scores(&b).map_err(bad_request)?;
    let row = query_as::<_, PerformanceReview>(&format!(
        "{UPSERT_REVIEW} RETURNING emp_id, project_id, accuracy_score, efficiency_score, quality_score, timeline_score"
    ))
    .bind(b.emp_id).bind(b.project_id)
    .bind(b.accuracy_score).bind(b.efficiency_score).bind(b.quality_score).bind(b.timeline_score)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

async fn upsert_all(pool: &Pool<Postgres>, rows: &[PerformanceReview]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for r in rows {
        query(UPSERT_REVIEW)
            .bind(r.emp_id).bind(r.project_id)
            .bind(r.accuracy_score).bind(r.efficiency_score).bind(r.quality_score).bind(r.timeline_score)
            .execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

fn check_batch(rows: &[PerformanceReview]) -> Result<(), (axum::http::StatusCode, String)> {
    for (i, r) in rows.iter().enumerate() {
        check_scores(r).map_err(|e| bad_request(format!("row {}: {e}", i + 1)))?;
    }
    Ok(())
}

pub async fn bulk_upsert_reviews(
    State(state): State<AppState>,
    Json(items): Json<Vec<PerformanceReview>>,
) -> Result<Json<UpsertCount>, (axum::http::StatusCode, String)> {
    check_batch(&items)?;
    upsert_all(&state.pool, &items).await.map_err(internal_error)?;
    Ok(Json(UpsertCount { upserted: items.len() }))
}

// Raw CSV body from the file-upload widget. A header-only file is a no-op.
pub async fn upload_reviews_csv(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<UpsertCount>, (axum::http::StatusCode, String)> {
    let rows = ingest::parse_performance_csv(&body).map_err(bad_request)?;
    check_batch(&rows)?;
    upsert_all(&state.pool, &rows).await.map_err(internal_error)?;
    Ok(Json(UpsertCount { upserted: rows.len() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(scores: [f64; 4]) -> PerformanceReview {
        PerformanceReview {
            emp_id: 1,
            project_id: 1,
            accuracy_score: scores[0],
            efficiency_score: scores[1],
            quality_score: scores[2],
            timeline_score: scores[3],
        }
    }

    #[test]
    fn scores_accept_both_bounds() {
        assert!(check_scores(&review([0.0, 10.0, 5.5, 7.25])).is_ok());
    }

    #[test]
    fn scores_reject_out_of_range_and_non_finite() {
        assert!(check_scores(&review([-0.1, 5.0, 5.0, 5.0])).is_err());
        assert!(check_scores(&review([5.0, 10.1, 5.0, 5.0])).is_err());
        assert!(check_scores(&review([5.0, 5.0, f64::NAN, 5.0])).is_err());
        assert!(check_scores(&review([5.0, 5.0, 5.0, f64::INFINITY])).is_err());
    }

    #[test]
    fn score_error_names_the_field() {
        let err = check_scores(&review([5.0, 11.0, 5.0, 5.0])).unwrap_err();
        assert!(err.contains("efficiency_score"), "{err}");
    }

    #[test]
    fn filter_sql_is_tri_state() {
        assert!(!filter_sql(false, false).contains("WHERE"));

        let dept_only = filter_sql(true, false);
        assert!(dept_only.contains("WHERE e.dept_id = $1"));
        assert!(!dept_only.contains("project_id = $"));

        let project_only = filter_sql(false, true);
        assert!(project_only.contains("WHERE p.project_id = $1"));

        let both = filter_sql(true, true);
        assert!(both.contains("e.dept_id = $1 AND p.project_id = $2"));
    }
}
