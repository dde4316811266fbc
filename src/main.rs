// src/main.rs

use std::env;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

mod db;
mod ingest;
mod models;
mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize DB pool and apply migrations
    let pool = db::connect().await?;
    db::migrate(&pool).await?;
    let state = AppState { pool };

    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Root API router
    let api = Router::new()
        // health
        .route("/health", get(routes::health::health))
        // dashboard
        .route("/api/v1/dashboard/stats", get(routes::dashboard::stats))
        .route("/api/v1/dashboard/insights", get(routes::dashboard::insights))
        // employees
        .route(
            "/api/v1/employees",
            put(routes::employees::upsert_employee).get(routes::employees::list_employees),
        )
        .route("/api/v1/employees/ids", get(routes::employees::list_employee_ids))
        .route(
            "/api/v1/employees/:id",
            get(routes::employees::get_employee).delete(routes::employees::delete_employee),
        )
        // departments
        .route(
            "/api/v1/departments",
            put(routes::departments::upsert_department).get(routes::departments::list_departments),
        )
        .route("/api/v1/departments/names", get(routes::departments::list_department_names))
        .route(
            "/api/v1/departments/employee-counts",
            get(routes::departments::employee_counts),
        )
        .route(
            "/api/v1/departments/budget-distribution",
            get(routes::departments::budget_distribution),
        )
        .route("/api/v1/departments/:id", delete(routes::departments::delete_department))
        // projects
        .route(
            "/api/v1/projects",
            put(routes::projects::upsert_project).get(routes::projects::list_projects),
        )
        .route("/api/v1/projects/performance", get(routes::projects::score_breakdown))
        .route("/api/v1/projects/top", get(routes::projects::top_projects))
        .route(
            "/api/v1/projects/underperforming",
            get(routes::projects::underperforming_projects),
        )
        .route("/api/v1/projects/:id", delete(routes::projects::delete_project))
        // performance reviews & reports
        .route(
            "/api/v1/performance",
            put(routes::performance::upsert_review).get(routes::performance::list_reviews),
        )
        .route("/api/v1/performance/averages", get(routes::performance::sub_score_averages))
        .route("/api/v1/performance/top", get(routes::performance::top_performers))
        .route(
            "/api/v1/performance/underperformers",
            get(routes::performance::underperformers),
        )
        .route("/api/v1/performance/analytics", get(routes::performance::analytics))
        .route("/api/v1/performance/filter", get(routes::performance::filter_reviews))
        .route("/api/v1/performance/bulk", post(routes::performance::bulk_upsert_reviews))
        .route("/api/v1/performance/csv", post(routes::performance::upload_reviews_csv))
        // generic record access
        .route(
            "/api/v1/records/:table",
            get(routes::records::scan_table)
                .put(routes::records::upsert_record)
                .delete(routes::records::delete_records),
        )
        .route("/api/v1/records/:table/columns", get(routes::records::table_columns))
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("API listening on http://127.0.0.1:{port}");
    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
