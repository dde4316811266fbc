use axum::http::StatusCode;

pub mod health;
pub mod dashboard;
pub mod employees;
pub mod departments;
pub mod projects;
pub mod performance;
pub mod records;

// Common error mappers
pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

pub fn not_found<E: std::fmt::Display>(what: E) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

pub fn bad_request<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}
