// src/models/mod.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ───────────────────────────────────────
// Core entities
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Employee {
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

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub dept_id: i64,
    pub name: String,
    pub budget: Option<f64>,
    pub head: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub project_id: i64,
    pub employee_id: Option<i64>,
    pub project_info: Option<String>,
    // Open-ended label: "In Progress", "Completed on time", ...
    pub success_indicator: Option<String>,
}

/// One review per (employee, project) pairing; sub-scores on a 0-10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PerformanceReview {
    pub emp_id: i64,
    pub project_id: i64,
    pub accuracy_score: f64,
    pub efficiency_score: f64,
    pub quality_score: f64,
    pub timeline_score: f64,
}

// ───────────────────────────────────────
// Report rows (aggregate query results)
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct EmployeeScore {
    pub emp_id: i64,
    pub name: String,
    pub avg_score: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct EmployeeProjectCount {
    pub emp_id: i64,
    pub name: String,
    pub total_projects: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ProjectScore {
    pub project_id: i64,
    pub project_info: Option<String>,
    pub avg_score: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ProjectScoreBreakdown {
    pub project_id: i64,
    pub project_info: Option<String>,
    pub avg_efficiency: f64,
    pub avg_timeline: f64,
    pub avg_quality: f64,
    pub avg_accuracy: f64,
}

/// Join row: one review with the employee's name attached.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ReviewWithEmployee {
    pub emp_id: i64,
    pub name: String,
    pub project_id: i64,
    pub efficiency_score: f64,
    pub timeline_score: f64,
    pub quality_score: f64,
    pub accuracy_score: f64,
}

/// Per-row (ungrouped) average, optionally filtered by department/project.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct FilteredScore {
    pub emp_id: i64,
    pub name: String,
    pub dept_id: Option<i64>,
    pub project_id: i64,
    pub avg_score: f64,
}

/// Table-wide mean of each sub-score; null until any review exists.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct SubScoreAverages {
    pub efficiency: Option<f64>,
    pub timeline: Option<f64>,
    pub quality: Option<f64>,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DepartmentHeadCount {
    pub name: String,
    pub employee_count: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DepartmentBudget {
    pub name: String,
    pub budget: Option<f64>,
}

// ───────────────────────────────────────
// DTOs helpful for endpoints
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertCount { pub upserted: usize }

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted { pub deleted: bool }
