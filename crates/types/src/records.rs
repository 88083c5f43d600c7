//! Records read from and written to the workflow backend.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::task::Task;

/// One row of `GET /api/workflows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    pub workflow_id: i64,
    pub name: String,
    pub status: String,
}

/// One row of `GET /api/performance`: a single task's measured execution.
///
/// `circuit_depth` and `shots` are `None` when they do not apply to the task
/// (classical steps), never a placeholder number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub workflow_id: i64,
    pub task_id: i64,
    /// Seconds.
    pub runtime: f64,
    #[serde(default)]
    pub circuit_depth: Option<u64>,
    #[serde(default)]
    pub shots: Option<u64>,
    pub timestamp: String,
}

impl PerformanceRecord {
    /// Parse `timestamp` as RFC 3339, falling back to a naive ISO-8601 value read as UTC.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Body of `POST /api/workflows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWorkflowRequest {
    pub name: String,
    pub tasks: Vec<Task>,
}

/// Successful response of `POST /api/workflows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWorkflowResponse {
    pub workflow_id: i64,
}

/// Structured error body some backend failures carry.
///
/// `detail` is usually a string; validation failures may send a list of objects instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ApiErrorBody {
    /// The detail rendered as display text, if the body carried one.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}
