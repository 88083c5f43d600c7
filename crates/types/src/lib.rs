//! Shared data model for qflow.
//!
//! Everything here mirrors the shapes exchanged with the workflow backend:
//! task drafts (with their closed per-kind configuration), workflow status
//! rows, per-task performance records and the create-workflow request and
//! response bodies. The types carry no behavior beyond field access and
//! serde; composition logic lives in `qflow-engine`.

pub mod records;
pub mod task;

pub use records::{ApiErrorBody, CreateWorkflowRequest, CreateWorkflowResponse, PerformanceRecord, WorkflowStatus};
pub use task::{
    ClassicalConfig, ConfigField, QuantumBackend, QuantumConfig, Task, TaskConfig, TaskConfigError, TaskId, TaskKind,
};
