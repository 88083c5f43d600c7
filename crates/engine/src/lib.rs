//! # qflow Engine
//!
//! The qflow engine holds the pure state of a hybrid quantum/classical workflow
//! session and the two flows that talk to the backend.
//!
//! ## Key Features
//!
//! - **Draft editing**: an immutable [`WorkflowDraft`] updated through named
//!   transitions (add, reorder, update config), each returning a new value
//! - **Submission**: [`WorkflowSubmissionController`] validates locally, guards
//!   against duplicate in-flight submits and maps the backend answer to a message
//! - **Monitoring**: [`DashboardState`] commits the workflow list and the
//!   performance metrics independently as each read resolves
//! - **Cost estimation**: per-backend pricing of a draft's quantum tasks
//!
//! ## Usage
//!
//! ```rust
//! use qflow_engine::WorkflowDraft;
//! use qflow_types::TaskKind;
//!
//! let draft = WorkflowDraft::initial()
//!     .with_name("Bell pipeline")
//!     .add_task(TaskKind::Quantum)
//!     .reorder(2, Some(0));
//! assert_eq!(draft.to_request().tasks.len(), 3);
//! ```
//!
//! ## Architecture
//!
//! - **`collection`** / **`draft`**: the editable task list and the named draft
//! - **`submission`**: create-workflow state machine
//! - **`metrics`** / **`status`**: display models for the dashboard
//! - **`monitor`**: dashboard state and the concurrent refresh
//! - **`cost`**: cost estimate for quantum tasks
//! - **`taskfile`**: JSON/YAML task list loading

pub mod collection;
pub mod cost;
pub mod draft;
pub mod metrics;
pub mod monitor;
pub mod status;
pub mod submission;
pub mod taskfile;

#[cfg(test)]
pub(crate) mod testing;

pub use collection::{DuplicateTaskId, TaskCollection};
pub use cost::{BackendTier, CostEstimate, DEFAULT_DEPTH, TaskCost, estimate_draft_cost};
pub use draft::WorkflowDraft;
pub use metrics::{ChartSeries, MetricsView, RecordSummary, SummaryLine, aggregate};
pub use monitor::{DashboardState, FetchSlice, NO_METRICS, NO_WORKFLOWS, refresh};
pub use status::{StatusAccent, StatusCard, status_cards};
pub use submission::{SubmissionError, SubmissionOutcome, SubmissionState, Submitted, WorkflowSubmissionController};
pub use taskfile::{TaskFileError, parse_task_file};
