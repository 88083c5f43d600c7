//! # qflow TUI Library
//!
//! A terminal user interface for composing hybrid quantum/classical workflows
//! and watching their execution, built on Ratatui.
//!
//! ## Key Features
//!
//! - Workflow editor: name the draft, add classical and quantum tasks, edit
//!   their config and move them into order
//! - Submission with inline success and error messages
//! - Dashboard with workflow status cards and per-task runtime/shots charts,
//!   refreshed on entry, on demand and on a poll interval
//!
//! ## Architecture
//!
//! `app` is the pure state machine (`Msg` in, `Effect` out), `cmd` turns
//! effects into backend calls on background tasks, and `ui` renders frames
//! and runs the event loop.

mod app;
mod cmd;
mod theme;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use qflow_api::WorkflowBackend;

/// Runs the TUI until the user quits.
///
/// # Errors
///
/// Terminal setup failures (raw mode, alternate screen) and draw failures.
/// Backend failures are shown in the UI and never end the loop.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use qflow_api::{ClientConfig, QflowClient};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = QflowClient::new(&ClientConfig::default())?;
///     qflow_tui::run(Arc::new(client), Duration::from_secs(5)).await
/// }
/// ```
pub async fn run(backend: Arc<dyn WorkflowBackend>, poll_interval: Duration) -> Result<()> {
    ui::runtime::run_app(backend, poll_interval).await
}
