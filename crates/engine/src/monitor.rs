//! Dashboard state fed by the two monitoring reads.
//!
//! The reads are independent: whichever finishes first is committed first, and a
//! failure of one never hides data the other already committed.

use futures_util::StreamExt;
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::FuturesUnordered;
use qflow_api::{ApiError, WorkflowBackend};
use qflow_types::{PerformanceRecord, WorkflowStatus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::metrics::{MetricsView, aggregate};
use crate::status::{StatusCard, status_cards};

pub const NO_WORKFLOWS: &str = "No workflows found";
pub const NO_METRICS: &str = "No performance metrics available";

/// Result of one monitoring read.
#[derive(Debug)]
pub enum FetchSlice {
    Workflows(Result<Vec<WorkflowStatus>, ApiError>),
    Performance(Result<Vec<PerformanceRecord>, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    /// `None` until the first successful read.
    pub workflows: Option<Vec<StatusCard>>,
    pub metrics: Option<MetricsView>,
    pub error: Option<String>,
    generation: u64,
    pending: u8,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a refresh cycle and return its generation.
    ///
    /// Clears the error but keeps committed data on screen.
    pub fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.pending = 2;
        self.error = None;
        self.generation
    }

    /// Stop waiting on the current cycle; its late results are dropped.
    pub fn abandon(&mut self) {
        self.generation += 1;
        self.pending = 0;
    }

    /// Commit one slice. Returns `false` when `generation` is stale.
    pub fn apply(&mut self, generation: u64, slice: FetchSlice) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale dashboard result");
            return false;
        }
        self.pending = self.pending.saturating_sub(1);
        match slice {
            FetchSlice::Workflows(Ok(rows)) => self.workflows = Some(status_cards(&rows)),
            FetchSlice::Performance(Ok(records)) => self.metrics = Some(aggregate(&records)),
            FetchSlice::Workflows(Err(error)) | FetchSlice::Performance(Err(error)) => {
                warn!(error = %error, "dashboard fetch failed");
                self.error = Some(format!("Failed to fetch data: {}", error.user_message()));
            }
        }
        true
    }

    /// Placeholder for a committed but empty workflow list.
    pub fn workflows_placeholder(&self) -> Option<&'static str> {
        matches!(&self.workflows, Some(cards) if cards.is_empty()).then_some(NO_WORKFLOWS)
    }

    pub fn metrics_placeholder(&self) -> Option<&'static str> {
        matches!(&self.metrics, Some(view) if view.is_empty()).then_some(NO_METRICS)
    }
}

/// Issue both reads concurrently and commit each slice as soon as it arrives.
///
/// Returns `false` if `cancel` fired before both slices were committed.
pub async fn refresh(backend: &dyn WorkflowBackend, state: &mut DashboardState, cancel: &CancellationToken) -> bool {
    let generation = state.begin_refresh();
    let mut pending: FuturesUnordered<BoxFuture<'_, FetchSlice>> = FuturesUnordered::new();
    pending.push(async move { FetchSlice::Workflows(backend.list_workflows().await) }.boxed());
    pending.push(async move { FetchSlice::Performance(backend.list_performance().await) }.boxed());

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(generation, "dashboard refresh cancelled");
                state.abandon();
                return false;
            }
            next = pending.next() => match next {
                Some(slice) => {
                    state.apply(generation, slice);
                }
                None => return true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, Reply};
    use std::time::Duration;

    fn workflow(id: i64, status: &str) -> WorkflowStatus {
        WorkflowStatus {
            workflow_id: id,
            name: format!("wf-{id}"),
            status: status.into(),
        }
    }

    fn perf(task_id: i64) -> PerformanceRecord {
        PerformanceRecord {
            workflow_id: 1,
            task_id,
            runtime: 0.5,
            circuit_depth: Some(5),
            shots: Some(100),
            timestamp: "2024-01-01T00:00:00".into(),
        }
    }

    #[tokio::test]
    async fn both_reads_failing_show_one_error_and_no_cards() {
        let backend = FakeBackend::default()
            .with_workflows(Reply::Detail(500, "API error".into()))
            .with_performance(Reply::Detail(500, "API error".into()));
        let mut state = DashboardState::new();

        assert!(refresh(&backend, &mut state, &CancellationToken::new()).await);

        assert_eq!(state.error.as_deref(), Some("Failed to fetch data: API error"));
        assert_eq!(state.workflows, None);
        assert_eq!(state.metrics, None);
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn empty_reads_show_placeholders_not_errors() {
        let backend = FakeBackend::default();
        let mut state = DashboardState::new();

        refresh(&backend, &mut state, &CancellationToken::new()).await;

        assert_eq!(state.error, None);
        assert_eq!(state.workflows_placeholder(), Some("No workflows found"));
        assert_eq!(state.metrics_placeholder(), Some("No performance metrics available"));
    }

    #[tokio::test]
    async fn one_failing_read_keeps_the_other_slice() {
        let backend = FakeBackend::default()
            .with_workflows(Reply::Ok(vec![workflow(1, "completed"), workflow(2, "running")]))
            .with_performance(Reply::Status(502))
            .with_delays(Duration::ZERO, Duration::from_millis(20));
        let mut state = DashboardState::new();

        refresh(&backend, &mut state, &CancellationToken::new()).await;

        assert_eq!(state.workflows.as_ref().map(Vec::len), Some(2));
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to fetch data: Request failed with status code 502")
        );
    }

    #[tokio::test]
    async fn failed_refresh_does_not_erase_committed_data() {
        let mut state = DashboardState::new();
        let ok = FakeBackend::default()
            .with_workflows(Reply::Ok(vec![workflow(1, "completed")]))
            .with_performance(Reply::Ok(vec![perf(1), perf(2)]));
        refresh(&ok, &mut state, &CancellationToken::new()).await;

        let failing = FakeBackend::default()
            .with_workflows(Reply::Status(500))
            .with_performance(Reply::Status(500));
        refresh(&failing, &mut state, &CancellationToken::new()).await;

        assert_eq!(state.workflows.as_ref().map(Vec::len), Some(1));
        assert_eq!(state.metrics.as_ref().map(|view| view.series.len()), Some(2));
        assert!(state.error.is_some());
    }

    #[test]
    fn slices_commit_independently_in_arrival_order() {
        let mut state = DashboardState::new();
        let generation = state.begin_refresh();

        state.apply(generation, FetchSlice::Performance(Ok(vec![perf(7)])));
        assert!(state.is_loading());
        assert_eq!(state.metrics.as_ref().map(|view| view.series.labels.clone()), Some(vec!["Task 7".to_string()]));
        assert_eq!(state.workflows, None);

        state.apply(generation, FetchSlice::Workflows(Ok(vec![workflow(3, "queued")])));
        assert!(!state.is_loading());
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut state = DashboardState::new();
        let old = state.begin_refresh();
        state.abandon();

        assert!(!state.apply(old, FetchSlice::Workflows(Ok(vec![workflow(1, "completed")]))));
        assert_eq!(state.workflows, None);
    }

    #[tokio::test]
    async fn cancelled_refresh_commits_nothing() {
        let backend = FakeBackend::default().with_workflows(Reply::Ok(vec![workflow(1, "completed")]));
        let mut state = DashboardState::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(!refresh(&backend, &mut state, &cancel).await);
        assert_eq!(state.workflows, None);
        assert!(!state.is_loading());
    }
}
