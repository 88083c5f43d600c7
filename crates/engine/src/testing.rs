//! In-memory [`WorkflowBackend`] for engine tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use qflow_api::{ApiError, WorkflowBackend};
use qflow_types::{CreateWorkflowRequest, CreateWorkflowResponse, PerformanceRecord, WorkflowStatus};

/// Canned answer; rebuilt on every call since `ApiError` is not `Clone`.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Detail(u16, String),
    Status(u16),
}

impl<T: Clone> Reply<T> {
    fn build(&self) -> Result<T, ApiError> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Detail(status, detail) => Err(ApiError::from_status(
                *status,
                &serde_json::json!({ "detail": detail }).to_string(),
            )),
            Reply::Status(status) => Err(ApiError::from_status(*status, "")),
        }
    }
}

pub struct FakeBackend {
    workflows: Reply<Vec<WorkflowStatus>>,
    workflows_delay: Duration,
    performance: Reply<Vec<PerformanceRecord>>,
    performance_delay: Duration,
    create: Reply<CreateWorkflowResponse>,
    create_calls: AtomicUsize,
    requests: Mutex<Vec<CreateWorkflowRequest>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            workflows: Reply::Ok(Vec::new()),
            workflows_delay: Duration::ZERO,
            performance: Reply::Ok(Vec::new()),
            performance_delay: Duration::ZERO,
            create: Reply::Status(500),
            create_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    pub fn with_workflows(mut self, reply: Reply<Vec<WorkflowStatus>>) -> Self {
        self.workflows = reply;
        self
    }

    pub fn with_performance(mut self, reply: Reply<Vec<PerformanceRecord>>) -> Self {
        self.performance = reply;
        self
    }

    pub fn with_create(mut self, reply: Reply<CreateWorkflowResponse>) -> Self {
        self.create = reply;
        self
    }

    pub fn with_delays(mut self, workflows: Duration, performance: Duration) -> Self {
        self.workflows_delay = workflows;
        self.performance_delay = performance;
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CreateWorkflowRequest> {
        self.requests.lock().ok()?.last().cloned()
    }
}

#[async_trait]
impl WorkflowBackend for FakeBackend {
    async fn list_workflows(&self) -> Result<Vec<WorkflowStatus>, ApiError> {
        if !self.workflows_delay.is_zero() {
            tokio::time::sleep(self.workflows_delay).await;
        }
        self.workflows.build()
    }

    async fn list_performance(&self) -> Result<Vec<PerformanceRecord>, ApiError> {
        if !self.performance_delay.is_zero() {
            tokio::time::sleep(self.performance_delay).await;
        }
        self.performance.build()
    }

    async fn create_workflow(&self, request: &CreateWorkflowRequest) -> Result<CreateWorkflowResponse, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.create.build()
    }
}
