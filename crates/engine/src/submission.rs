//! Submission state machine for a workflow draft.
//!
//! ```text
//! Idle ──► LocalInvalid            (empty name, no request issued)
//!   └────► Submitting ──► Success  (draft replaced by the initial template)
//!                     └─► Error    (draft kept for a retry)
//! LocalInvalid / Error ──► Idle    (next edit or next submit)
//! ```
//!
//! The phases are exposed separately ([`WorkflowSubmissionController::begin`] and
//! [`WorkflowSubmissionController::finish`]) so an event loop can run the request on
//! a background task; [`WorkflowSubmissionController::submit`] composes them.

use qflow_api::{ApiError, WorkflowBackend};
use qflow_types::{CreateWorkflowRequest, CreateWorkflowResponse};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::draft::WorkflowDraft;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Workflow name is required")]
    NameRequired,

    #[error("A workflow submission is already in progress")]
    InFlight,

    #[error("Workflow submission was cancelled")]
    Cancelled,

    #[error("Failed to create workflow: {}", .0.user_message())]
    Backend(#[source] ApiError),
}

impl SubmissionError {
    /// Detected before any I/O.
    pub fn is_local(&self) -> bool {
        matches!(self, SubmissionError::NameRequired | SubmissionError::InFlight)
    }
}

/// Terminal result of one submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success { workflow_id: i64 },
    Failure { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    LocalInvalid {
        message: String,
    },
    Submitting {
        name: String,
    },
    Success {
        workflow_id: i64,
        message: String,
    },
    Error {
        message: String,
    },
}

impl SubmissionState {
    /// Text shown next to the editor, if the state has any.
    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionState::LocalInvalid { message }
            | SubmissionState::Success { message, .. }
            | SubmissionState::Error { message } => Some(message),
            SubmissionState::Idle | SubmissionState::Submitting { .. } => None,
        }
    }

    pub fn outcome(&self) -> Option<SubmissionOutcome> {
        match self {
            SubmissionState::Success { workflow_id, .. } => Some(SubmissionOutcome::Success {
                workflow_id: *workflow_id,
            }),
            SubmissionState::LocalInvalid { message } | SubmissionState::Error { message } => {
                Some(SubmissionOutcome::Failure {
                    message: message.clone(),
                })
            }
            SubmissionState::Idle | SubmissionState::Submitting { .. } => None,
        }
    }
}

/// A created workflow plus the draft that replaces the submitted one.
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub workflow_id: i64,
    pub message: String,
    pub next_draft: WorkflowDraft,
}

#[derive(Debug, Default)]
pub struct WorkflowSubmissionController {
    state: SubmissionState,
}

impl WorkflowSubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting { .. })
    }

    /// The draft was edited: an invalid or failed state no longer describes it.
    pub fn note_edit(&mut self) {
        if matches!(self.state, SubmissionState::LocalInvalid { .. } | SubmissionState::Error { .. }) {
            self.state = SubmissionState::Idle;
        }
    }

    /// Validate `draft` and enter `Submitting`, returning the request to send.
    ///
    /// Validation is synchronous; on error no request must be issued.
    pub fn begin(&mut self, draft: &WorkflowDraft) -> Result<CreateWorkflowRequest, SubmissionError> {
        if self.is_submitting() {
            return Err(SubmissionError::InFlight);
        }
        if draft.name.is_empty() {
            let error = SubmissionError::NameRequired;
            self.state = SubmissionState::LocalInvalid {
                message: error.to_string(),
            };
            return Err(error);
        }
        self.state = SubmissionState::Submitting {
            name: draft.name.clone(),
        };
        Ok(draft.to_request())
    }

    /// Apply the backend's answer to the in-flight submission.
    ///
    /// Returns `None` when nothing is in flight (the submission was aborted and
    /// this answer is stale).
    pub fn finish(
        &mut self,
        result: Result<CreateWorkflowResponse, ApiError>,
    ) -> Option<Result<Submitted, SubmissionError>> {
        let SubmissionState::Submitting { name } = &self.state else {
            return None;
        };
        let name = name.clone();
        match result {
            Ok(response) => {
                let message = format!("Workflow '{}' created with ID: {}", name, response.workflow_id);
                info!(workflow_id = response.workflow_id, %name, "workflow created");
                self.state = SubmissionState::Success {
                    workflow_id: response.workflow_id,
                    message: message.clone(),
                };
                Some(Ok(Submitted {
                    workflow_id: response.workflow_id,
                    message,
                    next_draft: WorkflowDraft::initial(),
                }))
            }
            Err(api_error) => {
                let error = SubmissionError::Backend(api_error);
                warn!(%name, error = %error, "workflow creation failed");
                self.state = SubmissionState::Error {
                    message: error.to_string(),
                };
                Some(Err(error))
            }
        }
    }

    /// Drop the in-flight submission; a later [`finish`](Self::finish) is ignored.
    pub fn abort(&mut self) {
        if self.is_submitting() {
            self.state = SubmissionState::Idle;
        }
    }

    /// Validate, send exactly one create request, and apply the answer.
    ///
    /// The draft is never modified here; on success the caller swaps in
    /// [`Submitted::next_draft`].
    pub async fn submit(
        &mut self,
        backend: &dyn WorkflowBackend,
        draft: &WorkflowDraft,
        cancel: &CancellationToken,
    ) -> Result<Submitted, SubmissionError> {
        let request = self.begin(draft)?;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.abort();
                return Err(SubmissionError::Cancelled);
            }
            result = backend.create_workflow(&request) => result,
        };
        self.finish(result).unwrap_or(Err(SubmissionError::Cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, Reply};
    use qflow_types::TaskKind;

    fn named(name: &str) -> WorkflowDraft {
        WorkflowDraft::initial().with_name(name).add_task(TaskKind::Quantum)
    }

    #[tokio::test]
    async fn empty_name_issues_no_request() {
        let backend = FakeBackend::default();
        let mut controller = WorkflowSubmissionController::new();

        let err = controller
            .submit(&backend, &WorkflowDraft::initial(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::NameRequired));
        assert!(err.is_local());
        assert_eq!(backend.create_calls(), 0);
        assert_eq!(controller.state().message(), Some("Workflow name is required"));
    }

    #[tokio::test]
    async fn whitespace_name_is_sent_as_is() {
        let backend = FakeBackend::default().with_create(Reply::Ok(CreateWorkflowResponse { workflow_id: 1 }));
        let mut controller = WorkflowSubmissionController::new();
        let draft = WorkflowDraft::initial().with_name("   ");

        let submitted = controller
            .submit(&backend, &draft, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(backend.create_calls(), 1);
        assert_eq!(backend.last_request().unwrap().name, "   ");
        assert_eq!(submitted.workflow_id, 1);
    }

    #[tokio::test]
    async fn success_reports_name_and_id_and_resets_the_draft() {
        let backend = FakeBackend::default().with_create(Reply::Ok(CreateWorkflowResponse { workflow_id: 1 }));
        let mut controller = WorkflowSubmissionController::new();
        let draft = named("Test Workflow");

        let submitted = controller
            .submit(&backend, &draft, &CancellationToken::new())
            .await
            .unwrap();

        assert!(submitted.message.contains("Workflow 'Test Workflow' created with ID: 1"));
        assert_eq!(submitted.next_draft, WorkflowDraft::initial());
        assert!(submitted.next_draft.name.is_empty());
        assert_eq!(backend.create_calls(), 1);
        assert_eq!(backend.last_request().unwrap(), draft.to_request());
        assert_eq!(
            controller.state().outcome(),
            Some(SubmissionOutcome::Success { workflow_id: 1 })
        );
    }

    #[tokio::test]
    async fn backend_detail_is_reported_verbatim() {
        let backend = FakeBackend::default().with_create(Reply::Detail(400, "API error".into()));
        let mut controller = WorkflowSubmissionController::new();

        let err = controller
            .submit(&backend, &named("Test Workflow"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to create workflow: API error");
        assert_eq!(controller.state().message(), Some("Failed to create workflow: API error"));
    }

    #[tokio::test]
    async fn missing_detail_falls_back_to_transport_text() {
        let backend = FakeBackend::default().with_create(Reply::Status(503));
        let mut controller = WorkflowSubmissionController::new();

        let err = controller
            .submit(&backend, &named("wf"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to create workflow: Request failed with status code 503"
        );
    }

    #[test]
    fn second_begin_while_in_flight_is_rejected() {
        let mut controller = WorkflowSubmissionController::new();
        let draft = named("wf");

        assert!(controller.begin(&draft).is_ok());
        assert!(matches!(controller.begin(&draft), Err(SubmissionError::InFlight)));
        assert!(controller.is_submitting());
    }

    #[test]
    fn edits_clear_invalid_and_error_states_only() {
        let mut controller = WorkflowSubmissionController::new();
        let _ = controller.begin(&WorkflowDraft::initial());
        controller.note_edit();
        assert_eq!(controller.state(), &SubmissionState::Idle);

        let _ = controller.begin(&named("wf"));
        let _ = controller.finish(Ok(CreateWorkflowResponse { workflow_id: 9 }));
        controller.note_edit();
        assert!(matches!(controller.state(), SubmissionState::Success { workflow_id: 9, .. }));
    }

    #[test]
    fn a_failed_submission_can_be_retried() {
        let mut controller = WorkflowSubmissionController::new();
        let draft = named("wf");

        controller.begin(&draft).unwrap();
        let _ = controller.finish(Err(ApiError::from_status(500, "")));
        assert!(matches!(controller.state(), SubmissionState::Error { .. }));

        assert!(controller.begin(&draft).is_ok());
        assert!(controller.is_submitting());
    }

    #[test]
    fn stale_answers_after_abort_are_ignored() {
        let mut controller = WorkflowSubmissionController::new();
        controller.begin(&named("wf")).unwrap();
        controller.abort();

        assert!(controller.finish(Ok(CreateWorkflowResponse { workflow_id: 3 })).is_none());
        assert_eq!(controller.state(), &SubmissionState::Idle);
    }

    #[tokio::test]
    async fn cancelled_submission_returns_to_idle() {
        let backend = FakeBackend::default().with_create(Reply::Ok(CreateWorkflowResponse { workflow_id: 1 }));
        let mut controller = WorkflowSubmissionController::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = controller.submit(&backend, &named("wf"), &cancel).await.unwrap_err();

        assert!(matches!(err, SubmissionError::Cancelled));
        assert_eq!(controller.state(), &SubmissionState::Idle);
    }
}
