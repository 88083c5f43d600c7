//! qflow backend client.
//!
//! This crate provides a lightweight client for the hybrid workflow backend.
//! It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating the configured base URL for safety
//! - Building requests with a consistent User-Agent and Accept headers
//! - Mapping every failure into [`ApiError`], with the backend's `detail`
//!   preserved when it sends one
//!
//! The [`WorkflowBackend`] trait is the seam the engine talks to; [`QflowClient`]
//! is its HTTP implementation.
//!
//! # Example
//!
//! ```ignore
//! use qflow_api::{ClientConfig, QflowClient, WorkflowBackend};
//!
//! async fn show() -> anyhow::Result<()> {
//!     let client = QflowClient::new(&ClientConfig::default())?;
//!     for workflow in client.list_workflows().await? {
//!         println!("{} {}", workflow.workflow_id, workflow.status);
//!     }
//!     Ok(())
//! }
//! ```

mod error;

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use qflow_types::{CreateWorkflowRequest, CreateWorkflowResponse, PerformanceRecord, WorkflowStatus};
use reqwest::{Client, Method, RequestBuilder, Url, header};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use error::ApiError;

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
/// Per-request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const WORKFLOWS_PATH: &str = "/api/workflows";
pub const PERFORMANCE_PATH: &str = "/api/performance";

/// Hostnames allowed to use plain HTTP.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "[::1]"];

/// Reads and writes the engine needs from the workflow backend.
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// `GET /api/workflows`
    async fn list_workflows(&self) -> Result<Vec<WorkflowStatus>, ApiError>;

    /// `GET /api/performance`
    async fn list_performance(&self) -> Result<Vec<PerformanceRecord>, ApiError>;

    /// `POST /api/workflows`
    async fn create_workflow(&self, request: &CreateWorkflowRequest) -> Result<CreateWorkflowResponse, ApiError>;
}

/// Connection settings for [`QflowClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for backend access.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL.
pub struct QflowClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl QflowClient {
    /// Construct a [`QflowClient`] from explicit settings.
    ///
    /// Non-localhost hosts must use HTTPS.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("qflow/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, %method, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error = ApiError::from_status(status.as_u16(), &body);
            warn!(status = status.as_u16(), detail = ?error.detail(), "backend rejected request");
            return Err(error);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl WorkflowBackend for QflowClient {
    async fn list_workflows(&self) -> Result<Vec<WorkflowStatus>, ApiError> {
        self.send_json(self.request(Method::GET, WORKFLOWS_PATH)).await
    }

    async fn list_performance(&self) -> Result<Vec<PerformanceRecord>, ApiError> {
        self.send_json(self.request(Method::GET, PERFORMANCE_PATH)).await
    }

    async fn create_workflow(&self, request: &CreateWorkflowRequest) -> Result<CreateWorkflowResponse, ApiError> {
        let builder = self.request(Method::POST, WORKFLOWS_PATH).json(request);
        self.send_json(builder).await
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost`, `127.0.0.1` or `[::1]`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid API base URL '{}': {}", base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("API base URL must include a host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "API base URL must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use qflow_types::{Task, TaskId, TaskKind};
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> QflowClient {
        QflowClient::new(&ClientConfig {
            base_url: server.url(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn base_url_rules() {
        assert!(validate_base_url("http://localhost:8000").is_ok());
        assert!(validate_base_url("http://127.0.0.1:9000").is_ok());
        assert!(validate_base_url("https://workflows.example.com").is_ok());
        assert!(validate_base_url("http://workflows.example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = QflowClient::new(&ClientConfig {
            base_url: "http://localhost:8000/".into(),
            timeout: DEFAULT_TIMEOUT,
        })
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[tokio::test]
    async fn create_workflow_posts_ordered_tasks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", WORKFLOWS_PATH)
            .match_body(Matcher::Json(json!({
                "name": "Test Workflow",
                "tasks": [
                    {"id": "b", "type": "quantum", "config": {"circuit": "simple_x", "shots": 100, "backend": "cirq"}},
                    {"id": "a", "type": "classical", "config": {"operation": "preprocess", "data": [1.0, 2.0, 3.0]}}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"workflow_id": 1}"#)
            .create_async()
            .await;

        let request = CreateWorkflowRequest {
            name: "Test Workflow".into(),
            tasks: vec![
                Task::with_defaults(TaskId::new("b"), TaskKind::Quantum),
                Task::with_defaults(TaskId::new("a"), TaskKind::Classical),
            ],
        };
        let response = client_for(&server).create_workflow(&request).await.unwrap();

        assert_eq!(response.workflow_id, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_workflow_surfaces_backend_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", WORKFLOWS_PATH)
            .with_status(400)
            .with_body(r#"{"detail": "API error"}"#)
            .create_async()
            .await;

        let request = CreateWorkflowRequest {
            name: "x".into(),
            tasks: vec![],
        };
        let err = client_for(&server).create_workflow(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
        assert_eq!(err.user_message(), "API error");
    }

    #[tokio::test]
    async fn success_without_workflow_id_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", WORKFLOWS_PATH)
            .with_status(201)
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let request = CreateWorkflowRequest {
            name: "x".into(),
            tasks: vec![],
        };
        let err = client_for(&server).create_workflow(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "{err:?}");
    }

    #[tokio::test]
    async fn list_endpoints_decode_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", WORKFLOWS_PATH)
            .with_status(200)
            .with_body(r#"[{"workflow_id": 7, "name": "bell", "status": "completed"}]"#)
            .create_async()
            .await;
        server
            .mock("GET", PERFORMANCE_PATH)
            .with_status(200)
            .with_body(
                r#"[{"workflow_id": 7, "task_id": 1, "runtime": 0.5, "circuit_depth": null, "shots": 100, "timestamp": "2024-01-01T00:00:00"}]"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let workflows = client.list_workflows().await.unwrap();
        let records = client.list_performance().await.unwrap();

        assert_eq!(workflows[0].name, "bell");
        assert_eq!(records[0].shots, Some(100));
        assert_eq!(records[0].circuit_depth, None);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let client = QflowClient::new(&ClientConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        let err = client.list_workflows().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.detail(), None);
        assert!(!err.user_message().is_empty());
    }
}
