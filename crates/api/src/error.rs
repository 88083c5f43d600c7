use qflow_types::ApiErrorBody;
use thiserror::Error;

/// Failure of a backend call.
///
/// Every variant is recoverable from the caller's point of view: the request
/// can simply be retried. [`ApiError::user_message`] applies the single rule
/// for what a user sees: the backend's `detail` when it sent one, otherwise
/// the raw transport-level text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Status { status: u16, detail: Option<String> },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A success response whose body did not have the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a status error from a response body, extracting `detail` when present.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.detail_text());
        ApiError::Status { status, detail }
    }

    /// Backend-supplied structured detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Text to surface to the user.
    pub fn user_message(&self) -> String {
        self.detail().map(str::to_string).unwrap_or_else(|| self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_wins_over_status_text() {
        let err = ApiError::from_status(400, r#"{"detail":"API error"}"#);
        assert_eq!(err.user_message(), "API error");
    }

    #[test]
    fn status_text_is_used_without_detail() {
        let err = ApiError::from_status(500, "<html>oops</html>");
        assert_eq!(err.detail(), None);
        assert_eq!(err.user_message(), "Request failed with status code 500");
    }

    #[test]
    fn decode_errors_carry_their_reason() {
        let err = ApiError::Decode("missing field `workflow_id`".into());
        assert_eq!(err.user_message(), "invalid response body: missing field `workflow_id`");
    }
}
