use qflow_types::WorkflowStatus;
use serde::Serialize;

/// The only status string the backend gives special meaning.
pub const COMPLETED: &str = "completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAccent {
    Completed,
    Other,
}

impl StatusAccent {
    pub fn classify(status: &str) -> Self {
        if status == COMPLETED {
            StatusAccent::Completed
        } else {
            StatusAccent::Other
        }
    }
}

/// One workflow as displayed: backend fields verbatim plus the accent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCard {
    pub workflow_id: i64,
    pub name: String,
    pub status: String,
    pub accent: StatusAccent,
}

impl From<&WorkflowStatus> for StatusCard {
    fn from(workflow: &WorkflowStatus) -> Self {
        Self {
            workflow_id: workflow.workflow_id,
            name: workflow.name.clone(),
            status: workflow.status.clone(),
            accent: StatusAccent::classify(&workflow.status),
        }
    }
}

pub fn status_cards(workflows: &[WorkflowStatus]) -> Vec<StatusCard> {
    workflows.iter().map(StatusCard::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_completed_is_accented() {
        let rows = ["completed", "running", "Completed", "failed"].map(|status| WorkflowStatus {
            workflow_id: 1,
            name: "wf".into(),
            status: status.into(),
        });
        let accents: Vec<_> = status_cards(&rows).into_iter().map(|card| card.accent).collect();
        assert_eq!(
            accents,
            vec![
                StatusAccent::Completed,
                StatusAccent::Other,
                StatusAccent::Other,
                StatusAccent::Other
            ]
        );
    }

    #[test]
    fn fields_are_kept_verbatim() {
        let card = StatusCard::from(&WorkflowStatus {
            workflow_id: 12,
            name: "Bell pipeline".into(),
            status: "queued".into(),
        });
        assert_eq!(card.workflow_id, 12);
        assert_eq!(card.name, "Bell pipeline");
        assert_eq!(card.status, "queued");
    }
}
