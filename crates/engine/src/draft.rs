//! The in-progress workflow held by an editing session.

use qflow_types::{ConfigField, CreateWorkflowRequest, TaskConfigError, TaskId, TaskKind};
use serde_json::Value;

use crate::collection::TaskCollection;

/// Name plus ordered tasks. Replaced as a whole, never patched in place.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDraft {
    pub name: String,
    pub tasks: TaskCollection,
}

impl WorkflowDraft {
    /// Empty name with the initial classical + quantum template.
    pub fn initial() -> Self {
        Self {
            name: String::new(),
            tasks: TaskCollection::initial_template(),
        }
    }

    pub fn new(name: impl Into<String>, tasks: TaskCollection) -> Self {
        Self { name: name.into(), tasks }
    }

    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: self.tasks.clone(),
        }
    }

    #[must_use]
    pub fn add_task(&self, kind: TaskKind) -> Self {
        Self {
            name: self.name.clone(),
            tasks: self.tasks.add_task(kind),
        }
    }

    #[must_use]
    pub fn reorder(&self, source: usize, destination: Option<usize>) -> Self {
        Self {
            name: self.name.clone(),
            tasks: self.tasks.reorder(source, destination),
        }
    }

    pub fn update_config(&self, id: &TaskId, field: ConfigField, value: Value) -> Result<Self, TaskConfigError> {
        Ok(Self {
            name: self.name.clone(),
            tasks: self.tasks.update_config(id, field, value)?,
        })
    }

    /// Snapshot sent to `POST /api/workflows`.
    pub fn to_request(&self) -> CreateWorkflowRequest {
        CreateWorkflowRequest {
            name: self.name.clone(),
            tasks: self.tasks.tasks().to_vec(),
        }
    }
}

impl Default for WorkflowDraft {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_the_full_ordered_snapshot() {
        let draft = WorkflowDraft::initial()
            .with_name("Bell pipeline")
            .add_task(TaskKind::Quantum)
            .reorder(2, Some(0));
        let request = draft.to_request();
        let ids: Vec<_> = request.tasks.iter().map(|task| task.id.to_string()).collect();
        assert_eq!(request.name, "Bell pipeline");
        assert_eq!(ids, vec!["task-3", "task-1", "task-2"]);
    }

    #[test]
    fn transitions_keep_the_name() {
        let draft = WorkflowDraft::initial().with_name("keep me").add_task(TaskKind::Classical);
        assert_eq!(draft.name, "keep me");
        assert_eq!(draft.tasks.len(), 3);
    }
}
