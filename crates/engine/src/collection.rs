//! Ordered list of task drafts.
//!
//! Every operation returns a new collection; callers never observe an
//! in-place mutation, so keeping older values around is enough to layer
//! undo/redo later.

use qflow_types::{ConfigField, Task, TaskConfigError, TaskId, TaskKind};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Tasks loaded from outside carried the same id twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate task id '{0}'")]
pub struct DuplicateTaskId(pub TaskId);

#[derive(Debug, Clone, PartialEq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    /// Next candidate suffix for generated `task-{n}` ids.
    next_sequence: u64,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_sequence: 1,
        }
    }

    /// One classical task followed by one quantum task, both with default config.
    pub fn initial_template() -> Self {
        Self::new().add_task(TaskKind::Classical).add_task(TaskKind::Quantum)
    }

    /// Wrap externally supplied tasks, keeping their ids and order.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, DuplicateTaskId> {
        for (index, task) in tasks.iter().enumerate() {
            if tasks[..index].iter().any(|earlier| earlier.id == task.id) {
                return Err(DuplicateTaskId(task.id.clone()));
            }
        }
        Ok(Self {
            next_sequence: tasks.len() as u64 + 1,
            tasks,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &TaskId> {
        self.tasks.iter().map(|task| &task.id)
    }

    /// Append a task of `kind` with a fresh id and the kind's default config.
    #[must_use]
    pub fn add_task(&self, kind: TaskKind) -> Self {
        let mut next = self.clone();
        let id = next.generate_id();
        debug!(%id, %kind, "adding task");
        next.tasks.push(Task::with_defaults(id, kind));
        next
    }

    /// Move the task at `source` to `destination`, shifting the tasks in between by one slot.
    ///
    /// A missing destination is a cancelled drag and returns the collection unchanged,
    /// as does any index outside the list.
    #[must_use]
    pub fn reorder(&self, source: usize, destination: Option<usize>) -> Self {
        let Some(destination) = destination else {
            return self.clone();
        };
        if source >= self.tasks.len() || destination >= self.tasks.len() {
            debug!(source, destination, len = self.tasks.len(), "ignoring out-of-range reorder");
            return self.clone();
        }
        let mut next = self.clone();
        let moved = next.tasks.remove(source);
        next.tasks.insert(destination, moved);
        next
    }

    /// Replace one config field of the task `id`.
    ///
    /// An unknown id is a silent no-op. A field that does not belong to the task's
    /// kind, or a value of the wrong shape, is rejected and nothing changes.
    pub fn update_config(&self, id: &TaskId, field: ConfigField, value: Value) -> Result<Self, TaskConfigError> {
        let Some(index) = self.position(id) else {
            debug!(%id, %field, "ignoring config update for unknown task");
            return Ok(self.clone());
        };
        let mut next = self.clone();
        next.tasks[index].config.set_field(field, value)?;
        Ok(next)
    }

    fn generate_id(&mut self) -> TaskId {
        loop {
            let candidate = TaskId::new(format!("task-{}", self.next_sequence));
            self.next_sequence += 1;
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

impl Default for TaskCollection {
    fn default() -> Self {
        Self::new()
    }
}
