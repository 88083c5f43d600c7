use std::fs;
use std::path::{Path, PathBuf};

use qflow_types::Task;
use thiserror::Error;

use crate::collection::{DuplicateTaskId, TaskCollection};

#[derive(Debug, Error)]
pub enum TaskFileError {
    #[error("failed to read task file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid task file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid task file: {0}")]
    Duplicate(#[from] DuplicateTaskId),
}

/// Load an ordered task list from a JSON or YAML file.
///
/// The document must be an array of tasks in wire shape
/// (`{id, type, config}`); YAML is a superset of JSON, so one parser covers both.
pub fn parse_task_file(path: impl AsRef<Path>) -> Result<TaskCollection, TaskFileError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| TaskFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tasks: Vec<Task> = serde_yaml::from_str(&content).map_err(|source| TaskFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(TaskCollection::from_tasks(tasks)?)
}
