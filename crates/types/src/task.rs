//! Task drafts and their per-kind configuration.
//!
//! A task is identified by an opaque [`TaskId`] that never changes once
//! assigned, so reordering a draft moves tasks without touching identity.
//! Configuration is a closed tagged union: a classical task only ever carries
//! `operation` and `data`, a quantum task only `circuit`, `shots` and
//! `backend`. Unknown keys are rejected when decoding from the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Stable identifier of a task within one draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Nature of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Classical,
    Quantum,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Classical => "classical",
            TaskKind::Quantum => "quantum",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantum SDK a circuit is submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantumBackend {
    #[default]
    Cirq,
    Qiskit,
    Pennylane,
}

impl QuantumBackend {
    pub const ALL: [QuantumBackend; 3] = [QuantumBackend::Cirq, QuantumBackend::Qiskit, QuantumBackend::Pennylane];

    pub fn as_str(self) -> &'static str {
        match self {
            QuantumBackend::Cirq => "cirq",
            QuantumBackend::Qiskit => "qiskit",
            QuantumBackend::Pennylane => "pennylane",
        }
    }
}

impl fmt::Display for QuantumBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantumBackend {
    type Err = TaskConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuantumBackend::ALL
            .into_iter()
            .find(|backend| backend.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TaskConfigError::InvalidValue {
                field: ConfigField::Backend,
                reason: format!("unsupported backend '{s}'; expected one of cirq, qiskit, pennylane"),
            })
    }
}

/// Configuration of a classical processing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassicalConfig {
    pub operation: String,
    pub data: Vec<Value>,
}

impl Default for ClassicalConfig {
    fn default() -> Self {
        Self {
            operation: "preprocess".to_string(),
            data: vec![Value::from(1.0), Value::from(2.0), Value::from(3.0)],
        }
    }
}

/// Configuration of a quantum circuit execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuantumConfig {
    pub circuit: String,
    pub shots: u32,
    pub backend: QuantumBackend,
}

impl Default for QuantumConfig {
    fn default() -> Self {
        Self {
            circuit: "simple_x".to_string(),
            shots: 100,
            backend: QuantumBackend::Cirq,
        }
    }
}

/// The editable fields of a task configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Operation,
    Data,
    Circuit,
    Shots,
    Backend,
}

impl ConfigField {
    pub const CLASSICAL: [ConfigField; 2] = [ConfigField::Operation, ConfigField::Data];
    pub const QUANTUM: [ConfigField; 3] = [ConfigField::Circuit, ConfigField::Shots, ConfigField::Backend];

    /// Fields in display order for a task kind.
    pub fn for_kind(kind: TaskKind) -> &'static [ConfigField] {
        match kind {
            TaskKind::Classical => &Self::CLASSICAL,
            TaskKind::Quantum => &Self::QUANTUM,
        }
    }

    pub fn kind(self) -> TaskKind {
        match self {
            ConfigField::Operation | ConfigField::Data => TaskKind::Classical,
            ConfigField::Circuit | ConfigField::Shots | ConfigField::Backend => TaskKind::Quantum,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigField::Operation => "operation",
            ConfigField::Data => "data",
            ConfigField::Circuit => "circuit",
            ConfigField::Shots => "shots",
            ConfigField::Backend => "backend",
        }
    }

    /// Convert free-form text typed by a user into the JSON value this field expects.
    ///
    /// `data` accepts a JSON array or a comma-separated list (numbers stay numbers),
    /// `shots` an unsigned integer, everything else is taken as a string.
    pub fn parse_input(self, input: &str) -> Result<Value, TaskConfigError> {
        let trimmed = input.trim();
        match self {
            ConfigField::Operation | ConfigField::Circuit | ConfigField::Backend => Ok(Value::String(trimmed.to_string())),
            ConfigField::Shots => trimmed
                .parse::<u64>()
                .map(Value::from)
                .map_err(|e| TaskConfigError::InvalidValue {
                    field: self,
                    reason: format!("'{trimmed}' is not a whole number: {e}"),
                }),
            ConfigField::Data => {
                if trimmed.starts_with('[') {
                    return serde_json::from_str::<Value>(trimmed).map_err(|e| TaskConfigError::InvalidValue {
                        field: self,
                        reason: e.to_string(),
                    });
                }
                let items = trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| match serde_json::from_str::<Value>(item) {
                        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => value,
                        _ => Value::String(item.to_string()),
                    })
                    .collect();
                Ok(Value::Array(items))
            }
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigField {
    type Err = TaskConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operation" => Ok(ConfigField::Operation),
            "data" => Ok(ConfigField::Data),
            "circuit" => Ok(ConfigField::Circuit),
            "shots" => Ok(ConfigField::Shots),
            "backend" => Ok(ConfigField::Backend),
            other => Err(TaskConfigError::UnknownField(other.to_string())),
        }
    }
}

/// Rejection of a configuration edit or of a task decoded from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskConfigError {
    #[error("unknown config field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' does not apply to {kind} tasks")]
    FieldNotApplicable { field: ConfigField, kind: TaskKind },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: ConfigField, reason: String },

    #[error("invalid {kind} task config: {reason}")]
    InvalidConfig { kind: TaskKind, reason: String },
}

/// Per-kind task configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskConfig {
    Classical(ClassicalConfig),
    Quantum(QuantumConfig),
}

impl TaskConfig {
    /// Fully populated default configuration for a task kind.
    pub fn default_for(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Classical => TaskConfig::Classical(ClassicalConfig::default()),
            TaskKind::Quantum => TaskConfig::Quantum(QuantumConfig::default()),
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            TaskConfig::Classical(_) => TaskKind::Classical,
            TaskConfig::Quantum(_) => TaskKind::Quantum,
        }
    }

    /// Current value of a field, or `None` when the field belongs to the other kind.
    pub fn field(&self, field: ConfigField) -> Option<Value> {
        match (self, field) {
            (TaskConfig::Classical(c), ConfigField::Operation) => Some(Value::String(c.operation.clone())),
            (TaskConfig::Classical(c), ConfigField::Data) => Some(Value::Array(c.data.clone())),
            (TaskConfig::Quantum(q), ConfigField::Circuit) => Some(Value::String(q.circuit.clone())),
            (TaskConfig::Quantum(q), ConfigField::Shots) => Some(Value::from(q.shots)),
            (TaskConfig::Quantum(q), ConfigField::Backend) => Some(Value::String(q.backend.to_string())),
            _ => None,
        }
    }

    /// Replace exactly one field, leaving every other field untouched.
    ///
    /// No cross-field or range validation happens here; `shots` may be zero.
    pub fn set_field(&mut self, field: ConfigField, value: Value) -> Result<(), TaskConfigError> {
        let kind = self.kind();
        let invalid = |reason: &str| TaskConfigError::InvalidValue {
            field,
            reason: reason.to_string(),
        };
        match (self, field) {
            (TaskConfig::Classical(c), ConfigField::Operation) => {
                c.operation = value.as_str().ok_or_else(|| invalid("expected a string"))?.to_string();
            }
            (TaskConfig::Classical(c), ConfigField::Data) => match value {
                Value::Array(items) => c.data = items,
                _ => return Err(invalid("expected an array")),
            },
            (TaskConfig::Quantum(q), ConfigField::Circuit) => {
                q.circuit = value.as_str().ok_or_else(|| invalid("expected a string"))?.to_string();
            }
            (TaskConfig::Quantum(q), ConfigField::Shots) => {
                let shots = value.as_u64().ok_or_else(|| invalid("expected an unsigned integer"))?;
                q.shots = u32::try_from(shots).map_err(|_| invalid("value does not fit in 32 bits"))?;
            }
            (TaskConfig::Quantum(q), ConfigField::Backend) => {
                let name = value.as_str().ok_or_else(|| invalid("expected a string"))?;
                q.backend = name.parse()?;
            }
            _ => return Err(TaskConfigError::FieldNotApplicable { field, kind }),
        }
        Ok(())
    }
}

/// One step of a workflow draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "TaskWire", try_from = "TaskWire")]
pub struct Task {
    pub id: TaskId,
    pub config: TaskConfig,
}

impl Task {
    /// New task of `kind` with its default configuration.
    pub fn with_defaults(id: TaskId, kind: TaskKind) -> Self {
        Self {
            id,
            config: TaskConfig::default_for(kind),
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.config.kind()
    }
}

/// `{id, type, config}` as exchanged with the backend.
#[derive(Serialize, Deserialize)]
struct TaskWire {
    id: TaskId,
    #[serde(rename = "type")]
    kind: TaskKind,
    config: Value,
}

impl From<Task> for TaskWire {
    fn from(task: Task) -> Self {
        let kind = task.kind();
        let config = match task.config {
            TaskConfig::Classical(c) => serde_json::to_value(c),
            TaskConfig::Quantum(q) => serde_json::to_value(q),
        }
        .unwrap_or(Value::Null);
        Self { id: task.id, kind, config }
    }
}

impl TryFrom<TaskWire> for Task {
    type Error = TaskConfigError;

    fn try_from(wire: TaskWire) -> Result<Self, Self::Error> {
        let invalid = |e: serde_json::Error| TaskConfigError::InvalidConfig {
            kind: wire.kind,
            reason: e.to_string(),
        };
        let config = match wire.kind {
            TaskKind::Classical => TaskConfig::Classical(serde_json::from_value(wire.config.clone()).map_err(invalid)?),
            TaskKind::Quantum => TaskConfig::Quantum(serde_json::from_value(wire.config.clone()).map_err(invalid)?),
        };
        Ok(Task { id: wire.id, config })
    }
}
