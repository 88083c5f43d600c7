//! Rough USD cost of running a draft's quantum tasks.
//!
//! Prices are per shot plus per unit of circuit depth. Draft tasks carry no
//! depth, so the caller supplies one (default [`DEFAULT_DEPTH`]).

use std::fmt;
use std::str::FromStr;

use qflow_types::{QuantumBackend, Task, TaskConfig, TaskId};
use serde::Serialize;
use tracing::{info, warn};

pub const DEFAULT_DEPTH: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendTier {
    #[default]
    Simulator,
    Cloud,
}

impl BackendTier {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendTier::Simulator => "simulator",
            BackendTier::Cloud => "cloud",
        }
    }
}

impl fmt::Display for BackendTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simulator" => Ok(BackendTier::Simulator),
            "cloud" => Ok(BackendTier::Cloud),
            other => Err(format!("unknown backend tier '{other}' (expected simulator or cloud)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub per_shot: f64,
    pub per_depth: f64,
}

pub fn pricing(backend: QuantumBackend, tier: BackendTier) -> Pricing {
    let (per_shot, per_depth) = match (backend, tier) {
        (QuantumBackend::Cirq, BackendTier::Simulator) => (0.0001, 0.001),
        (QuantumBackend::Cirq, BackendTier::Cloud) => (0.01, 0.05),
        (QuantumBackend::Qiskit, BackendTier::Simulator) => (0.00005, 0.0005),
        (QuantumBackend::Qiskit, BackendTier::Cloud) => (0.008, 0.04),
        (QuantumBackend::Pennylane, BackendTier::Simulator) => (0.00008, 0.0008),
        (QuantumBackend::Pennylane, BackendTier::Cloud) => (0.009, 0.045),
    };
    Pricing { per_shot, per_depth }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCost {
    pub task_id: TaskId,
    pub backend: QuantumBackend,
    pub tier: BackendTier,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CostEstimate {
    pub total: f64,
    pub breakdown: Vec<TaskCost>,
}

impl CostEstimate {
    pub fn exceeds_budget(&self, max_budget: f64) -> bool {
        let over = self.total > max_budget;
        if over {
            warn!(total = self.total, max_budget, "estimated cost exceeds budget");
        }
        over
    }
}

/// Price every quantum task in `tasks`; classical tasks are skipped.
pub fn estimate_draft_cost(tasks: &[Task], tier: BackendTier, depth: u64) -> CostEstimate {
    let mut estimate = CostEstimate::default();
    for task in tasks {
        let TaskConfig::Quantum(config) = &task.config else {
            continue;
        };
        let price = pricing(config.backend, tier);
        let cost = f64::from(config.shots) * price.per_shot + depth as f64 * price.per_depth;
        estimate.total += cost;
        estimate.breakdown.push(TaskCost {
            task_id: task.id.clone(),
            backend: config.backend,
            tier,
            cost,
        });
    }
    info!(total = estimate.total, tasks = estimate.breakdown.len(), %tier, "estimated draft cost");
    estimate
}
