//! # Command Execution Layer
//!
//! This module translates application effects (`Effect`) into imperative
//! commands (`Cmd`) and executes them. It is the boundary where the pure state
//! in `app` meets the backend:
//! - creating a workflow from a submitted draft
//! - the two dashboard reads, issued as independent tasks
//! - cancelling reads whose view was torn down
//!
//! Every command runs on its own tokio task and reports back by sending a
//! [`Msg`] to the event loop, so the loop never awaits I/O itself. This follows
//! a **functional core, imperative shell** pattern.

use std::sync::Arc;

use qflow_api::WorkflowBackend;
use qflow_engine::FetchSlice;
use qflow_types::CreateWorkflowRequest;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::spawn;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::app::{Effect, Msg};

#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    CreateWorkflow(CreateWorkflowRequest),
    FetchWorkflows { generation: u64 },
    FetchPerformance { generation: u64 },
    CancelDashboard,
}

/// Convert application [`Effect`]s into [`Cmd`]s.
///
/// A dashboard refresh becomes one command per read so that each slice is
/// committed as soon as its own request resolves.
pub fn from_effects(effects: Vec<Effect>) -> Vec<Cmd> {
    let mut commands = Vec::new();
    for effect in effects {
        match effect {
            Effect::SubmitWorkflow(request) => commands.push(Cmd::CreateWorkflow(request)),
            Effect::RefreshDashboard { generation } => {
                commands.push(Cmd::FetchWorkflows { generation });
                commands.push(Cmd::FetchPerformance { generation });
            }
            Effect::CancelDashboard => commands.push(Cmd::CancelDashboard),
        }
    }
    commands
}

/// Everything a command needs to run detached from the event loop.
pub struct CommandContext {
    backend: Arc<dyn WorkflowBackend>,
    sender: UnboundedSender<Msg>,
    /// Cancelled when the TUI exits.
    root: CancellationToken,
    /// Cancelled when the dashboard is left; replaced afterwards.
    dashboard: CancellationToken,
}

impl CommandContext {
    pub fn new(backend: Arc<dyn WorkflowBackend>, sender: UnboundedSender<Msg>) -> Self {
        let root = CancellationToken::new();
        let dashboard = root.child_token();
        Self {
            backend,
            sender,
            root,
            dashboard,
        }
    }

    /// Cancel every in-flight command.
    pub fn shutdown(&self) {
        self.root.cancel();
    }
}

pub fn run_from_effects(ctx: &mut CommandContext, effects: Vec<Effect>) {
    run_cmds(ctx, from_effects(effects));
}

pub fn run_cmds(ctx: &mut CommandContext, commands: Vec<Cmd>) {
    for command in commands {
        match command {
            Cmd::CreateWorkflow(request) => spawn_create(ctx, request),
            Cmd::FetchWorkflows { generation } => {
                let backend = Arc::clone(&ctx.backend);
                spawn_fetch(ctx, async move { FetchSlice::Workflows(backend.list_workflows().await) }, generation);
            }
            Cmd::FetchPerformance { generation } => {
                let backend = Arc::clone(&ctx.backend);
                spawn_fetch(ctx, async move { FetchSlice::Performance(backend.list_performance().await) }, generation);
            }
            Cmd::CancelDashboard => {
                debug!("cancelling dashboard reads");
                ctx.dashboard.cancel();
                ctx.dashboard = ctx.root.child_token();
            }
        }
    }
}

fn spawn_create(ctx: &CommandContext, request: CreateWorkflowRequest) {
    let backend = Arc::clone(&ctx.backend);
    let sender = ctx.sender.clone();
    let cancel = ctx.root.clone();
    spawn(async move {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = backend.create_workflow(&request) => result,
        };
        if sender.send(Msg::SubmissionFinished(result)).is_err() {
            debug!("event loop gone; dropping submission result");
        }
    });
}

fn spawn_fetch<F>(ctx: &CommandContext, fetch: F, generation: u64)
where
    F: Future<Output = FetchSlice> + Send + 'static,
{
    let sender = ctx.sender.clone();
    let cancel = ctx.dashboard.clone();
    spawn(async move {
        let slice = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            slice = fetch => slice,
        };
        if sender.send(Msg::Fetched { generation, slice }).is_err() {
            debug!(generation, "event loop gone; dropping dashboard result");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_becomes_one_command_per_read() {
        let commands = from_effects(vec![Effect::RefreshDashboard { generation: 3 }, Effect::CancelDashboard]);
        assert_eq!(
            commands,
            vec![
                Cmd::FetchWorkflows { generation: 3 },
                Cmd::FetchPerformance { generation: 3 },
                Cmd::CancelDashboard
            ]
        );
    }
}
