use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use qflow_api::{QflowClient, WorkflowBackend};
use qflow_engine::{
    BackendTier, DEFAULT_DEPTH, DashboardState, NO_METRICS, NO_WORKFLOWS, RecordSummary, StatusCard, TaskCollection,
    WorkflowDraft, WorkflowSubmissionController, aggregate, estimate_draft_cost, parse_task_file, refresh,
    status_cards,
};
use qflow_util::{Settings, default_log_path};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // No subcommands => TUI
    let tui_mode = matches.subcommand_name().is_none();
    init_tracing(tui_mode);

    let settings = Settings::load()
        .context("failed to load settings")?
        .with_api_base(matches.get_one::<String>("api-base").cloned());
    let client = QflowClient::new(&settings.client_config())?;
    debug!(base_url = %client.base_url, "backend client ready");

    match matches.subcommand() {
        None => qflow_tui::run(Arc::new(client), settings.poll_interval()).await,
        Some(("workflow", sub)) => run_workflow_cmd(&client, sub).await,
        Some(("metrics", sub)) => run_metrics_cmd(&client, sub).await,
        Some(("dashboard", _)) => run_dashboard_cmd(&client).await,
        Some(("estimate", sub)) => run_estimate_cmd(sub),
        Some((other, _)) => bail!("unknown command '{other}'"),
    }
}

/// Install the global subscriber. In TUI mode the terminal belongs to the UI, so
/// logs go to a file without ANSI colors; if it cannot be opened, nothing is logged.
fn init_tracing(tui_mode: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tui_mode {
        if let Some(file) = open_log_file(&default_log_path()) {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

fn build_cli() -> Command {
    let tasks_arg = || {
        Arg::new("tasks")
            .long("tasks")
            .short('t')
            .action(ArgAction::Set)
            .help("Path to a JSON/YAML task list (defaults to one classical and one quantum task)")
    };

    let workflow = Command::new("workflow")
        .about("Create and list workflows")
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Submit a new workflow")
                .arg(Arg::new("name").long("name").short('n').required(true).action(ArgAction::Set))
                .arg(tasks_arg()),
        )
        .subcommand(Command::new("list").about("Show workflow status"));

    Command::new("qflow")
        .about("Compose, submit and monitor hybrid quantum/classical workflows")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("api-base")
                .long("api-base")
                .global(true)
                .action(ArgAction::Set)
                .help("Backend base URL (overrides settings and QFLOW_API_BASE)"),
        )
        .subcommand(workflow)
        .subcommand(
            Command::new("metrics")
                .about("Show per-task performance metrics")
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue).help("Print chart series and summaries as JSON")),
        )
        .subcommand(Command::new("dashboard").about("Fetch workflow status and metrics together, once"))
        .subcommand(
            Command::new("estimate")
                .about("Estimate the cost of a task list's quantum tasks")
                .arg(tasks_arg())
                .arg(
                    Arg::new("tier")
                        .long("tier")
                        .action(ArgAction::Set)
                        .value_parser(["simulator", "cloud"])
                        .default_value("simulator"),
                )
                .arg(
                    Arg::new("depth")
                        .long("depth")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(u64))
                        .help("Circuit depth assumed for every quantum task"),
                )
                .arg(
                    Arg::new("budget")
                        .long("budget")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(f64))
                        .help("Fail when the total exceeds this many USD"),
                ),
        )
}

fn load_tasks(matches: &ArgMatches) -> Result<TaskCollection> {
    match matches.get_one::<String>("tasks") {
        Some(path) => Ok(parse_task_file(path)?),
        None => Ok(TaskCollection::initial_template()),
    }
}

/// Cancelled on Ctrl+C so an in-flight request is abandoned cleanly.
fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

async fn run_workflow_cmd(client: &QflowClient, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("create", sub)) => {
            let name = sub.get_one::<String>("name").cloned().unwrap_or_default();
            let draft = WorkflowDraft::new(name, load_tasks(sub)?);
            let mut controller = WorkflowSubmissionController::new();
            let submitted = controller
                .submit(client, &draft, &ctrl_c_token())
                .await
                .map_err(|error| anyhow!("{error}"))?;
            println!("{}", submitted.message);
        }
        Some(("list", _)) => {
            let workflows = client
                .list_workflows()
                .await
                .map_err(|error| anyhow!("Failed to fetch data: {}", error.user_message()))?;
            let cards = status_cards(&workflows);
            if cards.is_empty() {
                println!("{NO_WORKFLOWS}");
            }
            for card in &cards {
                println!("{}", card_line(card));
            }
        }
        _ => bail!("expected 'create' or 'list'"),
    }
    Ok(())
}

async fn run_metrics_cmd(client: &QflowClient, matches: &ArgMatches) -> Result<()> {
    let records = client
        .list_performance()
        .await
        .map_err(|error| anyhow!("Failed to fetch data: {}", error.user_message()))?;
    let view = aggregate(&records);

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }
    if view.is_empty() {
        println!("{NO_METRICS}");
        return Ok(());
    }
    for line in view.summaries.iter().flat_map(summary_lines) {
        println!("{line}");
    }
    Ok(())
}

async fn run_dashboard_cmd(backend: &dyn WorkflowBackend) -> Result<()> {
    let state = fetch_dashboard(backend, &ctrl_c_token()).await?;
    for line in dashboard_report(&state) {
        println!("{line}");
    }
    match state.error {
        Some(error) => bail!(error),
        None => Ok(()),
    }
}

async fn fetch_dashboard(backend: &dyn WorkflowBackend, cancel: &CancellationToken) -> Result<DashboardState> {
    let mut state = DashboardState::new();
    if !refresh(backend, &mut state, cancel).await {
        bail!("dashboard refresh cancelled");
    }
    Ok(state)
}

/// Lines for whatever slices were committed; the fetch error is reported separately.
fn dashboard_report(state: &DashboardState) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(placeholder) = state.workflows_placeholder() {
        lines.push(placeholder.to_string());
    } else if let Some(cards) = &state.workflows {
        lines.extend(cards.iter().map(card_line));
    }
    if let Some(placeholder) = state.metrics_placeholder() {
        lines.push(placeholder.to_string());
    } else if let Some(view) = &state.metrics {
        lines.extend(view.summaries.iter().flat_map(summary_lines));
    }
    lines
}

fn card_line(card: &StatusCard) -> String {
    format!("{:<6} {:<32} {}", card.workflow_id, card.name, card.status)
}

fn summary_lines(summary: &RecordSummary) -> Vec<String> {
    let mut lines = vec![summary.heading.clone()];
    lines.extend(
        summary
            .lines
            .iter()
            .map(|line| format!("  {:<14} {}", format!("{}:", line.label), line.value)),
    );
    lines
}

fn run_estimate_cmd(matches: &ArgMatches) -> Result<()> {
    let tasks = load_tasks(matches)?;
    let tier = matches
        .get_one::<String>("tier")
        .map(|raw| raw.parse::<BackendTier>())
        .transpose()
        .map_err(|error| anyhow!(error))?
        .unwrap_or_default();
    let depth = matches.get_one::<u64>("depth").copied().unwrap_or(DEFAULT_DEPTH);

    let estimate = estimate_draft_cost(tasks.tasks(), tier, depth);
    if estimate.breakdown.is_empty() {
        println!("No quantum tasks to price");
    }
    for item in &estimate.breakdown {
        println!("{:<10} {:<10} {:<10} ${:.4}", item.task_id.as_str(), item.backend.as_str(), item.tier.as_str(), item.cost);
    }
    println!("Total: ${:.4}", estimate.total);

    if let Some(&budget) = matches.get_one::<f64>("budget")
        && estimate.exceeds_budget(budget)
    {
        warn!(budget, total = estimate.total, "estimate over budget");
        bail!("Estimated cost ${:.4} exceeds budget ${:.4}", estimate.total, budget);
    }
    Ok(())
}
