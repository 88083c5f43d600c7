//! Runtime: event loop and terminal lifecycle for the TUI.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Drive a single event loop that merges terminal input, results sent back by
//!   background commands, and the dashboard poll tick.
//! - Hand every `Msg` to `App::update` and run the returned `Effect`s through
//!   `cmd`.
//! - Cancel all in-flight requests on exit so late results are dropped.
//!
//! Input comes from a dedicated OS thread that blocks on
//! `crossterm::event::read()` and forwards events over a channel, so the async
//! loop never blocks on the terminal.
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use qflow_api::WorkflowBackend;
use ratatui::{Terminal, prelude::*};
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::app::{App, Msg};
use crate::cmd::{self, CommandContext};
use crate::ui::main::draw;

type Term = Terminal<CrosstermBackend<std::io::Stdout>>;

/// Spawn the input thread; it exits when the receiver is dropped or reading fails.
fn spawn_input_thread() -> mpsc::UnboundedReceiver<Event> {
    let (sender, receiver) = mpsc::unbounded_channel();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event) => {
                    if sender.send(event).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!("Failed to read event: {}", error);
                    break;
                }
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Entry point for the TUI runtime: sets up the terminal, runs the event loop,
/// and restores the terminal even if the loop fails.
pub async fn run_app(backend: Arc<dyn WorkflowBackend>, poll_interval: Duration) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, backend, poll_interval).await;
    cleanup_terminal(&mut terminal)?;
    result
}

async fn event_loop(terminal: &mut Term, backend: Arc<dyn WorkflowBackend>, poll_interval: Duration) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let (msg_sender, mut msg_receiver) = mpsc::unbounded_channel::<Msg>();
    let mut ctx = CommandContext::new(backend, msg_sender);
    let mut app = App::new();

    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(?poll_interval, "tui started");
    terminal.draw(|frame| draw(frame, &app))?;

    loop {
        let effects = tokio::select! {
            maybe_event = input_receiver.recv() => match maybe_event {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => app.update(Msg::Key(key)),
                Some(_) => Vec::new(),
                // Input channel closed; shut down cleanly.
                None => break,
            },
            Some(msg) = msg_receiver.recv() => app.update(msg),
            _ = ticker.tick() => app.update(Msg::Tick),
            _ = signal::ctrl_c() => break,
        };

        cmd::run_from_effects(&mut ctx, effects);
        if app.should_quit {
            break;
        }
        terminal.draw(|frame| draw(frame, &app))?;
    }

    ctx.shutdown();
    info!("tui stopped");
    Ok(())
}
