//! Application state and logic for the qflow TUI.
//!
//! `App` owns the editing session (draft, selection, edit buffers), the
//! submission controller and the dashboard state. Key presses and background
//! results arrive as [`Msg`] values; the resulting side effects are returned as
//! [`Effect`]s for `cmd` to execute, so every transition here is synchronous and
//! testable without a terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use qflow_api::ApiError;
use qflow_engine::{DashboardState, FetchSlice, SubmissionState, WorkflowDraft, WorkflowSubmissionController};
use qflow_types::{ConfigField, CreateWorkflowRequest, CreateWorkflowResponse, Task, TaskKind};
use serde_json::Value;
use tracing::debug;

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Editor,
    Dashboard,
}

/// What keys currently act on in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Browse,
    EditName {
        buffer: String,
    },
    EditField {
        field_index: usize,
        buffer: String,
    },
    /// A task was picked up at `source`; the selection marks the drop slot.
    Dragging {
        source: usize,
    },
}

#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    /// Poll interval elapsed.
    Tick,
    SubmissionFinished(Result<CreateWorkflowResponse, ApiError>),
    Fetched { generation: u64, slice: FetchSlice },
}

/// Side effects requested by a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SubmitWorkflow(CreateWorkflowRequest),
    RefreshDashboard { generation: u64 },
    /// The dashboard was left; in-flight reads must be dropped.
    CancelDashboard,
}

#[derive(Debug, Default)]
pub struct App {
    pub view: View,
    pub draft: WorkflowDraft,
    pub selected: usize,
    pub mode: EditorMode,
    pub submission: WorkflowSubmissionController,
    /// Local message not owned by the submission state (field errors, guard hits).
    pub notice: Option<String>,
    pub dashboard: DashboardState,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.draft.tasks.tasks().get(self.selected)
    }

    /// Fields of the selected task, in display order.
    pub fn selected_fields(&self) -> &'static [ConfigField] {
        self.selected_task()
            .map(|task| ConfigField::for_kind(task.kind()))
            .unwrap_or(&[])
    }

    /// Text shown in the editor's status line.
    pub fn status_line(&self) -> Option<String> {
        if let Some(notice) = &self.notice {
            return Some(notice.clone());
        }
        match self.submission.state() {
            SubmissionState::Submitting { name } => Some(format!("Submitting '{name}'...")),
            state => state.message().map(str::to_string),
        }
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Tick => {
                if self.view == View::Dashboard && !self.dashboard.is_loading() {
                    return self.refresh_dashboard();
                }
                Vec::new()
            }
            Msg::SubmissionFinished(result) => {
                match self.submission.finish(result) {
                    Some(Ok(submitted)) => {
                        self.draft = submitted.next_draft;
                        self.selected = 0;
                        self.mode = EditorMode::Browse;
                    }
                    Some(Err(_)) => {}
                    None => debug!("ignoring stale submission result"),
                }
                Vec::new()
            }
            Msg::Fetched { generation, slice } => {
                self.dashboard.apply(generation, slice);
                Vec::new()
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Vec::new();
        }
        match self.view {
            View::Editor => self.handle_editor_key(key),
            View::Dashboard => self.handle_dashboard_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Tab => {
                self.view = View::Editor;
                self.dashboard.abandon();
                vec![Effect::CancelDashboard]
            }
            KeyCode::Char('r') => self.refresh_dashboard(),
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn refresh_dashboard(&mut self) -> Vec<Effect> {
        let generation = self.dashboard.begin_refresh();
        vec![Effect::RefreshDashboard { generation }]
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match std::mem::take(&mut self.mode) {
            EditorMode::Browse => self.handle_browse_key(key),
            EditorMode::EditName { buffer } => {
                self.handle_name_key(key, buffer);
                Vec::new()
            }
            EditorMode::EditField { field_index, buffer } => {
                self.handle_field_key(key, field_index, buffer);
                Vec::new()
            }
            EditorMode::Dragging { source } => {
                self.handle_drag_key(key, source);
                Vec::new()
            }
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        self.notice = None;
        match key.code {
            KeyCode::Tab => {
                self.view = View::Dashboard;
                return self.refresh_dashboard();
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Char('n') => {
                self.mode = EditorMode::EditName {
                    buffer: self.draft.name.clone(),
                };
            }
            KeyCode::Char('c') => self.add_task(TaskKind::Classical),
            KeyCode::Char('u') => self.add_task(TaskKind::Quantum),
            KeyCode::Char('e') | KeyCode::Enter => {
                if !self.selected_fields().is_empty() {
                    self.mode = EditorMode::EditField {
                        field_index: 0,
                        buffer: self.field_text(0),
                    };
                }
            }
            KeyCode::Char(' ') => {
                if self.selected < self.draft.tasks.len() {
                    self.mode = EditorMode::Dragging { source: self.selected };
                }
            }
            KeyCode::Char('s') => return self.submit(),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
        Vec::new()
    }

    fn handle_name_key(&mut self, key: KeyEvent, mut buffer: String) {
        match key.code {
            KeyCode::Enter => self.apply_draft(self.draft.with_name(buffer)),
            KeyCode::Esc => {}
            KeyCode::Backspace => {
                buffer.pop();
                self.mode = EditorMode::EditName { buffer };
            }
            KeyCode::Char(ch) => {
                buffer.push(ch);
                self.mode = EditorMode::EditName { buffer };
            }
            _ => self.mode = EditorMode::EditName { buffer },
        }
    }

    fn handle_field_key(&mut self, key: KeyEvent, field_index: usize, mut buffer: String) {
        let fields = self.selected_fields();
        let (Some(task), Some(&field)) = (self.selected_task(), fields.get(field_index)) else {
            return;
        };
        match key.code {
            KeyCode::Tab => {
                let next = (field_index + 1) % fields.len();
                self.mode = EditorMode::EditField {
                    field_index: next,
                    buffer: self.field_text(next),
                };
            }
            KeyCode::Enter => {
                let id = task.id.clone();
                let updated = field
                    .parse_input(&buffer)
                    .and_then(|value| self.draft.update_config(&id, field, value));
                match updated {
                    Ok(draft) => self.apply_draft(draft),
                    Err(error) => {
                        self.notice = Some(error.to_string());
                        self.mode = EditorMode::EditField { field_index, buffer };
                    }
                }
            }
            KeyCode::Esc => self.notice = None,
            KeyCode::Backspace => {
                buffer.pop();
                self.mode = EditorMode::EditField { field_index, buffer };
            }
            KeyCode::Char(ch) => {
                buffer.push(ch);
                self.mode = EditorMode::EditField { field_index, buffer };
            }
            _ => self.mode = EditorMode::EditField { field_index, buffer },
        }
    }

    fn handle_drag_key(&mut self, key: KeyEvent, source: usize) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                self.mode = EditorMode::Dragging { source };
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                self.mode = EditorMode::Dragging { source };
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let destination = self.selected;
                self.apply_draft(self.draft.reorder(source, Some(destination)));
            }
            KeyCode::Esc => {
                self.draft = self.draft.reorder(source, None);
                self.selected = source;
            }
            _ => self.mode = EditorMode::Dragging { source },
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        match self.submission.begin(&self.draft) {
            Ok(request) => vec![Effect::SubmitWorkflow(request)],
            Err(error) => {
                // The empty-name case is carried by the submission state itself.
                if !matches!(self.submission.state(), SubmissionState::LocalInvalid { .. }) {
                    self.notice = Some(error.to_string());
                }
                Vec::new()
            }
        }
    }

    fn add_task(&mut self, kind: TaskKind) {
        self.apply_draft(self.draft.add_task(kind));
        self.selected = self.draft.tasks.len().saturating_sub(1);
    }

    fn apply_draft(&mut self, draft: WorkflowDraft) {
        self.draft = draft;
        self.mode = EditorMode::Browse;
        self.submission.note_edit();
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.draft.tasks.len();
        if len == 0 {
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    /// Current value of the selected task's `index`-th field as editable text.
    fn field_text(&self, index: usize) -> String {
        let (Some(task), Some(&field)) = (self.selected_task(), self.selected_fields().get(index)) else {
            return String::new();
        };
        match task.config.field(field) {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}
