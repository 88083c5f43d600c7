//! UI rendering for the TUI application: the frame layout, one module per
//! view, and the runtime that drives them.

mod dashboard;
mod editor;
pub mod main;
pub mod runtime;
