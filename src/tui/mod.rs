//! TUI module: Terminal User Interface using Ratatui.
//!
//! A single form screen collects one patient's features and shows the
//! predicted recurrence label.

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::MedicalTheme;
pub use ui::form::PatientFormState;
