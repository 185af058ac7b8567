//! Main TUI application state.
//!
//! Handles:
//! - Input event handling
//! - Synchronous prediction through the loaded inference context

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::FsArtifactStore;
use crate::application::InferenceContext;
use crate::config::AppConfig;

use super::ui::{
    form::{render_patient_form, PatientFormState},
    render_disclaimer,
};

/// Main application state
pub struct App {
    /// Whether the app should quit
    should_quit: bool,

    /// Loaded pipeline, immutable for the life of the app
    context: InferenceContext,

    form: PatientFormState,
}

impl App {
    /// Create the application, loading artifacts from the configured directory.
    ///
    /// # Errors
    /// Returns error if the artifacts are missing or fail verification.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let store = FsArtifactStore::open(&config.artifact_dir);
        let context = InferenceContext::load(&store).with_context(|| {
            format!(
                "Failed to load model artifacts from {:?}. Run train_model first or set THYROCAST_ARTIFACT_DIR.",
                config.artifact_dir
            )
        })?;
        Ok(Self::with_context(context))
    }

    /// Create the application around an already loaded context.
    #[must_use]
    pub fn with_context(context: InferenceContext) -> Self {
        Self {
            should_quit: false,
            context,
            form: PatientFormState::default(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        self.form.clear_sensitive();
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(2)])
                    .split(f.area());

                render_patient_form(f, chunks[0], &self.form);
                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Up | KeyCode::BackTab => self.form.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form.next_field(),
            KeyCode::Left => self.form.prev_option(),
            KeyCode::Right => self.form.next_option(),
            KeyCode::Char('s') | KeyCode::Char('S') => self.form.load_sample_data(),
            KeyCode::Char(c) => self.form.input_char(c),
            KeyCode::Backspace => self.form.delete_char(),
            KeyCode::Delete => self.form.clear_field(),
            KeyCode::Enter if self.form.button_focused() => self.submit(),
            KeyCode::Enter => self.form.next_field(),
            _ => {}
        }
    }

    fn submit(&mut self) {
        let features = match self.form.to_patient_features() {
            Ok(features) => features,
            Err(e) => {
                self.form.result = None;
                self.form.error_message = Some(e);
                return;
            }
        };

        match self.context.predict_patient(&features) {
            Ok(prediction) => {
                self.form.error_message = None;
                self.form.result = Some(prediction);
            }
            Err(e) => {
                tracing::warn!("Prediction failed: {}", e);
                self.form.result = None;
                self.form.error_message = Some(e.to_string());
            }
        }
    }
}
