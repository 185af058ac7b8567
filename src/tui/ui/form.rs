//! Patient feature form: Age input, 15 selectors and the predict button.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::schema::{AGE_RANGE, CATEGORICAL_COLUMNS};
use crate::domain::{PatientFeatures, Prediction};
use crate::tui::styles::MedicalTheme;

/// Display labels for the categorical columns, in schema order.
const CHOICE_LABELS: [&str; 15] = [
    "Gender",
    "Smoking",
    "History of Smoking",
    "History of Radiotherapy",
    "Thyroid Function",
    "Physical Exam",
    "Adenopathy",
    "Pathology",
    "Focality",
    "Risk",
    "Tumour Size",
    "Lymph Nodes",
    "Metastasis",
    "Stage",
    "Response",
];

pub const BUTTON_LABEL: &str = "Predict Thyroid Cancer Recurrence";

/// How a field takes input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    /// Free digits, parsed on submit
    Number { value: String },
    /// One of a fixed list, cycled with ←/→
    Choice {
        options: &'static [&'static str],
        index: usize,
    },
}

/// Form field definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub input: FieldInput,
}

impl FormField {
    fn display_value(&self) -> &str {
        match &self.input {
            FieldInput::Number { value } => value,
            FieldInput::Choice { options, index } => options.get(*index).copied().unwrap_or(""),
        }
    }
}

/// Form state. `focus == fields.len()` means the button has focus.
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error_message: Option<String>,
    pub result: Option<Prediction>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        let mut fields = Vec::with_capacity(1 + CATEGORICAL_COLUMNS.len());
        fields.push(FormField {
            label: "Age",
            input: FieldInput::Number {
                value: AGE_RANGE.start().to_string(),
            },
        });
        for (label, column) in CHOICE_LABELS.iter().zip(CATEGORICAL_COLUMNS.iter()) {
            fields.push(FormField {
                label: *label,
                input: FieldInput::Choice {
                    options: column.categories,
                    index: 0,
                },
            });
        }

        Self {
            fields,
            focus: 0,
            error_message: None,
            result: None,
        }
    }
}

impl PatientFormState {
    fn stops(&self) -> usize {
        self.fields.len() + 1
    }

    #[must_use]
    pub fn button_focused(&self) -> bool {
        self.focus == self.fields.len()
    }

    /// Move to the next field (wraps through the button)
    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.stops();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        self.focus = (self.focus + self.stops() - 1) % self.stops();
    }

    /// Cycle the focused selector forward
    pub fn next_option(&mut self) {
        self.cycle_option(1);
    }

    /// Cycle the focused selector backward
    pub fn prev_option(&mut self) {
        self.cycle_option(-1);
    }

    fn cycle_option(&mut self, step: isize) {
        if let Some(FormField {
            input: FieldInput::Choice { options, index },
            ..
        }) = self.fields.get_mut(self.focus)
        {
            let len = options.len() as isize;
            *index = (*index as isize + step).rem_euclid(len) as usize;
            self.error_message = None;
        }
    }

    /// Add a digit to the focused numeric field
    pub fn input_char(&mut self, c: char) {
        if let Some(FormField {
            input: FieldInput::Number { value },
            ..
        }) = self.fields.get_mut(self.focus)
        {
            if c.is_ascii_digit() && value.len() < 3 {
                value.push(c);
                self.error_message = None;
            }
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let Some(FormField {
            input: FieldInput::Number { value },
            ..
        }) = self.fields.get_mut(self.focus)
        {
            value.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        match self.fields.get_mut(self.focus).map(|f| &mut f.input) {
            Some(FieldInput::Number { value }) => value.clear(),
            Some(FieldInput::Choice { index, .. }) => *index = 0,
            None => {}
        }
    }

    /// Wipe all field buffers from memory and reset selections.
    ///
    /// Called when the application exits so plaintext inputs do not outlive
    /// the session.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            match &mut field.input {
                FieldInput::Number { value } => value.zeroize(),
                FieldInput::Choice { index, .. } => index.zeroize(),
            }
        }
        self.error_message = None;
        self.focus = 0;
    }

    /// Parse and convert to PatientFeatures
    ///
    /// # Errors
    /// Returns a message if Age is not a number in range.
    pub fn to_patient_features(&self) -> Result<PatientFeatures, String> {
        let mut age = None;
        let mut categories = Vec::with_capacity(CATEGORICAL_COLUMNS.len());

        for field in &self.fields {
            match &field.input {
                FieldInput::Number { value } => {
                    let parsed: u32 = value
                        .parse()
                        .map_err(|_| format!("{}: Invalid number", field.label))?;
                    if !AGE_RANGE.contains(&parsed) {
                        return Err(format!(
                            "{}: Value must be between {} and {}",
                            field.label,
                            AGE_RANGE.start(),
                            AGE_RANGE.end()
                        ));
                    }
                    age = Some(parsed);
                }
                FieldInput::Choice { .. } => categories.push(field.display_value()),
            }
        }

        let age = age.ok_or_else(|| "Age: missing".to_string())?;
        PatientFeatures::from_values(age, &categories)
    }

    /// Load a sample patient (intermediate risk, nodal disease)
    pub fn load_sample_data(&mut self) {
        let sample: [&str; 16] = [
            "51",
            "M",
            "Yes",
            "No",
            "No",
            "Euthyroid",
            "Multinodular goiter",
            "Right",
            "Papillary",
            "Multi-Focal",
            "Intermediate",
            "T3a",
            "N1b",
            "M0",
            "II",
            "Structural Incomplete",
        ];
        for (field, value) in self.fields.iter_mut().zip(sample) {
            match &mut field.input {
                FieldInput::Number { value: v } => *v = value.to_string(),
                FieldInput::Choice { options, index } => {
                    *index = options.iter().position(|o| *o == value).unwrap_or(0);
                }
            }
        }
        self.error_message = None;
        self.result = None;
    }
}

/// Render the patient feature form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Fields
            Constraint::Length(3), // Button
            Constraint::Length(3), // Result
            Constraint::Length(2), // Key hints
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_button(f, chunks[2], state);
    render_result(f, chunks[3], state);
    render_key_hints(f, chunks[4]);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Predicting Thyroid Cancer Recurrence", MedicalTheme::title()),
        Span::styled(
            " │ Bayesian classifier trained on differentiated thyroid cancer follow-up",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;
    render_field_column(f, columns[0], &state.fields[..mid], 0, state.focus);
    render_field_column(f, columns[1], &state.fields[mid..], mid, state.focus);
}

fn render_field_column(f: &mut Frame, area: Rect, fields: &[FormField], offset: usize, focus: usize) {
    let rows: Vec<Line> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = offset + i == focus;
            let label_style = if focused {
                MedicalTheme::focused()
            } else {
                MedicalTheme::text_secondary()
            };
            let value = match &field.input {
                FieldInput::Number { value } if value.is_empty() => {
                    Span::styled("0-110", MedicalTheme::text_muted())
                }
                FieldInput::Number { value } => Span::styled(value.clone(), MedicalTheme::text()),
                FieldInput::Choice { .. } if focused => {
                    Span::styled(format!("◀ {} ▶", field.display_value()), MedicalTheme::text())
                }
                FieldInput::Choice { .. } => {
                    Span::styled(field.display_value().to_string(), MedicalTheme::text())
                }
            };
            Line::from(vec![
                Span::styled(if focused { "› " } else { "  " }, MedicalTheme::focused()),
                Span::styled(format!("{:<24}", field.label), label_style),
                value,
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(rows), area);
}

fn render_button(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let (style, border) = if state.button_focused() {
        (MedicalTheme::selected(), MedicalTheme::border_focused())
    } else {
        (MedicalTheme::text(), MedicalTheme::border())
    };
    let button = Paragraph::new(Line::from(Span::styled(format!(" {BUTTON_LABEL} "), style)))
        .block(Block::default().borders(Borders::ALL).border_style(border));
    f.render_widget(button, area);
}

fn render_result(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let line = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else if let Some(prediction) = &state.result {
        Line::from(vec![
            Span::styled("Recurred: ", MedicalTheme::text_secondary()),
            Span::styled(
                prediction.to_string(),
                MedicalTheme::recurrence(prediction.indicates_recurrence()),
            ),
        ])
    } else {
        Line::from(Span::styled("No prediction yet", MedicalTheme::text_muted()))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    f.render_widget(
        Paragraph::new(line).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_key_hints(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled("[↑↓/Tab] ", MedicalTheme::key_hint()),
        Span::styled("Navigate ", MedicalTheme::key_desc()),
        Span::styled("[←→] ", MedicalTheme::key_hint()),
        Span::styled("Change ", MedicalTheme::key_desc()),
        Span::styled("[Enter] ", MedicalTheme::key_hint()),
        Span::styled("Predict ", MedicalTheme::key_desc()),
        Span::styled("[S] ", MedicalTheme::key_hint()),
        Span::styled("Sample ", MedicalTheme::key_desc()),
        Span::styled("[Esc/q] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]);
    f.render_widget(Paragraph::new(hints), area);
}
