//! Add-patient form shown inside the "Add New Patient" dialog.

use crate::models::NewPatient;
use crate::tui::Frame;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{prelude::*, widgets::*};

/// Form field, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Age,
    Contact,
    Email,
    Address,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Age,
        Field::Contact,
        Field::Email,
        Field::Address,
    ];

    fn label(self) -> &'static str {
        match self {
            Field::Name => " Name* ",
            Field::Age => " Age* ",
            Field::Contact => " Contact* ",
            Field::Email => " Email (optional) ",
            Field::Address => " Address (optional) ",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Field::Name => "Full name",
            Field::Age => "Age",
            Field::Contact => "Phone number",
            Field::Email => "Email (optional)",
            Field::Address => "Address (optional)",
        }
    }
}

const SUBMIT_BUTTON: usize = Field::ALL.len();

/// Raw form input. Every field is text; age is parsed on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientDraft {
    pub name: String,
    pub age: String,
    pub contact: String,
    pub email: String,
    pub address: String,
}

impl PatientDraft {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Age => &self.age,
            Field::Contact => &self.contact,
            Field::Email => &self.email,
            Field::Address => &self.address,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Age => &mut self.age,
            Field::Contact => &mut self.contact,
            Field::Email => &mut self.email,
            Field::Address => &mut self.address,
        }
    }

    /// Name, age and contact are all present.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.age.is_empty() && !self.contact.is_empty()
    }

    /// An age that does not parse is carried as `None`.
    pub fn to_new_patient(&self) -> NewPatient {
        NewPatient {
            name: self.name.clone(),
            age: self.age.trim().parse().ok(),
            contact: self.contact.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
        }
    }
}

pub struct AddPatientForm {
    draft: PatientDraft,
    focus_index: usize,
}

impl Default for AddPatientForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AddPatientForm {
    pub fn new() -> Self {
        Self {
            draft: PatientDraft::default(),
            focus_index: 0,
        }
    }

    pub fn draft(&self) -> &PatientDraft {
        &self.draft
    }

    pub fn focused_field(&self) -> Option<Field> {
        Field::ALL.get(self.focus_index).copied()
    }

    /// Replaces one field, leaving the rest alone.
    #[cfg(test)]
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        *self.draft.field_mut(field) = value.into();
    }

    /// Validates and, on success, resets the form and hands back the new
    /// patient. An incomplete draft is kept as is and nothing is reported.
    pub fn submit(&mut self) -> Option<NewPatient> {
        if !self.draft.is_complete() {
            return None;
        }
        let patient = self.draft.to_new_patient();
        self.draft = PatientDraft::default();
        self.focus_index = 0;
        Some(patient)
    }

    fn focus_next(&mut self) {
        self.focus_index = (self.focus_index + 1) % (SUBMIT_BUTTON + 1);
    }

    fn focus_previous(&mut self) {
        self.focus_index = (self.focus_index + SUBMIT_BUTTON) % (SUBMIT_BUTTON + 1);
    }

    /// Enter anywhere submits, like a browser form.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<NewPatient> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_previous(),
            KeyCode::Enter => return self.submit(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(field) = self.focused_field() {
                    self.draft.field_mut(field).push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.focused_field() {
                    self.draft.field_mut(field).pop();
                }
            }
            _ => {}
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut constraints = vec![Constraint::Length(3); Field::ALL.len()];
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Min(1));

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .horizontal_margin(1)
            .split(area);

        for (i, field) in Field::ALL.iter().enumerate() {
            let value = self.draft.field(*field);
            let (text, text_style) = if value.is_empty() {
                (field.placeholder(), Style::default().fg(Color::Rgb(110, 110, 140)))
            } else {
                (value, Style::default().fg(Color::Rgb(220, 220, 240)))
            };

            let input = Paragraph::new(text)
                .style(text_style.bg(Color::Rgb(26, 26, 36)))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .title(Span::styled(
                            field.label(),
                            Style::default().fg(Color::Rgb(230, 230, 250)),
                        ))
                        .border_style(if self.focus_index == i {
                            Style::default().fg(Color::Rgb(250, 250, 110))
                        } else {
                            Style::default().fg(Color::Rgb(140, 140, 200))
                        })
                        .style(Style::default().bg(Color::Rgb(26, 26, 36))),
                );
            frame.render_widget(input, layout[i]);
        }

        let submit_text = if self.focus_index == SUBMIT_BUTTON {
            "► Add Patient ◄"
        } else {
            "  Add Patient  "
        };
        let submit_style = if self.focus_index == SUBMIT_BUTTON {
            Style::default()
                .fg(Color::Rgb(140, 219, 140))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Rgb(180, 180, 200))
        };
        frame.render_widget(
            Paragraph::new(submit_text)
                .style(submit_style)
                .alignment(Alignment::Center),
            layout[Field::ALL.len()],
        );

        frame.render_widget(
            Paragraph::new("Tab/↑↓: Switch Field | Enter: Add | Esc: Cancel")
                .style(Style::default().fg(Color::Rgb(140, 140, 170)))
                .alignment(Alignment::Center),
            layout[Field::ALL.len() + 1],
        );
    }
}
