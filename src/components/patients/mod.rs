//! Patient directory view.
//!
//! Owns the canonical patient list for as long as the view is mounted: it
//! starts the one fetch, keeps the search result current, and drives the
//! details and add dialogs.

use crate::api::{spawn_fetch, FetchResult, PatientSource, PendingFetch};
use crate::app::View;
use crate::components::modal::{Modal, ModalClick};
use crate::components::Component;
use crate::events::KeyListeners;
use crate::models::{NewPatient, PatientRecord};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;
use ratatui::{prelude::*, widgets::*};
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod card;
pub mod form;
pub mod search;

use self::card::{age_text, render_card, CARD_HEIGHT};
use self::form::AddPatientForm;
use self::search::SearchView;

// Constants for focus indices
const SEARCH_INPUT: usize = 0;
const PATIENT_GRID: usize = 1;
const ADD_BUTTON: usize = 2;
const FOCUS_TARGETS: usize = 3;

const CARD_MIN_WIDTH: u16 = 30;

/// Progress of the initial fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Where the view is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Loading,
    Browsing,
    /// Details dialog open for this id.
    Viewing(u64),
    Adding,
    Failed,
}

/// Id for a locally added record: one past the largest id, or 1. `None`
/// once the largest id is `u64::MAX`.
pub fn next_id(patients: &[PatientRecord]) -> Option<u64> {
    match patients.iter().map(|p| p.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

pub struct PatientsView {
    source: Arc<dyn PatientSource>,
    pending: Option<PendingFetch>,
    activated: bool,
    status: LoadStatus,
    patients: Vec<PatientRecord>,
    search: SearchView,
    /// Position of the highlighted card within the search result.
    cursor: usize,
    focus_index: usize,
    selected: Option<PatientRecord>,
    details_modal: Modal,
    add_modal: Modal,
    add_form: Option<AddPatientForm>,
    columns: Cell<usize>,
    card_areas: RefCell<Vec<(Rect, usize)>>,
    search_area: Cell<Option<Rect>>,
    add_button_area: Cell<Option<Rect>>,
}

impl PatientsView {
    pub fn new(source: Arc<dyn PatientSource>, listeners: KeyListeners) -> Self {
        let mut search = SearchView::default();
        search.refresh(&[]);

        Self {
            source,
            pending: None,
            activated: false,
            status: LoadStatus::Idle,
            patients: Vec::new(),
            search,
            cursor: 0,
            focus_index: SEARCH_INPUT,
            selected: None,
            details_modal: Modal::new("Patient Details", listeners.clone()).size(60, 14),
            add_modal: Modal::new("Add New Patient", listeners).size(60, 23),
            add_form: None,
            columns: Cell::new(3),
            card_areas: RefCell::new(Vec::new()),
            search_area: Cell::new(None),
            add_button_area: Cell::new(None),
        }
    }

    /// Starts the fetch. Only the first call per view does anything.
    pub fn activate(&mut self) {
        if self.activated {
            return;
        }
        self.activated = true;
        self.status = LoadStatus::Loading;
        self.pending = Some(spawn_fetch(Arc::clone(&self.source)));
    }

    /// Picks up the fetch result if it has arrived.
    pub fn poll_fetch(&mut self) {
        let result = match &self.pending {
            Some(pending) => pending.poll(),
            None => return,
        };
        if let Some(result) = result {
            self.pending = None;
            self.apply_fetch(result);
        }
    }

    fn apply_fetch(&mut self, result: FetchResult) {
        match result {
            Ok(records) => {
                info!(count = records.len(), "patient list loaded");
                self.patients = records;
                self.search.invalidate();
                self.refresh_search();
                self.status = LoadStatus::Loaded;
            }
            Err(e) => {
                error!(error = %e, "patient list unavailable");
                self.status = LoadStatus::Failed(e.to_string());
            }
        }
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn phase(&self) -> Phase {
        if let Some(selected) = &self.selected {
            return Phase::Viewing(selected.id);
        }
        if self.add_modal.is_open() {
            return Phase::Adding;
        }
        match self.status {
            LoadStatus::Idle => Phase::Initial,
            LoadStatus::Loading => Phase::Loading,
            LoadStatus::Loaded => Phase::Browsing,
            LoadStatus::Failed(_) => Phase::Failed,
        }
    }

    /// The canonical list, newest local additions first.
    pub fn patients(&self) -> &[PatientRecord] {
        &self.patients
    }

    /// The list as narrowed by the current search.
    pub fn visible(&self) -> Vec<&PatientRecord> {
        self.search
            .indices()
            .iter()
            .filter_map(|&i| self.patients.get(i))
            .collect()
    }

    pub fn query(&self) -> &str {
        self.search.query()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.search.set_query(query);
        self.refresh_search();
    }

    fn refresh_search(&mut self) {
        self.search.refresh(&self.patients);
        let visible = self.search.indices().len();
        self.cursor = self.cursor.min(visible.saturating_sub(1));
    }

    pub fn selected(&self) -> Option<&PatientRecord> {
        self.selected.as_ref()
    }

    pub fn add_form(&self) -> Option<&AddPatientForm> {
        self.add_form.as_ref()
    }

    /// Opens the details dialog for the card at `position` in the search
    /// result.
    pub fn view_details(&mut self, position: usize) {
        if !self.grid_shown() {
            return;
        }
        let record = self
            .search
            .indices()
            .get(position)
            .and_then(|&i| self.patients.get(i))
            .cloned();
        if let Some(record) = record {
            self.cursor = position;
            self.selected = Some(record);
            self.details_modal.open();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.details_modal.close();
    }

    pub fn open_add_dialog(&mut self) {
        if self.add_form.is_none() {
            self.add_form = Some(AddPatientForm::new());
        }
        self.add_modal.open();
    }

    /// Closes the add dialog, discarding any draft.
    pub fn close_add_dialog(&mut self) {
        self.add_form = None;
        self.add_modal.close();
    }

    /// Prepends `patient` with a fresh id and closes the add dialog.
    /// Returns `None`, adding nothing, when no id is left to assign.
    pub fn add_patient(&mut self, patient: NewPatient) -> Option<u64> {
        let Some(id) = next_id(&self.patients) else {
            warn!(name = %patient.name, "no patient id left to assign; record not added");
            return None;
        };
        let record = patient.with_id(id);
        info!(id, name = %record.name, "patient added");

        self.patients.insert(0, record);
        self.search.invalidate();
        self.refresh_search();
        self.close_add_dialog();
        Some(id)
    }

    /// Submits the add form. Returns the new id, or `None` when the draft
    /// was rejected or no form is open.
    #[cfg(test)]
    pub fn submit_add_form(&mut self) -> Option<u64> {
        let patient = self.add_form.as_mut()?.submit()?;
        self.add_patient(patient)
    }

    /// Cards are only on screen, and only selectable, once the list loaded.
    fn grid_shown(&self) -> bool {
        self.status == LoadStatus::Loaded
    }

    /// True while either dialog is up.
    pub fn has_open_dialog(&self) -> bool {
        self.details_modal.is_open() || self.add_modal.is_open()
    }

    fn cycle_focus(&mut self, step: usize) {
        self.focus_index = (self.focus_index + step) % FOCUS_TARGETS;
        if self.focus_index == PATIENT_GRID && !self.grid_shown() {
            self.focus_index = (self.focus_index + step) % FOCUS_TARGETS;
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.search.indices().len();
        if len == 0 {
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    fn handle_browse_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => self.cycle_focus(1),
            KeyCode::BackTab => self.cycle_focus(FOCUS_TARGETS - 1),
            _ => match self.focus_index {
                SEARCH_INPUT => match key.code {
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.search.push(c);
                        self.refresh_search();
                    }
                    KeyCode::Backspace => {
                        self.search.pop();
                        self.refresh_search();
                    }
                    KeyCode::Down | KeyCode::Enter if self.grid_shown() => {
                        self.focus_index = PATIENT_GRID
                    }
                    _ => {}
                },
                PATIENT_GRID => {
                    let columns = self.columns.get().max(1) as isize;
                    match key.code {
                        KeyCode::Left => self.move_cursor(-1),
                        KeyCode::Right => self.move_cursor(1),
                        KeyCode::Up => {
                            if (self.cursor as isize) < columns {
                                self.focus_index = SEARCH_INPUT;
                            } else {
                                self.move_cursor(-columns);
                            }
                        }
                        KeyCode::Down => self.move_cursor(columns),
                        KeyCode::Enter => self.view_details(self.cursor),
                        _ => {}
                    }
                }
                ADD_BUTTON => {
                    if key.code == KeyCode::Enter {
                        self.open_add_dialog();
                    }
                }
                _ => {}
            },
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(14),
                Constraint::Min(20),
                Constraint::Length(22),
            ])
            .spacing(1)
            .split(area);

        let title = Paragraph::new("Patients")
            .style(
                Style::default()
                    .fg(Color::Rgb(230, 230, 250))
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().padding(Padding::new(1, 0, 1, 0)));
        frame.render_widget(title, layout[0]);

        let (search_text, search_style) = if self.search.query().is_empty() {
            (
                "Search by name...".to_string(),
                Style::default().fg(Color::Rgb(110, 110, 140)),
            )
        } else {
            (
                self.search.query().to_string(),
                Style::default().fg(Color::Rgb(220, 220, 240)),
            )
        };
        let search_input = Paragraph::new(search_text).style(search_style).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Search ")
                .border_style(if self.focus_index == SEARCH_INPUT {
                    Style::default().fg(Color::Rgb(250, 250, 110))
                } else {
                    Style::default().fg(Color::Rgb(140, 140, 200))
                })
                .style(Style::default().bg(Color::Rgb(26, 26, 36))),
        );
        frame.render_widget(search_input, layout[1]);
        self.search_area.set(Some(layout[1]));

        let add_text = if self.focus_index == ADD_BUTTON {
            "► Add New Patient ◄"
        } else {
            "Add New Patient"
        };
        let add_button = Paragraph::new(add_text)
            .style(
                Style::default()
                    .fg(Color::Rgb(140, 219, 140))
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(if self.focus_index == ADD_BUTTON {
                        Style::default().fg(Color::Rgb(250, 250, 110))
                    } else {
                        Style::default().fg(Color::Rgb(100, 100, 140))
                    }),
            );
        frame.render_widget(add_button, layout[2]);
        self.add_button_area.set(Some(layout[2]));
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let mut card_areas = self.card_areas.borrow_mut();
        card_areas.clear();

        let visible = self.visible();
        if visible.is_empty() {
            let empty = Paragraph::new("No patients match your search.")
                .style(Style::default().fg(Color::Rgb(140, 140, 170)))
                .alignment(Alignment::Center)
                .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
            frame.render_widget(empty, area);
            return;
        }

        let columns = usize::from((area.width / CARD_MIN_WIDTH).max(1));
        self.columns.set(columns);

        let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
        let cursor_row = self.cursor / columns;
        let first_row = (cursor_row + 1).saturating_sub(visible_rows);

        let column_width = area.width / columns as u16;
        let highlight = self.focus_index == PATIENT_GRID;

        for (position, patient) in visible.iter().enumerate().skip(first_row * columns) {
            let row = position / columns - first_row;
            if row >= visible_rows {
                break;
            }
            let column = position % columns;
            let card_area = Rect::new(
                area.x + column as u16 * column_width,
                area.y + row as u16 * CARD_HEIGHT,
                column_width,
                CARD_HEIGHT,
            );
            render_card(frame, card_area, patient, highlight && position == self.cursor);
            card_areas.push((card_area, position));
        }
    }

    fn render_details(&self, frame: &mut Frame, area: Rect) {
        let Some(patient) = &self.selected else {
            return;
        };

        let label = Style::default()
            .fg(Color::Rgb(180, 190, 254))
            .add_modifier(Modifier::BOLD);
        let value = Style::default().fg(Color::Rgb(220, 220, 240));
        let row = |name: &'static str, text: String| {
            Line::from(vec![Span::styled(name, label), Span::styled(text, value)])
        };

        let mut lines = vec![
            row("Name: ", patient.name.clone()),
            row("Age: ", age_text(patient.age)),
            row("Contact: ", patient.contact.clone()),
            row("Email: ", patient.email.clone()),
            row("Address: ", patient.address.clone()),
        ];
        if !patient.company.is_empty() {
            lines.push(row("Company: ", patient.company.clone()));
        }
        lines.push(Line::default());
        lines.push(
            Line::from(Span::styled(
                "► Close ◄",
                Style::default()
                    .fg(Color::Rgb(129, 199, 245))
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
        );

        let details = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().padding(Padding::new(2, 2, 1, 0)));
        frame.render_widget(details, area);
    }
}

impl Component for PatientsView {
    fn handle_input(&mut self, key: KeyEvent) -> Result<Option<View>> {
        // Esc reaches open dialogs through their listener subscriptions.
        if self.details_modal.poll_close() {
            self.clear_selection();
            return Ok(None);
        }
        if self.add_modal.poll_close() {
            self.close_add_dialog();
            return Ok(None);
        }

        if self.details_modal.is_open() {
            if key.code == KeyCode::Enter {
                self.clear_selection();
            }
            return Ok(None);
        }

        if self.add_modal.is_open() {
            let submitted = self.add_form.as_mut().and_then(|form| form.handle_input(key));
            if let Some(patient) = submitted {
                self.add_patient(patient);
            }
            return Ok(None);
        }

        self.handle_browse_input(key);
        Ok(None)
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Result<Option<View>> {
        if self.details_modal.is_open() {
            if self.details_modal.handle_mouse(event) == ModalClick::Close {
                self.clear_selection();
            }
            return Ok(None);
        }
        if self.add_modal.is_open() {
            if self.add_modal.handle_mouse(event) == ModalClick::Close {
                self.close_add_dialog();
            }
            return Ok(None);
        }

        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(None);
        }
        let position = Position::new(event.column, event.row);

        if self.add_button_area.get().is_some_and(|a| a.contains(position)) {
            self.focus_index = ADD_BUTTON;
            self.open_add_dialog();
            return Ok(None);
        }
        if self.search_area.get().is_some_and(|a| a.contains(position)) {
            self.focus_index = SEARCH_INPUT;
            return Ok(None);
        }

        let hit = self
            .card_areas
            .borrow()
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, card)| *card);
        if let Some(card) = hit {
            self.focus_index = PATIENT_GRID;
            self.view_details(card);
        }
        Ok(None)
    }

    fn on_tick(&mut self) {
        self.poll_fetch();
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(3),    // Status or grid
                Constraint::Length(1), // Help
            ])
            .horizontal_margin(1)
            .split(area);

        self.render_header(frame, layout[0]);

        self.card_areas.borrow_mut().clear();
        match &self.status {
            LoadStatus::Loading => {
                let loading = Paragraph::new("Loading patients...")
                    .style(Style::default().fg(Color::Rgb(180, 190, 254)))
                    .alignment(Alignment::Center)
                    .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
                frame.render_widget(loading, layout[1]);
            }
            LoadStatus::Failed(message) => {
                let failed = Paragraph::new(format!("Error: {message}"))
                    .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                    .alignment(Alignment::Center)
                    .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
                frame.render_widget(failed, layout[1]);
            }
            LoadStatus::Idle | LoadStatus::Loaded => self.render_grid(frame, layout[1]),
        }

        let help_text = match self.phase() {
            Phase::Viewing(_) => "Enter: Close | Esc: Close Dialog",
            Phase::Adding => "Tab/↑↓: Field | Enter: Submit | Esc: Cancel",
            _ if self.grid_shown() => "Tab: Focus | ↑↓←→: Navigate | Enter: View Details / Add",
            _ => "Tab: Focus | Enter: Add",
        };
        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::Rgb(140, 140, 170)))
            .alignment(Alignment::Center);
        frame.render_widget(help, layout[2]);

        self.details_modal
            .render(frame, |frame, inner| self.render_details(frame, inner));
        self.add_modal.render(frame, |frame, inner| {
            if let Some(form) = &self.add_form {
                form.render(frame, inner);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::mpsc::{self, Receiver};
    use std::sync::Mutex;
    use std::thread;
    use std::time::{Duration, Instant};

    fn patient(id: u64, name: &str) -> PatientRecord {
        PatientRecord {
            id,
            name: name.to_string(),
            age: Some(30),
            contact: format!("555-{id}"),
            email: format!("{}@example.com", name.to_lowercase()),
            address: "Elm, Foo".into(),
            company: String::new(),
        }
    }

    fn draft(name: &str) -> NewPatient {
        NewPatient {
            name: name.into(),
            age: Some(52),
            contact: "999".into(),
            email: String::new(),
            address: String::new(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    struct Canned {
        records: Vec<PatientRecord>,
        status: Option<u16>,
    }

    impl PatientSource for Canned {
        fn fetch(&self) -> FetchResult {
            match self.status {
                Some(code) => Err(FetchError::Status(code)),
                None => Ok(self.records.clone()),
            }
        }
    }

    /// Holds the fetch until the test sends on the gate.
    struct Gated {
        gate: Mutex<Receiver<()>>,
    }

    impl PatientSource for Gated {
        fn fetch(&self) -> FetchResult {
            let _ = self.gate.lock().unwrap().recv();
            Ok(vec![patient(1, "Late")])
        }
    }

    fn view_with(records: Vec<PatientRecord>) -> (PatientsView, KeyListeners) {
        let listeners = KeyListeners::new();
        let source = Arc::new(Canned {
            records: Vec::new(),
            status: None,
        });
        let mut view = PatientsView::new(source, listeners.clone());
        view.apply_fetch(Ok(records));
        (view, listeners)
    }

    fn press(view: &mut PatientsView, listeners: &KeyListeners, code: KeyCode) {
        let event = key(code);
        listeners.broadcast(event);
        view.handle_input(event).unwrap();
    }

    fn settle(view: &mut PatientsView) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while view.status() == &LoadStatus::Loading {
            assert!(Instant::now() < deadline, "fetch did not finish in time");
            view.on_tick();
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn screen(view: &PatientsView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                view.render(frame, area)
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn next_id_is_one_past_the_max() {
        assert_eq!(next_id(&[]), Some(1));
        assert_eq!(
            next_id(&[patient(3, "A"), patient(10, "B"), patient(7, "C")]),
            Some(11)
        );
    }

    #[test]
    fn no_id_is_assigned_past_the_largest_possible() {
        assert_eq!(next_id(&[patient(u64::MAX, "Max")]), None);

        let (mut view, _) = view_with(vec![patient(u64::MAX, "Max")]);
        view.open_add_dialog();

        assert_eq!(view.add_patient(draft("Late")), None);
        assert_eq!(view.patients().len(), 1);
        assert_eq!(view.patients()[0].id, u64::MAX);
    }

    #[test]
    fn hidden_grid_cannot_be_focused_or_selected() {
        let listeners = KeyListeners::new();
        let source = Arc::new(Canned {
            records: Vec::new(),
            status: None,
        });
        let mut view = PatientsView::new(source, listeners.clone());
        view.apply_fetch(Err(FetchError::Status(500)));
        assert_eq!(view.add_patient(draft("Local")), Some(1));

        press(&mut view, &listeners, KeyCode::Down);
        press(&mut view, &listeners, KeyCode::Enter);
        assert_eq!(view.phase(), Phase::Failed);

        press(&mut view, &listeners, KeyCode::Tab);
        assert_eq!(view.phase(), Phase::Failed);
        assert_eq!(view.focus_index, ADD_BUTTON);

        view.view_details(0);
        assert_eq!(view.phase(), Phase::Failed);
        assert!(view.selected().is_none());
        let text = screen(&view);
        assert!(!text.contains("Local"));
        assert!(text.contains("Tab: Focus | Enter: Add"));

        view.open_add_dialog();
        assert!(screen(&view).contains("Enter: Submit"));
    }

    #[test]
    fn fetch_populates_the_list() {
        let listeners = KeyListeners::new();
        let source = Arc::new(Canned {
            records: vec![patient(1, "Ann"), patient(2, "Bob")],
            status: None,
        });
        let mut view = PatientsView::new(source, listeners);
        assert_eq!(view.phase(), Phase::Initial);

        view.activate();
        assert_eq!(view.status(), &LoadStatus::Loading);
        settle(&mut view);

        assert_eq!(view.phase(), Phase::Browsing);
        assert_eq!(view.patients().len(), 2);
        assert_eq!(view.visible().len(), 2);
    }

    #[test]
    fn failed_fetch_shows_error_branch() {
        let listeners = KeyListeners::new();
        let source = Arc::new(Canned {
            records: Vec::new(),
            status: Some(500),
        });
        let mut view = PatientsView::new(source, listeners);

        view.activate();
        settle(&mut view);

        assert_eq!(view.phase(), Phase::Failed);
        assert_eq!(
            view.status(),
            &LoadStatus::Failed("Failed to fetch: 500".into())
        );
        assert!(view.patients().is_empty());

        let text = screen(&view);
        assert!(text.contains("Error: Failed to fetch: 500"));
        assert!(!text.contains("No patients match your search."));
    }

    #[test]
    fn activation_fetches_only_once() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let source = Arc::new(Gated {
            gate: Mutex::new(gate_rx),
        });
        let mut view = PatientsView::new(source, KeyListeners::new());

        view.activate();
        view.activate();
        gate_tx.send(()).unwrap();
        settle(&mut view);

        assert_eq!(view.patients().len(), 1);
        // A second fetch would still be waiting on the gate.
        view.activate();
        assert_eq!(view.status(), &LoadStatus::Loaded);
    }

    #[test]
    fn search_stays_usable_while_loading() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let source = Arc::new(Gated {
            gate: Mutex::new(gate_rx),
        });
        let listeners = KeyListeners::new();
        let mut view = PatientsView::new(source, listeners.clone());
        view.activate();

        press(&mut view, &listeners, KeyCode::Char('l'));
        view.on_tick();
        assert_eq!(view.phase(), Phase::Loading);
        assert_eq!(view.query(), "l");
        assert!(screen(&view).contains("Loading patients..."));

        gate_tx.send(()).unwrap();
        settle(&mut view);
        assert_eq!(view.visible().len(), 1);
    }

    #[test]
    fn dropping_the_view_discards_a_late_result() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let source = Arc::new(Gated {
            gate: Mutex::new(gate_rx),
        });
        let mut view = PatientsView::new(source.clone(), KeyListeners::new());
        view.activate();

        drop(view);
        gate_tx.send(()).unwrap();

        // The worker drops its handle on the source once it is done.
        let deadline = Instant::now() + Duration::from_secs(10);
        while Arc::strong_count(&source) > 1 {
            assert!(Instant::now() < deadline, "worker never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn fetch_replaces_previous_content() {
        let (mut view, _) = view_with(vec![patient(1, "Ann")]);
        view.apply_fetch(Ok(vec![patient(5, "Eve"), patient(6, "Fay")]));

        let names: Vec<_> = view.patients().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Eve", "Fay"]);
    }

    #[test]
    fn typing_in_search_filters_cards() {
        let (mut view, listeners) = view_with(vec![
            patient(1, "Alice"),
            patient(2, "Bob"),
            patient(3, "Malik"),
        ]);

        for c in "ALI".chars() {
            press(&mut view, &listeners, KeyCode::Char(c));
        }
        let names: Vec<_> = view.visible().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Malik"]);
        assert_eq!(view.patients().len(), 3);

        view.set_query("zzz");
        assert!(screen(&view).contains("No patients match your search."));
        assert_eq!(view.phase(), Phase::Browsing);
    }

    #[test]
    fn enter_on_card_opens_details_and_escape_closes() {
        let (mut view, listeners) = view_with(vec![patient(1, "Ann"), patient(2, "Bob")]);

        press(&mut view, &listeners, KeyCode::Tab);
        press(&mut view, &listeners, KeyCode::Right);
        press(&mut view, &listeners, KeyCode::Enter);
        assert_eq!(view.phase(), Phase::Viewing(2));
        assert_eq!(listeners.active(), 1);

        press(&mut view, &listeners, KeyCode::Esc);
        assert_eq!(view.phase(), Phase::Browsing);
        assert!(view.selected().is_none());
        assert_eq!(listeners.active(), 0);
    }

    #[test]
    fn details_show_company_only_when_present() {
        let mut with_company = patient(1, "Ann");
        with_company.company = "Romaguera-Crona".into();
        let (mut view, _) = view_with(vec![with_company, patient(2, "Bob")]);

        view.view_details(0);
        let text = screen(&view);
        assert!(text.contains("Patient Details"));
        assert!(text.contains("Company: Romaguera-Crona"));
        assert!(text.contains("ann@example.com"));

        view.clear_selection();
        view.view_details(1);
        assert!(!screen(&view).contains("Company:"));
    }

    #[test]
    fn details_close_button_clears_selection() {
        let (mut view, listeners) = view_with(vec![patient(1, "Ann")]);
        view.view_details(0);

        press(&mut view, &listeners, KeyCode::Enter);

        assert_eq!(view.phase(), Phase::Browsing);
    }

    #[test]
    fn backdrop_click_closes_details_but_inside_click_does_not() {
        let (mut view, _) = view_with(vec![patient(1, "Ann")]);
        view.view_details(0);
        let _ = screen(&view);
        let dialog = view.details_modal.dialog_area(Rect::new(0, 0, 100, 40));

        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        view.handle_mouse(click(dialog.x + 3, dialog.y + 3)).unwrap();
        assert_eq!(view.phase(), Phase::Viewing(1));

        view.handle_mouse(click(0, 0)).unwrap();
        assert_eq!(view.phase(), Phase::Browsing);
    }

    #[test]
    fn clicking_a_card_opens_its_details() {
        let (mut view, _) = view_with(vec![patient(1, "Ann"), patient(2, "Bob")]);
        let _ = screen(&view);
        let (area, _) = view.card_areas.borrow()[1];

        view.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: area.x + 1,
            row: area.y + 1,
            modifiers: KeyModifiers::NONE,
        })
        .unwrap();

        assert_eq!(view.phase(), Phase::Viewing(2));
    }

    #[test]
    fn add_dialog_prepends_with_fresh_id() {
        let (mut view, listeners) = view_with(vec![patient(4, "Ann"), patient(9, "Bob")]);

        press(&mut view, &listeners, KeyCode::BackTab);
        press(&mut view, &listeners, KeyCode::Enter);
        assert_eq!(view.phase(), Phase::Adding);

        for c in "Cara".chars() {
            press(&mut view, &listeners, KeyCode::Char(c));
        }
        press(&mut view, &listeners, KeyCode::Tab);
        for c in "41".chars() {
            press(&mut view, &listeners, KeyCode::Char(c));
        }
        press(&mut view, &listeners, KeyCode::Tab);
        for c in "777".chars() {
            press(&mut view, &listeners, KeyCode::Char(c));
        }
        press(&mut view, &listeners, KeyCode::Enter);

        assert_eq!(view.phase(), Phase::Browsing);
        assert_eq!(view.patients().len(), 3);
        let added = &view.patients()[0];
        assert_eq!(added.id, 10);
        assert_eq!(added.name, "Cara");
        assert_eq!(added.age, Some(41));
        assert_eq!(added.contact, "777");
        assert_eq!(added.email, "");
        assert!(view.add_form().is_none());
        assert_eq!(listeners.active(), 0);
    }

    #[test]
    fn first_added_record_gets_id_one() {
        let (mut view, _) = view_with(Vec::new());
        assert_eq!(view.add_patient(draft("Solo")), Some(1));
        assert_eq!(view.add_patient(draft("Duo")), Some(2));

        let ids: Vec<_> = view.patients().iter().map(|p| p.id).collect();
        assert_eq!(ids, [2, 1]);
    }

    #[test]
    fn incomplete_add_form_changes_nothing() {
        let (mut view, listeners) = view_with(vec![patient(1, "Ann")]);
        view.open_add_dialog();

        for c in "Dee".chars() {
            press(&mut view, &listeners, KeyCode::Char(c));
        }
        press(&mut view, &listeners, KeyCode::Enter);

        assert_eq!(view.phase(), Phase::Adding);
        assert_eq!(view.patients().len(), 1);
        assert_eq!(view.add_form().unwrap().draft().name, "Dee");
        assert_eq!(view.submit_add_form(), None);
    }

    #[test]
    fn escape_discards_the_add_draft() {
        let (mut view, listeners) = view_with(vec![patient(1, "Ann")]);
        view.open_add_dialog();
        press(&mut view, &listeners, KeyCode::Char('Z'));

        press(&mut view, &listeners, KeyCode::Esc);
        assert_eq!(view.phase(), Phase::Browsing);
        assert_eq!(view.patients().len(), 1);

        view.open_add_dialog();
        assert_eq!(view.add_form().unwrap().draft().name, "");
    }

    #[test]
    fn added_record_respects_active_search() {
        let (mut view, _) = view_with(vec![patient(1, "Ann"), patient(2, "Bob")]);
        view.set_query("an");

        view.add_patient(draft("Anya"));
        view.add_patient(draft("Zed"));

        let names: Vec<_> = view.visible().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Anya", "Ann"]);
    }

    #[test]
    fn dropping_the_view_releases_dialog_listeners() {
        let (mut view, listeners) = view_with(vec![patient(1, "Ann")]);
        view.view_details(0);
        assert_eq!(listeners.active(), 1);

        drop(view);
        assert_eq!(listeners.active(), 0);
    }
}
