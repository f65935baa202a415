//! The main application state and logic for Jarurat Care.
//!
//! This module owns the active view, routes terminal events to it, and
//! draws the navigation bar above whatever view is showing.

use crate::api::{HttpPatientSource, PatientSource};
use crate::components::about::About;
use crate::components::home::Home;
use crate::components::navbar::Navbar;
use crate::components::patients::PatientsView;
use crate::components::Component;
use crate::config::AppConfig;
use crate::events::KeyListeners;
use crate::tui::{self, Tui};
use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use ratatui::{prelude::*, widgets::Block};
use std::sync::Arc;
use tracing::info;

/// The views reachable from the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The landing page.
    Home,
    /// The patient directory.
    Patients,
    /// Static information.
    About,
}

impl View {
    pub const ALL: [View; 3] = [View::Home, View::Patients, View::About];

    pub fn label(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Patients => "Patients",
            View::About => "About",
        }
    }

    pub fn hotkey(self) -> &'static str {
        match self {
            View::Home => "F1",
            View::Patients => "F2",
            View::About => "F3",
        }
    }

    fn from_function_key(n: u8) -> Option<Self> {
        match n {
            1 => Some(View::Home),
            2 => Some(View::Patients),
            3 => Some(View::About),
            _ => None,
        }
    }
}

/// Main application struct.
pub struct App {
    /// The view currently shown.
    pub view: View,
    /// Flag indicating if the application should quit.
    pub should_quit: bool,
    framerate: f64,
    listeners: KeyListeners,
    source: Arc<dyn PatientSource>,
    navbar: Navbar,
    home: Home,
    about: About,
    /// The patient directory, only alive while it is the active view.
    patients: Option<PatientsView>,
}

impl App {
    /// Creates the app reading patients over HTTP as configured.
    pub fn new(config: &AppConfig) -> Self {
        let source = HttpPatientSource::new(config.api_url.clone(), config.fetch_timeout);
        let mut app = Self::with_source(Arc::new(source));
        app.framerate = config.framerate;
        app
    }

    pub fn with_source(source: Arc<dyn PatientSource>) -> Self {
        Self {
            view: View::Home,
            should_quit: false,
            framerate: crate::config::DEFAULT_FRAMERATE,
            listeners: KeyListeners::new(),
            source,
            navbar: Navbar::new(),
            home: Home::new(),
            about: About,
            patients: None,
        }
    }

    pub fn framerate(&self) -> f64 {
        self.framerate
    }

    pub fn patients(&self) -> Option<&PatientsView> {
        self.patients.as_ref()
    }

    /// Runs the application's main loop until quit.
    pub fn run(&mut self, tui: &mut Tui) -> Result<()> {
        while !self.should_quit {
            tui.draw(|frame| self.render_ui(frame))?;
            let event = tui.next_event()?;
            self.handle_event(event)?;
        }
        Ok(())
    }

    /// Switches views. Leaving the patient directory unmounts it, and
    /// entering it mounts a fresh one that fetches again.
    pub fn navigate(&mut self, view: View) {
        if self.view == view {
            return;
        }
        info!(from = self.view.label(), to = view.label(), "navigating");

        if self.view == View::Patients {
            // Drop the directory along with any fetch still in flight.
            self.patients = None;
        }
        if view == View::Patients {
            let mut patients = PatientsView::new(Arc::clone(&self.source), self.listeners.clone());
            patients.activate();
            self.patients = Some(patients);
        }
        self.view = view;
    }

    fn active_mut(&mut self) -> Option<&mut dyn Component> {
        match self.view {
            View::Home => Some(&mut self.home as &mut dyn Component),
            View::About => Some(&mut self.about as &mut dyn Component),
            View::Patients => self.patients.as_mut().map(|p| p as &mut dyn Component),
        }
    }

    fn active(&self) -> Option<&dyn Component> {
        match self.view {
            View::Home => Some(&self.home as &dyn Component),
            View::About => Some(&self.about as &dyn Component),
            View::Patients => self.patients.as_ref().map(|p| p as &dyn Component),
        }
    }

    /// Handles one terminal event.
    pub fn handle_event(&mut self, event: tui::Event) -> Result<()> {
        match event {
            tui::Event::Input(Event::Key(key)) => self.handle_key(key)?,
            tui::Event::Input(Event::Mouse(mouse)) => {
                // With a dialog up, the navbar is backdrop like everything else.
                let dialog_open = self.patients.as_ref().is_some_and(|p| p.has_open_dialog());
                if mouse.kind == MouseEventKind::Down(MouseButton::Left) && !dialog_open {
                    if let Some(view) = self.navbar.hit(mouse.column, mouse.row) {
                        self.navigate(view);
                        return Ok(());
                    }
                }
                let next = match self.active_mut() {
                    Some(component) => component.handle_mouse(mouse)?,
                    None => None,
                };
                if let Some(view) = next {
                    self.navigate(view);
                }
            }
            tui::Event::Input(_) => {}
            tui::Event::Tick => {
                if let Some(component) = self.active_mut() {
                    component.on_tick();
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }

        // Global keybinding: Ctrl+Q to quit
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        if let KeyCode::F(n) = key.code {
            if let Some(view) = View::from_function_key(n) {
                self.navigate(view);
                return Ok(());
            }
        }

        // Listeners hear the key before the view does.
        self.listeners.broadcast(key);

        let next = match self.active_mut() {
            Some(component) => component.handle_input(key)?,
            None => None,
        };
        if let Some(view) = next {
            self.navigate(view);
        }
        Ok(())
    }

    /// Draws the navigation bar and the active view.
    pub fn render_ui(&self, frame: &mut tui::Frame<'_>) {
        let area = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(16, 16, 28))),
            area,
        );

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        self.navbar.render(frame, layout[0], self.view);
        if let Some(component) = self.active() {
            component.render(frame, layout[1]);
        }
    }
}
