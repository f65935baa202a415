use crate::app::View;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;

pub mod about;
pub mod home;
pub mod modal;
pub mod navbar;
pub mod patients;

/// A screen below the navigation bar.
pub trait Component {
    /// Returns the view to switch to, if the key asked for one.
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<View>>;

    fn handle_mouse(&mut self, _event: MouseEvent) -> Result<Option<View>> {
        Ok(None)
    }

    fn on_tick(&mut self) {}

    fn render(&self, frame: &mut Frame, area: Rect);
}
