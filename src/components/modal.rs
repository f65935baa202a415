//! Reusable dialog overlay.
//!
//! A `Modal` draws nothing while closed. While open it holds an Esc
//! subscription in the shared [`KeyListeners`] registry, which is taken in
//! [`Modal::open`] and released in [`Modal::close`] or on drop.

use crate::events::{KeyListeners, ListenerId};
use crate::tui::Frame;
use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;
use ratatui::{prelude::*, widgets::*};
use std::cell::Cell;
use tracing::debug;

const CLOSE_LABEL: &str = " [x] ";

/// What a mouse event meant to an open dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalClick {
    /// Backdrop or the close control was clicked.
    Close,
    /// A click landed in the dialog; it must not reach anything beneath.
    Inside,
    /// Not a left click, or the dialog is closed.
    Ignored,
}

pub struct Modal {
    title: String,
    width: u16,
    height: u16,
    listeners: KeyListeners,
    escape: Option<ListenerId>,
    /// Where the dialog was last drawn, for hit testing.
    last_area: Cell<Option<Rect>>,
}

impl Modal {
    pub fn new(title: impl Into<String>, listeners: KeyListeners) -> Self {
        Self {
            title: title.into(),
            width: 60,
            height: 16,
            listeners,
            escape: None,
            last_area: Cell::new(None),
        }
    }

    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn is_open(&self) -> bool {
        self.escape.is_some_and(|id| self.listeners.is_subscribed(id))
    }

    pub fn open(&mut self) {
        if self.escape.is_none() {
            self.escape = Some(self.listeners.subscribe(KeyCode::Esc));
            debug!(title = %self.title, "dialog opened");
        }
    }

    pub fn close(&mut self) {
        if let Some(id) = self.escape.take() {
            self.listeners.unsubscribe(id);
            self.last_area.set(None);
            debug!(title = %self.title, "dialog closed");
        }
    }

    /// Drains pending Esc presses. Returns `true` at most once per drain,
    /// however many presses were queued.
    pub fn poll_close(&mut self) -> bool {
        match self.escape {
            Some(id) => !self.listeners.drain(id).is_empty(),
            None => false,
        }
    }

    /// Classifies a mouse event against the last drawn dialog.
    pub fn handle_mouse(&self, event: MouseEvent) -> ModalClick {
        if !self.is_open() || event.kind != MouseEventKind::Down(MouseButton::Left) {
            return ModalClick::Ignored;
        }
        let Some(area) = self.last_area.get() else {
            return ModalClick::Ignored;
        };

        let position = Position::new(event.column, event.row);
        if !area.contains(position) {
            return ModalClick::Close;
        }
        if close_control(area).contains(position) {
            return ModalClick::Close;
        }
        ModalClick::Inside
    }

    /// Centered dialog rectangle within `screen`.
    pub fn dialog_area(&self, screen: Rect) -> Rect {
        let width = self.width.min(screen.width);
        let height = self.height.min(screen.height);
        Rect::new(
            screen.x + (screen.width - width) / 2,
            screen.y + (screen.height - height) / 2,
            width,
            height,
        )
    }

    /// Draws the dialog frame and hands its inner area to `body`.
    pub fn render(&self, frame: &mut Frame, body: impl FnOnce(&mut Frame, Rect)) {
        if !self.is_open() {
            return;
        }

        let area = self.dialog_area(frame.area());
        self.last_area.set(Some(area));

        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(Color::Rgb(230, 230, 250))
                    .add_modifier(Modifier::BOLD),
            )
            .title_top(
                Line::from(Span::styled(
                    CLOSE_LABEL,
                    Style::default().fg(Color::Rgb(255, 100, 100)),
                ))
                .right_aligned(),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(140, 140, 200)))
            .style(Style::default().bg(Color::Rgb(30, 30, 46)));

        let inner = block.inner(area);
        frame.render_widget(block, area);
        body(frame, inner);
    }
}

impl Drop for Modal {
    fn drop(&mut self) {
        self.close();
    }
}

/// The `[x]` label sits right-aligned on the top border, inside the corner.
fn close_control(area: Rect) -> Rect {
    let width = CLOSE_LABEL.len() as u16;
    Rect::new(
        area.right().saturating_sub(1 + width).max(area.x),
        area.y,
        width.min(area.width),
        1,
    )
}
