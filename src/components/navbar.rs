//! Top navigation bar.

use crate::app::View;
use crate::tui::Frame;
use ratatui::layout::Position;
use ratatui::{prelude::*, widgets::*};
use std::cell::RefCell;

pub const BRAND: &str = "Jarurat Care";

#[derive(Default)]
pub struct Navbar {
    /// Screen area of each entry as last drawn.
    entries: RefCell<Vec<(Rect, View)>>,
}

impl Navbar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry under `column`/`row`, if any.
    pub fn hit(&self, column: u16, row: u16) -> Option<View> {
        let position = Position::new(column, row);
        self.entries
            .borrow()
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, view)| *view)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, active: View) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::Rgb(75, 75, 120)))
            .style(Style::default().bg(Color::Rgb(16, 16, 28)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let labels: Vec<String> = View::ALL
            .iter()
            .map(|view| format!(" {} {} ", view.hotkey(), view.label()))
            .collect();

        let mut constraints = vec![Constraint::Min(16)];
        constraints.extend(labels.iter().map(|l| Constraint::Length(l.chars().count() as u16)));
        constraints.push(Constraint::Length(12));

        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .spacing(1)
            .split(inner);

        let brand = Paragraph::new(format!(" 🏥 {BRAND}")).style(
            Style::default()
                .fg(Color::Rgb(230, 230, 250))
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(brand, layout[0]);

        let mut entries = self.entries.borrow_mut();
        entries.clear();
        for (i, (view, label)) in View::ALL.iter().zip(labels).enumerate() {
            let style = if *view == active {
                Style::default()
                    .fg(Color::Rgb(250, 250, 110))
                    .bg(Color::Rgb(40, 40, 65))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Rgb(180, 180, 200))
            };
            let cell = layout[i + 1];
            frame.render_widget(Paragraph::new(label).style(style), cell);
            entries.push((cell, *view));
        }

        let quit = Paragraph::new("Ctrl+Q Quit")
            .style(Style::default().fg(Color::Rgb(140, 140, 170)))
            .alignment(Alignment::Right);
        frame.render_widget(quit, layout[View::ALL.len() + 1]);
    }
}
