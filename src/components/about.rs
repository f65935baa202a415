use crate::app::View;
use crate::components::navbar::BRAND;
use crate::components::Component;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{prelude::*, widgets::*};

/// Static information page.
#[derive(Default)]
pub struct About;

impl Component for About {
    fn handle_input(&mut self, _event: KeyEvent) -> Result<Option<View>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" About {BRAND} "))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(75, 75, 120)))
            .style(Style::default().bg(Color::Rgb(22, 22, 35)));

        let text = vec![
            Line::from(Span::styled(
                BRAND,
                Style::default()
                    .fg(Color::Rgb(230, 230, 250))
                    .add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from("Patient records are read from a public demo API when the"),
            Line::from("Patients page opens. Records you add live only for this"),
            Line::from("session and are gone once you leave the page."),
            Line::default(),
            Line::from(Span::styled(
                "F1 Home | F2 Patients | F3 About | Ctrl+Q Quit",
                Style::default().fg(Color::Rgb(140, 140, 170)),
            )),
        ];

        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block.padding(Padding::new(2, 2, 1, 1)));

        let area = area.inner(Margin::new(2, 1));
        frame.render_widget(paragraph, area);
    }
}
