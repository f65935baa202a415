use crate::app::View;
use crate::components::navbar::BRAND;
use crate::components::Component;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use time::macros::format_description;
use time::OffsetDateTime;

/// Landing view.
pub struct Home {
    session_started: String,
}

impl Home {
    pub fn new() -> Self {
        // Local offset lookup can fail once other threads exist; UTC will do.
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let session_started = now
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]"
            ))
            .unwrap_or_default();

        Self { session_started }
    }
}

impl Default for Home {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Home {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<View>> {
        match event.code {
            KeyCode::Enter => Ok(Some(View::Patients)),
            _ => Ok(None),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .margin(1)
            .split(area);

        let welcome_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(75, 75, 120)))
            .style(Style::default().bg(Color::Rgb(24, 24, 40)));
        let welcome_inner = welcome_block.inner(layout[0]);
        frame.render_widget(welcome_block, layout[0]);

        let welcome = Paragraph::new(Line::from(vec![
            Span::styled(
                "Welcome to ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                BRAND,
                Style::default()
                    .fg(Color::Rgb(129, 199, 245))
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
        frame.render_widget(welcome, welcome_inner);

        let started = Paragraph::new(format!("Session started {}", self.session_started))
            .style(Style::default().fg(Color::Rgb(140, 140, 170)))
            .alignment(Alignment::Center);
        frame.render_widget(started, layout[1]);

        let intro = Paragraph::new(vec![
            Line::from("A simple patient directory."),
            Line::default(),
            Line::from("Search patients by name, open a card for full details,"),
            Line::from("or register a new patient for this session."),
        ])
        .style(Style::default().fg(Color::Rgb(200, 200, 220)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().padding(Padding::new(2, 2, 2, 0)));
        frame.render_widget(intro, layout[2]);

        let browse = Paragraph::new("► Browse Patients ◄")
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
                    .border_style(Style::default().fg(Color::Rgb(100, 100, 140))),
            );
        frame.render_widget(browse, layout[3]);
    }
}
