//! Patient card: the summary tile in the directory grid.

use crate::models::PatientRecord;
use crate::tui::Frame;
use ratatui::{prelude::*, widgets::*};

pub const CARD_HEIGHT: u16 = 7;

/// Text used wherever an age is shown.
pub fn age_text(age: Option<u32>) -> String {
    age.map(|a| a.to_string()).unwrap_or_else(|| "n/a".to_string())
}

pub fn render_card(frame: &mut Frame, area: Rect, patient: &PatientRecord, highlighted: bool) {
    let border_style = if highlighted {
        Style::default().fg(Color::Rgb(250, 250, 110))
    } else {
        Style::default().fg(Color::Rgb(75, 75, 120))
    };

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", patient.name),
            Style::default()
                .fg(Color::Rgb(230, 230, 250))
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .style(Style::default().bg(Color::Rgb(22, 22, 35)));

    let label = Style::default()
        .fg(Color::Rgb(180, 190, 254))
        .add_modifier(Modifier::BOLD);
    let value = Style::default().fg(Color::Rgb(200, 200, 220));

    let action = if highlighted {
        Span::styled(
            "► View Details ◄",
            Style::default()
                .fg(Color::Rgb(129, 199, 245))
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("  View Details  ", Style::default().fg(Color::Rgb(180, 180, 200)))
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Age: ", label),
            Span::styled(age_text(patient.age), value),
        ]),
        Line::from(vec![
            Span::styled("Contact: ", label),
            Span::styled(patient.contact.clone(), value),
        ]),
        Line::default(),
        Line::from(action).alignment(Alignment::Center),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn shows_name_age_and_contact() {
        let patient = PatientRecord {
            id: 1,
            name: "Ann".into(),
            age: Some(27),
            contact: "555".into(),
            email: "a@x.com".into(),
            address: "Elm, Foo".into(),
            company: String::new(),
        };
        let mut terminal = Terminal::new(TestBackend::new(30, CARD_HEIGHT)).unwrap();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_card(frame, area, &patient, true)
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Ann"));
        assert!(text.contains("Age: 27"));
        assert!(text.contains("Contact: 555"));
        assert!(text.contains("View Details"));
        assert!(!text.contains("a@x.com"));
    }

    #[test]
    fn unusable_age_reads_as_not_available() {
        assert_eq!(age_text(None), "n/a");
        assert_eq!(age_text(Some(41)), "41");
    }
}
