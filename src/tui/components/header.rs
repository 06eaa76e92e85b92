//! # Header Component
//!
//! One-line bar above the chat page: app name, greeting, and the current
//! status message. Purely presentational; every field is a prop.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub struct Header<'a> {
    pub user_name: &'a str,
    pub status_message: &'a str,
}

impl Header<'_> {
    fn line(&self) -> Line<'_> {
        let mut spans = vec![
            Span::styled(
                "DocChat",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::raw(format!("Welcome, {}", self.user_name)),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                self.status_message,
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    }
}

impl Component for Header<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Paragraph::new(self.line()), area);
        let logout = Line::from(Span::styled(
            "^L Logout",
            Style::default().fg(Color::DarkGray),
        ))
        .right_aligned();
        frame.render_widget(Paragraph::new(logout), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_text() {
        let header = Header {
            user_name: "Kim",
            status_message: "Room deleted",
        };
        assert_eq!(
            header.line().to_string(),
            "DocChat | Welcome, Kim | Room deleted"
        );
    }

    #[test]
    fn test_header_without_status() {
        let header = Header {
            user_name: "Kim",
            status_message: "",
        };
        assert_eq!(header.line().to_string(), "DocChat | Welcome, Kim");
    }
}
