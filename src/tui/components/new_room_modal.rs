//! Overlay for creating a room from a local PDF. Opened with Ctrl+N.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::core::state::NewRoomState;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_field::{FIELD_HEIGHT, FieldEvent, TextField};
use crate::tui::event::TuiEvent;
use crate::tui::ui::centered_fixed;

#[derive(Debug, Clone, PartialEq)]
pub enum ModalEvent {
    Submit { title: String, path: String },
    Cancel,
}

pub struct NewRoomModal {
    pub title: TextField,
    pub path: TextField,
    pub focus: usize,
    /// Prop mirrored from `App::new_room` before each frame.
    pub status: NewRoomState,
}

impl Default for NewRoomModal {
    fn default() -> Self {
        Self::new()
    }
}

impl NewRoomModal {
    pub fn new() -> Self {
        Self {
            title: TextField::new("Room title"),
            path: TextField::new("PDF file").with_placeholder("/path/to/document.pdf"),
            focus: 0,
            status: NewRoomState::default(),
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = 1 - self.focus;
    }
}

impl Component for NewRoomModal {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_fixed(64, 2 * FIELD_HEIGHT + 6, area);
        frame.render_widget(Clear, overlay);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" New Room ")
            .title_bottom(Line::from(" Enter Create  Tab Next  Esc Cancel ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [title_area, path_area, _, status_area] = Layout::vertical([
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .areas(inner);

        let creating = self.status.creating;
        self.title.focused = self.focus == 0;
        self.path.focused = self.focus == 1;
        self.title.disabled = creating;
        self.path.disabled = creating;
        self.title.render(frame, title_area);
        self.path.render(frame, path_area);

        let status = if creating {
            Some(Paragraph::new("Creating...").style(Style::default().fg(Color::Yellow)))
        } else {
            self.status
                .error
                .as_deref()
                .map(|e| Paragraph::new(e).style(Style::default().fg(Color::Red)))
        };
        if let Some(status) = status {
            frame.render_widget(status.wrap(Wrap { trim: true }), status_area);
        }
    }
}

impl EventHandler for NewRoomModal {
    type Event = ModalEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.status.creating {
            return None;
        }
        match event {
            TuiEvent::Escape => Some(ModalEvent::Cancel),
            TuiEvent::NextField
            | TuiEvent::PrevField
            | TuiEvent::CursorUp
            | TuiEvent::CursorDown => {
                self.toggle_focus();
                None
            }
            _ => {
                let field = if self.focus == 0 {
                    &mut self.title
                } else {
                    &mut self.path
                };
                match field.handle_event(event)? {
                    FieldEvent::Submit => Some(ModalEvent::Submit {
                        title: self.title.value().to_string(),
                        path: self.path.value().trim().to_string(),
                    }),
                    FieldEvent::Changed => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_collects_both_fields() {
        let mut modal = NewRoomModal::new();
        for c in "Lease".chars() {
            modal.handle_event(&TuiEvent::InputChar(c));
        }
        modal.handle_event(&TuiEvent::NextField);
        modal.handle_event(&TuiEvent::Paste("/tmp/lease.pdf\n".to_string()));
        assert_eq!(
            modal.handle_event(&TuiEvent::Submit),
            Some(ModalEvent::Submit {
                title: "Lease".to_string(),
                path: "/tmp/lease.pdf".to_string(),
            })
        );
    }

    #[test]
    fn test_escape_cancels() {
        let mut modal = NewRoomModal::new();
        assert_eq!(modal.handle_event(&TuiEvent::Escape), Some(ModalEvent::Cancel));
    }

    #[test]
    fn test_creating_blocks_input() {
        let mut modal = NewRoomModal::new();
        modal.status.creating = true;
        assert_eq!(modal.handle_event(&TuiEvent::Escape), None);
        assert_eq!(modal.handle_event(&TuiEvent::Submit), None);
    }
}
