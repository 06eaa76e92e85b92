//! # Sidebar Component
//!
//! The "My Rooms" list. Follows the persistent state + transient wrapper
//! pattern:
//! - `SidebarState` lives in `TuiState` and tracks the highlighted row
//! - `Sidebar` is created each frame with the room list as props

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::{Room, RoomId};
use crate::tui::component::Component;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum SidebarEvent {
    Select(RoomId),
    Delete(RoomId),
}

#[derive(Default)]
pub struct SidebarState {
    pub highlighted: usize,
    pub list_state: ListState,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the highlight inside the list after rooms are added or removed.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.highlighted = 0;
            self.list_state.select(None);
        } else {
            self.highlighted = self.highlighted.min(len - 1);
            self.list_state.select(Some(self.highlighted));
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent, rooms: &[Room]) -> Option<SidebarEvent> {
        match event {
            TuiEvent::CursorUp => {
                self.highlighted = self.highlighted.saturating_sub(1);
                self.clamp(rooms.len());
                None
            }
            TuiEvent::CursorDown => {
                self.highlighted = self.highlighted.saturating_add(1);
                self.clamp(rooms.len());
                None
            }
            TuiEvent::Submit => rooms
                .get(self.highlighted)
                .map(|room| SidebarEvent::Select(room.room_id)),
            TuiEvent::DeleteRoom => rooms
                .get(self.highlighted)
                .map(|room| SidebarEvent::Delete(room.room_id)),
            _ => None,
        }
    }
}

pub struct Sidebar<'a> {
    state: &'a mut SidebarState,
    rooms: &'a [Room],
    selected: Option<RoomId>,
    focused: bool,
}

impl<'a> Sidebar<'a> {
    pub fn new(
        state: &'a mut SidebarState,
        rooms: &'a [Room],
        selected: Option<RoomId>,
        focused: bool,
    ) -> Self {
        Self {
            state,
            rooms,
            selected,
            focused,
        }
    }
}

impl Component for Sidebar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(" My Rooms ")
            .title_bottom(Line::from(" ^N New  ^D Delete ").centered())
            .padding(Padding::horizontal(1));

        if self.rooms.is_empty() {
            let empty = Paragraph::new("No rooms yet.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        self.state.clamp(self.rooms.len());
        // borders + padding + marker
        let title_width = area.width.saturating_sub(6) as usize;

        let items: Vec<ListItem> = self
            .rooms
            .iter()
            .map(|room| {
                let is_selected = self.selected == Some(room.room_id);
                let marker = if is_selected { "● " } else { "  " };
                let style = if is_selected {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, style),
                    Span::styled(truncate(&room.title, title_width), style),
                ]))
            })
            .collect();

        let highlight = if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let list = List::new(items).block(block).highlight_style(highlight);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

/// Cut `s` to at most `max_width` columns, ending in "…" when shortened.
fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}
