//! # TextField Component
//!
//! A single-line bordered input with a label, optional masking for
//! passwords, and a disabled state. The buffer and cursor are internal
//! state; `focused` and `disabled` are props set by the parent each frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Height of a rendered field: one text line plus borders.
pub const FIELD_HEIGHT: u16 = 3;

const MASK_CHAR: char = '•';

#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    Changed,
    Submit,
}

pub struct TextField {
    pub label: String,
    pub masked: bool,
    /// Prop: draw the cursor and highlight the border.
    pub focused: bool,
    /// Prop: ignore input and dim the field.
    pub disabled: bool,
    /// Shown dimmed while the buffer is empty.
    pub placeholder: String,
    value: String,
    /// Byte offset into `value`, always on a char boundary.
    cursor: usize,
}

impl TextField {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            masked: false,
            focused: false,
            disabled: false,
            placeholder: String::new(),
            value: String::new(),
            cursor: 0,
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Takes the buffer, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    fn display_text(&self) -> String {
        if self.masked {
            MASK_CHAR.to_string().repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Display width of the text left of the cursor.
    fn cursor_column(&self) -> u16 {
        let before = &self.value[..self.cursor];
        let width = if self.masked {
            before.chars().count()
        } else {
            before.width()
        };
        width as u16
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.value.len())
    }
}

impl Component for TextField {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.disabled {
            Style::default().fg(Color::DarkGray)
        } else if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(format!(" {} ", self.label));

        let inner_width = area.width.saturating_sub(2);
        let cursor_col = self.cursor_column();
        // Scroll horizontally so the cursor stays visible.
        let offset = cursor_col.saturating_sub(inner_width.saturating_sub(1));

        let paragraph = if self.value.is_empty() && !self.placeholder.is_empty() {
            Paragraph::new(self.placeholder.as_str()).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            let style = if self.disabled {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            Paragraph::new(self.display_text())
                .style(style)
                .scroll((0, offset))
        };

        frame.render_widget(paragraph.block(block), area);

        if self.focused && !self.disabled && area.width > 2 && area.height > 2 {
            let x = area.x + 1 + (cursor_col - offset).min(inner_width.saturating_sub(1));
            frame.set_cursor_position((x, area.y + 1));
        }
    }
}

impl EventHandler for TextField {
    type Event = FieldEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                self.value.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(FieldEvent::Changed)
            }
            TuiEvent::Paste(text) => {
                // Single-line field: newlines become spaces.
                let text: String = text
                    .chars()
                    .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                    .collect();
                self.value.insert_str(self.cursor, &text);
                self.cursor += text.len();
                Some(FieldEvent::Changed)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = self.prev_boundary();
                self.value.drain(prev..self.cursor);
                self.cursor = prev;
                FieldEvent::Changed
            }),
            TuiEvent::Delete => (self.cursor < self.value.len()).then(|| {
                let next = self.next_boundary();
                self.value.drain(self.cursor..next);
                FieldEvent::Changed
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = self.prev_boundary();
                FieldEvent::Changed
            }),
            TuiEvent::CursorRight => (self.cursor < self.value.len()).then(|| {
                self.cursor = self.next_boundary();
                FieldEvent::Changed
            }),
            TuiEvent::CursorHome => {
                self.cursor = 0;
                Some(FieldEvent::Changed)
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.value.len();
                Some(FieldEvent::Changed)
            }
            TuiEvent::Submit => Some(FieldEvent::Submit),
            _ => None,
        }
    }
}
