//! # ChatWindow Component
//!
//! Message history for the selected room plus the question input.
//!
//! `ChatWindow` is a transient wrapper created each frame around
//! `&'a mut ChatWindowState` (scroll position and input buffer) with the
//! room's messages as props. Scrolling follows the usual chat convention:
//! pinned to the bottom until the user scrolls up, re-pinned once they
//! scroll back down past the end.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::{Message, Room, Sender};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_field::{FIELD_HEIGHT, FieldEvent, TextField};
use crate::tui::event::TuiEvent;

const TYPING_FRAMES: [&str; 3] = [".", "..", "..."];

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Send(String),
}

pub struct ChatWindowState {
    pub input: TextField,
    pub scroll_state: ScrollViewState,
    pub stick_to_bottom: bool,
    /// Total content height from the last frame, used to clamp scrolling.
    content_height: u16,
    viewport_height: u16,
}

impl Default for ChatWindowState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatWindowState {
    pub fn new() -> Self {
        Self {
            input: TextField::new("Ask about this document")
                .with_placeholder("Type a question and press Enter"),
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            content_height: 0,
            viewport_height: 0,
        }
    }

    /// Jump back to the bottom, e.g. after switching rooms.
    pub fn reset_scroll(&mut self) {
        self.scroll_state = ScrollViewState::default();
        self.stick_to_bottom = true;
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        if self.scroll_state.offset().y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: 0, y: max_y });
        }
    }
}

impl EventHandler for ChatWindowState {
    type Event = ChatEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp | TuiEvent::CursorUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollDown | TuiEvent::CursorDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
                None
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
                None
            }
            _ => match self.input.handle_event(event)? {
                FieldEvent::Submit => {
                    if self.input.value().trim().is_empty() {
                        return None;
                    }
                    self.stick_to_bottom = true;
                    Some(ChatEvent::Send(self.input.take()))
                }
                FieldEvent::Changed => None,
            },
        }
    }
}

pub struct ChatWindow<'a> {
    state: &'a mut ChatWindowState,
    room: Option<&'a Room>,
    messages: &'a [Message],
    awaiting_answer: bool,
    focused: bool,
    spinner_frame: usize,
}

impl<'a> ChatWindow<'a> {
    pub fn new(
        state: &'a mut ChatWindowState,
        room: Option<&'a Room>,
        messages: &'a [Message],
        awaiting_answer: bool,
        focused: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            room,
            messages,
            awaiting_answer,
            focused,
            spinner_frame,
        }
    }
}

/// Bordered message bubble titled with the sender.
fn bubble(message: &Message) -> Paragraph<'_> {
    let (label, color) = match message.sender {
        Sender::User => ("You", Color::Cyan),
        Sender::System => ("DocChat", Color::Green),
    };
    let mut title = vec![Span::styled(
        format!(" {label} "),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(ts) = message.timestamp {
        title.push(Span::styled(
            format!("{} ", ts.with_timezone(&chrono::Local).format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Paragraph::new(message.content.as_str())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::TOP)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .title(Line::from(title))
                .padding(Padding::left(1)),
        )
}

/// Rows a bubble occupies at `width`, including its border.
fn bubble_height(message: &Message, width: u16) -> u16 {
    let height = bubble(message).line_count(width);
    u16::try_from(height).unwrap_or(u16::MAX).max(2)
}

impl Component for ChatWindow<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let title = self
            .room
            .map(|room| format!(" {} ", room.title))
            .unwrap_or_else(|| " Chat ".to_string());
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.room.is_none() {
            let [_, middle, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(inner);
            frame.render_widget(
                Paragraph::new("Select a room to start chatting")
                    .style(Style::default().fg(Color::DarkGray))
                    .centered(),
                middle,
            );
            return;
        }

        let [history_area, input_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(FIELD_HEIGHT)]).areas(inner);

        // Leave a column for the scrollbar.
        let content_width = history_area.width.saturating_sub(1);
        let heights: Vec<u16> = self
            .messages
            .iter()
            .map(|m| bubble_height(m, content_width))
            .collect();
        let typing_height = if self.awaiting_answer { 2 } else { 0 };
        let total: u16 = heights
            .iter()
            .fold(typing_height, |acc, h| acc.saturating_add(*h));

        self.state.content_height = total;
        self.state.viewport_height = history_area.height;
        if !self.state.stick_to_bottom
            && self.state.scroll_state.offset().y > self.state.max_offset()
        {
            let max_y = self.state.max_offset();
            self.state.scroll_state.set_offset(Position { x: 0, y: max_y });
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, total))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y: u16 = 0;
        for (message, height) in self.messages.iter().zip(&heights) {
            scroll_view.render_widget(bubble(message), Rect::new(0, y, content_width, *height));
            y = y.saturating_add(*height);
        }
        if self.awaiting_answer {
            let dots = TYPING_FRAMES[self.spinner_frame % TYPING_FRAMES.len()];
            scroll_view.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("DocChat ", Style::default().fg(Color::Green)),
                    Span::styled(dots, Style::default().fg(Color::DarkGray)),
                ])),
                Rect::new(0, y.saturating_add(1), content_width, 1),
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, history_area, &mut self.state.scroll_state);

        self.state.input.focused = self.focused;
        self.state.input.disabled = self.awaiting_answer;
        self.state.input.render(frame, input_area);
    }
}
