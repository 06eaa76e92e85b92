//! # AuthForm Component
//!
//! A centered card holding a stack of `TextField`s, used for every auth
//! screen: login, signup, both steps of the forgot-password wizard, and the
//! new-password form. The form only collects values; it emits them on Enter
//! and the caller turns them into a core `Action`.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_field::{FIELD_HEIGHT, FieldEvent, TextField};
use crate::tui::event::TuiEvent;
use crate::tui::ui::centered_fixed;

const CARD_WIDTH: u16 = 56;

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// Field values, in field order.
    Submit(Vec<String>),
}

pub struct AuthForm {
    pub title: String,
    pub fields: Vec<TextField>,
    /// Keyboard shortcuts shown under the form, e.g. `("Ctrl+S", "Sign up")`.
    pub links: Vec<(&'static str, &'static str)>,
    pub focus: usize,

    // Props
    pub error: Option<String>,
    pub notice: Option<String>,
    pub busy: bool,
}

impl AuthForm {
    pub fn new(title: &str, fields: Vec<TextField>) -> Self {
        Self {
            title: title.to_string(),
            fields,
            links: Vec::new(),
            focus: 0,
            error: None,
            notice: None,
            busy: false,
        }
    }

    pub fn with_links(mut self, links: Vec<(&'static str, &'static str)>) -> Self {
        self.links = links;
        self
    }

    pub fn login() -> Self {
        Self::new(
            "Log in",
            vec![TextField::new("Email"), TextField::new("Password").masked()],
        )
        .with_links(vec![("Ctrl+S", "Sign up"), ("Ctrl+F", "Forgot password?")])
    }

    pub fn signup() -> Self {
        Self::new(
            "Sign up",
            vec![
                TextField::new("Name"),
                TextField::new("Email"),
                TextField::new("Password").masked(),
            ],
        )
        .with_links(vec![("Ctrl+B", "Back to login")])
    }

    pub fn forgot_request() -> Self {
        Self::new(
            "Forgot password",
            vec![TextField::new("Email"), TextField::new("Name")],
        )
        .with_links(vec![("Ctrl+B", "Back to login")])
    }

    pub fn forgot_verify() -> Self {
        Self::new("Forgot password", vec![TextField::new("Verification code")])
            .with_links(vec![("Ctrl+B", "Back to login")])
    }

    pub fn reset_password() -> Self {
        Self::new(
            "Reset password",
            vec![
                TextField::new("New password").masked(),
                TextField::new("Confirm new password").masked(),
            ],
        )
        .with_links(vec![("Ctrl+B", "Back to login")])
    }

    pub fn values(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.value().to_string()).collect()
    }

    fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Rows needed for the card content.
    fn content_height(&self) -> u16 {
        let fields = self.fields.len() as u16 * FIELD_HEIGHT;
        let links = self.links.len() as u16;
        // title + gap + fields + gap + feedback(2) + gap + links
        1 + 1 + fields + 1 + 2 + 1 + links
    }
}

impl Component for AuthForm {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let height = self.content_height() + 2; // borders
        let card = centered_fixed(CARD_WIDTH, height, area);
        frame.render_widget(Clear, card);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" DocChat ")
            .title_alignment(Alignment::Center)
            .padding(Padding::horizontal(2));
        let inner = block.inner(card);
        frame.render_widget(block, card);

        let mut constraints = vec![Constraint::Length(1), Constraint::Length(1)];
        constraints.extend(self.fields.iter().map(|_| Constraint::Length(FIELD_HEIGHT)));
        constraints.extend([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
        ]);
        let rows = Layout::vertical(constraints).split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            self.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(title, rows[0]);

        let focus = self.focus;
        let busy = self.busy;
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.focused = i == focus;
            field.disabled = busy;
            field.render(frame, rows[2 + i]);
        }

        let n = self.fields.len();
        let feedback = if busy {
            Some(Span::styled("Please wait...", Style::default().fg(Color::Yellow)))
        } else if let Some(error) = &self.error {
            Some(Span::styled(error.as_str(), Style::default().fg(Color::Red)))
        } else {
            self.notice
                .as_deref()
                .map(|notice| Span::styled(notice, Style::default().fg(Color::Green)))
        };
        if let Some(span) = feedback {
            frame.render_widget(
                Paragraph::new(Line::from(span))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                rows[3 + n],
            );
        }

        let links: Vec<Line> = self
            .links
            .iter()
            .map(|(key, label)| {
                Line::from(vec![
                    Span::styled(*key, Style::default().fg(Color::Cyan)),
                    Span::raw("  "),
                    Span::styled(*label, Style::default().fg(Color::Gray)),
                ])
            })
            .collect();
        frame.render_widget(
            Paragraph::new(links).alignment(Alignment::Center),
            rows[5 + n],
        );
    }
}

impl EventHandler for AuthForm {
    type Event = FormEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.busy {
            return None;
        }
        match event {
            TuiEvent::NextField | TuiEvent::CursorDown => {
                self.focus_next();
                None
            }
            TuiEvent::PrevField | TuiEvent::CursorUp => {
                self.focus_prev();
                None
            }
            _ => {
                let field = self.fields.get_mut(self.focus)?;
                match field.handle_event(event)? {
                    FieldEvent::Submit => Some(FormEvent::Submit(self.values())),
                    FieldEvent::Changed => None,
                }
            }
        }
    }
}
