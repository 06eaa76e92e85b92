//! Yes/no guard shown before a room is deleted.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::api::Room;
use crate::tui::component::Component;
use crate::tui::ui::centered_fixed;

pub struct ConfirmDialog<'a> {
    pub room: &'a Room,
}

impl ConfirmDialog<'_> {
    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete the room \"{}\"? (y/n)",
            self.room.title
        )
    }
}

impl Component for ConfirmDialog<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_fixed(56, 6, area);
        frame.render_widget(Clear, overlay);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red))
            .title(" Delete Room ")
            .title_bottom(Line::from(" y Delete  n/Esc Cancel ").centered())
            .padding(Padding::horizontal(1));
        frame.render_widget(
            Paragraph::new(self.prompt())
                .wrap(Wrap { trim: true })
                .block(block),
            overlay,
        );
    }
}
