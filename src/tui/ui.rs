use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::state::{App, Route};
use crate::tui::component::Component;
use crate::tui::components::{ChatWindow, ConfirmDialog, Header, Sidebar};
use crate::tui::{Focus, TuiState};

const SIDEBAR_WIDTH: u16 = 28;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let area = frame.area();
    match app.effective_route() {
        Route::Home => draw_chat_page(frame, area, app, tui, spinner_frame),
        route => {
            let form = tui.form_mut(route, &app.forgot_step);
            form.error = app.error.clone();
            form.notice = app.notice.clone();
            form.busy = app.busy;
            form.render(frame, area);
        }
    }
}

fn draw_chat_page(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    tui: &mut TuiState,
    spinner_frame: usize,
) {
    use Constraint::{Length, Min};
    let [header_area, body_area, footer_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(area);
    let [sidebar_area, chat_area] =
        Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(body_area);

    let user_name = app.user().map(|u| u.name.as_str()).unwrap_or_default();
    Header {
        user_name,
        status_message: &app.status_message,
    }
    .render(frame, header_area);

    let overlay_open = app.new_room.is_some() || app.confirm_delete.is_some();
    Sidebar::new(
        &mut tui.sidebar,
        &app.rooms,
        app.selected_room_id(),
        !overlay_open && tui.focus == Focus::Sidebar,
    )
    .render(frame, sidebar_area);
    ChatWindow::new(
        &mut tui.chat,
        app.selected_room.as_ref(),
        &app.messages,
        app.is_awaiting_answer(),
        !overlay_open && tui.focus == Focus::Chat,
        spinner_frame,
    )
    .render(frame, chat_area);

    frame.render_widget(footer(app), footer_area);

    if let Some(status) = &app.new_room {
        tui.modal.status = status.clone();
        tui.modal.render(frame, area);
    }
    if let Some(room) = &app.confirm_delete {
        ConfirmDialog { room }.render(frame, area);
    }
}

/// Error, then notice, then key hints.
fn footer(app: &App) -> Paragraph<'_> {
    if let Some(error) = &app.error {
        return Paragraph::new(Line::from(vec![
            Span::styled(error.as_str(), Style::default().fg(Color::Red)),
            Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
        ]));
    }
    if let Some(notice) = &app.notice {
        return Paragraph::new(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Green),
        ));
    }
    Paragraph::new(Span::styled(
        "Tab Switch pane  Enter Open/Send  ^N New room  ^D Delete  ^C Quit",
        Style::default().fg(Color::DarkGray),
    ))
}

/// A `width` x `height` rect centered in `area`, shrunk to fit.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    use Constraint::{Fill, Length};
    let [_, middle, _] =
        Layout::vertical([Fill(1), Length(height.min(area.height)), Fill(1)]).areas(area);
    let [_, center, _] =
        Layout::horizontal([Fill(1), Length(width.min(area.width)), Fill(1)]).areas(middle);
    center
}
