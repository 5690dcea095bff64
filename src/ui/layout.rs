//! Layout components (content area, status bar)

use crate::app::App;
use crate::state::{NotificationLevel, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split the screen into content and a one-line status bar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    (chunks[0], chunks[1])
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    // Connection status
    let conn_status = if app.state.backend_connected {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ○ ", Style::default().fg(Color::Red))
    };
    spans.push(conn_status);

    spans.push(Span::styled(
        get_view_hints(app.state.current_view),
        Style::default().fg(Color::Gray),
    ));

    if let Some(notification) = &app.state.notification {
        let color = match notification.level {
            NotificationLevel::Info => Color::Cyan,
            NotificationLevel::Success => Color::Green,
            NotificationLevel::Error => Color::LightRed,
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(&notification.message, Style::default().fg(color)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);

    let quit_hint = " ^C:quit ";
    let quit_area = Rect {
        x: area.x + area.width.saturating_sub(quit_hint.len() as u16),
        width: (quit_hint.len() as u16).min(area.width),
        ..area
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the current view
fn get_view_hints(view: View) -> String {
    use crate::platform::{BACK_SHORTCUT, DRAFT_SHORTCUT, NEXT_SHORTCUT, SUBMIT_SHORTCUT};

    match view {
        View::Home => "j/k:nav  Enter:open  r:refresh  q:quit".to_string(),
        View::Wizard => format!(
            "{NEXT_SHORTCUT}:next  {BACK_SHORTCUT}:back  Alt+1-9:jump  \
             {SUBMIT_SHORTCUT}:submit  {DRAFT_SHORTCUT}:draft  Esc:cancel"
        ),
    }
}
