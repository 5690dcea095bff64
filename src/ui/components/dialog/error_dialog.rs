//! Error dialog component

use super::base::{render_dialog, DialogConfig};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};

/// Render the oldest queued error; `queued` counts all pending errors
pub fn render_error_dialog(frame: &mut Frame, error_message: &str, queued: usize) {
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut hint = vec![
        Span::styled("Enter", key),
        Span::raw("/"),
        Span::styled("Esc", key),
        Span::raw(" dismiss"),
    ];
    if queued > 1 {
        hint.push(Span::styled(
            format!("  ({} more)", queued - 1),
            Style::default().fg(Color::DarkGray),
        ));
    }

    render_dialog(
        frame,
        DialogConfig {
            title: "Error",
            title_color: Color::Red,
            border_color: Color::Red,
            message: error_message,
            hint: Some(hint),
            max_width: 60,
        },
    );
}
