//! Action buttons of the wizard panel

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Render a wizard action with its keyboard shortcut.
///
/// Disabled actions are greyed out but keep their shortcut visible.
pub fn render_action_button(
    frame: &mut Frame,
    area: Rect,
    shortcut: &str,
    label: &str,
    accent: Color,
    is_enabled: bool,
) {
    let color = if is_enabled { accent } else { Color::DarkGray };

    let line = Line::from(vec![
        Span::styled(shortcut, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            label,
            if is_enabled {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            },
        ),
    ]);

    let button = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(button, area);
}
