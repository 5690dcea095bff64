//! Blocking progress overlay shown while a submission runs

use super::base::{render_dialog, DialogConfig};
use ratatui::{style::Color, Frame};

pub fn render_progress_dialog(frame: &mut Frame, message: &str) {
    render_dialog(
        frame,
        DialogConfig {
            title: "Submitting",
            title_color: Color::Yellow,
            border_color: Color::Yellow,
            message,
            hint: None,
            max_width: 50,
        },
    );
}
