//! UI module for rendering the TUI

mod components;
mod forms;
mod home;
mod layout;

use crate::app::App;
use crate::state::View;
use components::render_error_dialog;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (main_area, status_area) = layout::create_layout(frame.area());

    match app.state.current_view {
        View::Home => home::draw(frame, main_area, app),
        View::Wizard => forms::draw_wizard(frame, main_area, app),
    }

    layout::draw_status_bar(frame, status_area, app);

    // Error dialog overlays everything
    if let Some(error) = app.state.current_error() {
        render_error_dialog(frame, error, app.state.error_count());
    }
}
