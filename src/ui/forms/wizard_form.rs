//! Stepped wizard page: step header, bound fields and action panel

use super::field_renderer::{draw_field, draw_help_text, field_height, first_visible, FieldView};
use crate::app::App;
use crate::platform;
use crate::state::FieldBinding;
use crate::ui::components::{render_action_button, render_progress_dialog, BUTTON_HEIGHT};
use crate::wizard::{StepKind, Wizard};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draw the active wizard
pub fn draw_wizard(frame: &mut Frame, area: Rect, app: &App) {
    let Some(wizard) = app.state.wizard.as_ref() else {
        return;
    };

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(40),    // Form area
            Constraint::Length(22), // Action panel
        ])
        .split(area);

    draw_form(frame, main_chunks[0], app, wizard);
    draw_action_panel(frame, main_chunks[1], wizard);

    if wizard.is_pending() {
        render_progress_dialog(frame, "Uploading media and saving, please wait...");
    }
}

fn draw_form(frame: &mut Frame, area: Rect, app: &App, wizard: &Wizard) {
    let dirty = if wizard.form().is_dirty() { " *" } else { "" };
    let block = Block::default()
        .title(format!(" {}{dirty} ", wizard.blueprint().title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Step indicator
            Constraint::Min(0),    // Fields
            Constraint::Length(1), // Help text
        ])
        .split(inner);

    draw_step_indicator(frame, chunks[0], wizard);

    let bindings = wizard.bindings();
    if bindings.is_empty() {
        frame.render_widget(
            Paragraph::new("Nothing to fill in on this step")
                .style(Style::default().fg(Color::DarkGray)),
            chunks[1],
        );
    } else {
        draw_fields(frame, chunks[1], app, wizard, &bindings);
    }

    draw_help_text(frame, chunks[2], &step_help(wizard.current_kind()));
}

fn draw_step_indicator(frame: &mut Frame, area: Rect, wizard: &Wizard) {
    let state = wizard.state();
    let mut spans = Vec::new();
    for step in 1..=state.total() {
        let marker = if state.is_completed(step) { "✓" } else { "" };
        let label = format!(" {step}{marker} {} ", wizard.step_title(step));
        let style = if step == wizard.current_step() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if state.is_completed(step) {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(label, style));
    }

    let optional = match wizard.current_kind() {
        Some(kind) if kind.is_optional() => " (optional)",
        _ => "",
    };
    let lines = vec![
        Line::from(spans),
        Line::from(Span::styled(
            format!("Step {} of {}{optional}", state.current(), state.total()),
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_fields(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    wizard: &Wizard,
    bindings: &[FieldBinding],
) {
    let form = wizard.form();
    let heights: Vec<u16> = bindings
        .iter()
        .map(|b| field_height(b, form.get_path(&b.path)))
        .collect();
    let start = first_visible(&heights, app.state.active_field, area.height);

    let mut y = area.y;
    for (index, binding) in bindings.iter().enumerate().skip(start) {
        let height = heights[index];
        if y + height > area.y + area.height {
            break;
        }
        let field_area = Rect {
            x: area.x,
            y,
            width: area.width,
            height,
        };
        let view = FieldView {
            binding,
            value: form.get_path(&binding.path),
            error: form.error_for(&binding.path),
            is_active: index == app.state.active_field,
            pending_input: &app.state.asset_path_input,
        };
        draw_field(frame, field_area, &view);
        y += height;
    }
}

fn step_help(kind: Option<StepKind>) -> String {
    let extra = match kind {
        Some(StepKind::Addons { .. }) => "  ^A:add  ^X:remove last",
        Some(StepKind::Media { .. }) => "  type a path, Enter:attach  Bksp:remove",
        _ => "",
    };
    format!("Tab:next field  ←/→:choose  Space:toggle{extra}")
}

fn draw_action_panel(frame: &mut Frame, area: Rect, wizard: &Wizard) {
    let block = Block::default()
        .title(" Actions ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(BUTTON_HEIGHT), // Next / Submit
            Constraint::Length(BUTTON_HEIGHT), // Back
            Constraint::Length(BUTTON_HEIGHT), // Save draft
            Constraint::Length(BUTTON_HEIGHT), // Cancel
            Constraint::Min(0),
        ])
        .split(inner);

    let state = wizard.state();
    if state.is_last() {
        render_action_button(
            frame,
            chunks[0],
            platform::SUBMIT_SHORTCUT,
            "Submit",
            Color::Green,
            wizard.can_submit(),
        );
    } else {
        render_action_button(
            frame,
            chunks[0],
            platform::NEXT_SHORTCUT,
            "Next",
            Color::Cyan,
            true,
        );
    }
    render_action_button(
        frame,
        chunks[1],
        platform::BACK_SHORTCUT,
        "Back",
        Color::Blue,
        state.current() > 1,
    );
    render_action_button(
        frame,
        chunks[2],
        platform::DRAFT_SHORTCUT,
        "Save draft",
        Color::Yellow,
        wizard.form().is_dirty(),
    );
    render_action_button(frame, chunks[3], "Esc", "Cancel", Color::Gray, true);
}
