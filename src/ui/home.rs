//! Home view: what to create, edit or resume

use crate::app::App;
use crate::state::HomeAction;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let prompt_height = if app.state.service_id_input.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(prompt_height)])
        .split(area);

    let actions = app.state.home_actions();
    let items: Vec<ListItem> = actions
        .iter()
        .enumerate()
        .map(|(index, (action, label))| {
            let selected = index == app.state.home_index;
            let color = match action {
                HomeAction::ResumeDraft(_) => Color::Yellow,
                HomeAction::EditService | HomeAction::EditTaxonomy(_) => Color::Blue,
                _ => Color::White,
            };
            let style = if selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            };
            ListItem::new(Line::from(Span::styled(format!(" {label}"), style)))
        })
        .collect();

    let title = format!(
        " Marketplace ({} draft(s)) ",
        app.state.drafts.len()
    );
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    // Stateful rendering keeps the selection scrolled into view
    let mut list_state = ListState::default().with_selected(Some(app.state.home_index));
    frame.render_stateful_widget(list, chunks[0], &mut list_state);

    if let Some(input) = &app.state.service_id_input {
        let prompt = Paragraph::new(Line::from(vec![
            Span::styled(input.as_str(), Style::default().fg(Color::Cyan)),
            Span::styled("▌", Style::default().fg(Color::Cyan)),
        ]))
        .block(
            Block::default()
                .title(" Service id (Enter:open  Esc:cancel) ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(prompt, chunks[1]);
    }
}
