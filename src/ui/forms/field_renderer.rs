//! Field rendering utilities for forms

use crate::state::{FieldBinding, FieldValue, WidgetKind};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows of a multiline input, borders included
const MULTILINE_HEIGHT: u16 = 6;
/// Rows of a single line input, borders included
const SINGLE_LINE_HEIGHT: u16 = 3;

/// Everything needed to draw one bound field
pub struct FieldView<'a> {
    pub binding: &'a FieldBinding,
    pub value: Option<&'a FieldValue>,
    pub error: Option<&'a str>,
    pub is_active: bool,
    /// Path being typed into an asset field
    pub pending_input: &'a str,
}

/// Rows a field occupies, including its error line
pub fn field_height(binding: &FieldBinding, value: Option<&FieldValue>) -> u16 {
    let input = match binding.widget {
        WidgetKind::TextInput { multiline: true } => MULTILINE_HEIGHT,
        WidgetKind::AssetInput => {
            let files = value.map(FieldValue::len).unwrap_or(0) as u16;
            SINGLE_LINE_HEIGHT + files.min(4)
        }
        _ => SINGLE_LINE_HEIGHT,
    };
    input + 1
}

/// First field to draw so that `active` is visible within `available` rows
pub fn first_visible(heights: &[u16], active: usize, available: u16) -> usize {
    if heights.is_empty() {
        return 0;
    }
    let active = active.min(heights.len() - 1);
    let mut start = active;
    let mut used = heights[active];
    while start > 0 && used + heights[start - 1] <= available {
        start -= 1;
        used += heights[start];
    }
    start
}

/// Draw a bound field with its validation message underneath
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FieldView) {
    let is_active = field.is_active;
    let has_error = field.error.is_some();

    let border_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else if has_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if is_active { "▌" } else { "" };

    let display_value = field.value.map(FieldValue::display_value).unwrap_or_default();
    let display_str = if display_value.is_empty() && !is_active {
        "(empty)".to_string()
    } else {
        display_value
    };

    let lines: Vec<Line> = match field.binding.widget {
        WidgetKind::TextInput { multiline: true } => {
            let mut lines: Vec<Line> = display_str
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), style)))
                .collect();
            if is_active {
                if let Some(last) = lines.last_mut() {
                    last.spans
                        .push(Span::styled(cursor, Style::default().fg(Color::Cyan)));
                } else {
                    lines.push(Line::from(Span::styled(
                        cursor,
                        Style::default().fg(Color::Cyan),
                    )));
                }
            }
            lines
        }
        WidgetKind::Select => {
            let arrows = if is_active { ("◀ ", " ▶") } else { ("", "") };
            vec![Line::from(vec![
                Span::styled(arrows.0, Style::default().fg(Color::Cyan)),
                Span::styled(display_str, style),
                Span::styled(arrows.1, Style::default().fg(Color::Cyan)),
            ])]
        }
        WidgetKind::Toggle => vec![Line::from(Span::styled(display_str, style))],
        WidgetKind::AssetInput => {
            let mut lines: Vec<Line> = match field.value {
                Some(FieldValue::Assets(assets)) => assets
                    .iter()
                    .map(|a| Line::from(Span::styled(a.display_name(), style)))
                    .collect(),
                _ => Vec::new(),
            };
            if is_active {
                lines.push(Line::from(vec![
                    Span::styled("+ ", Style::default().fg(Color::Green)),
                    Span::styled(field.pending_input.to_string(), style),
                    Span::styled(cursor, Style::default().fg(Color::Cyan)),
                ]));
            } else if lines.is_empty() {
                lines.push(Line::from(Span::styled("(no files)", style)));
            }
            lines
        }
        WidgetKind::TextInput { multiline: false }
        | WidgetKind::NumberInput
        | WidgetKind::TagInput => vec![Line::from(vec![
            Span::styled(display_str, style),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ])],
    };

    let input_area = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    let block = Block::default()
        .title(format!(" {} ", field.binding.label))
        .borders(Borders::ALL)
        .border_style(border_style);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        input_area,
    );

    if let Some(error) = field.error {
        let error_area = Rect {
            y: area.y + input_area.height,
            height: 1,
            ..area
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {error}"),
                Style::default().fg(Color::Red),
            )),
            error_area,
        );
    }
}

/// Draw help text at the bottom of a form
pub fn draw_help_text(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Asset, PendingAsset};

    #[test]
    fn test_heights_include_error_line() {
        let title = FieldBinding::text("title", "Title");
        assert_eq!(field_height(&title, None), 4);
        let description = FieldBinding::multiline("description", "Description");
        assert_eq!(field_height(&description, None), 7);
        let media = FieldBinding::new("media", "Media", WidgetKind::AssetInput);
        let files = FieldValue::Assets(vec![Asset::Pending(PendingAsset::from_path("/tmp/a.jpg"))]);
        assert_eq!(field_height(&media, Some(&files)), 5);
    }

    #[test]
    fn test_first_visible_keeps_active_in_view() {
        let heights = [4, 4, 7, 4, 4];
        assert_eq!(first_visible(&heights, 0, 12), 0);
        assert_eq!(first_visible(&heights, 4, 12), 3);
        assert_eq!(first_visible(&heights, 2, 30), 0);
        assert_eq!(first_visible(&[], 3, 10), 0);
    }
}
