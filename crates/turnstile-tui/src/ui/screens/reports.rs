//! Admin report tiles

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use turnstile_core::ReportTile;

use crate::app::AppState;
use crate::ui::components::status_line;
use crate::ui::layout::{centered_rect_fixed, render_footer, render_header, section_block, ScreenLayout};
use crate::ui::Theme;

/// Height of a collapsed tile
const COLLAPSED_HEIGHT: u16 = 3;

/// Height of the expanded tile
const EXPANDED_HEIGHT: u16 = 9;

/// Draw the reports screen
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let layout = ScreenLayout::new(frame.area());
    render_header(frame, layout.header, "Reports", theme);

    if !state.board.is_grid_visible() {
        let area = centered_rect_fixed(50, 3, layout.content);
        frame.render_widget(
            Paragraph::new("Press [g] to show the report grid")
                .style(theme.text_muted())
                .alignment(Alignment::Center),
            area,
        );
        render_footer(frame, layout.footer, &[("g", "Show reports"), ("q", "Quit")], theme);
        return;
    }

    let constraints: Vec<Constraint> = state
        .board
        .tiles()
        .iter()
        .map(|t| {
            Constraint::Length(if t.is_expanded() {
                EXPANDED_HEIGHT
            } else {
                COLLAPSED_HEIGHT
            })
        })
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(layout.content);

    for index in 0..state.board.tiles().len() {
        let area = rows[index];
        let focused = index == state.tile_index;
        let Some(tile) = state.board.tile(index) else {
            continue;
        };

        let button = render_tile(frame, area, tile, focused, theme);
        state.hitboxes.tiles.push(area);
        if let Some(button) = button {
            state.hitboxes.tile_buttons.push((index, button));
        }
    }

    let hints: &[(&str, &str)] = if state.board.expanded().is_some() {
        &[("Enter", "Generate"), ("Esc", "Close"), ("g", "Hide reports")]
    } else {
        &[("↑/↓", "Navigate"), ("Enter", "Open"), ("g", "Hide reports"), ("q", "Quit")]
    };
    render_footer(frame, layout.footer, hints, theme);
}

/// Render one tile; returns the trigger's area when expanded
fn render_tile(
    frame: &mut Frame,
    area: Rect,
    tile: &ReportTile,
    focused: bool,
    theme: &Theme,
) -> Option<Rect> {
    let block = section_block(tile.kind.title(), focused, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !tile.is_expanded() {
        frame.render_widget(
            Paragraph::new(tile.kind.description()).style(theme.text_muted()),
            inner,
        );
        return None;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Description
            Constraint::Length(2), // Date input
            Constraint::Length(1), // Button
            Constraint::Min(1),    // Status
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(tile.kind.description()).style(theme.text_secondary()),
        chunks[0],
    );

    if tile.kind.needs_date() {
        let value = if tile.date_input.is_empty() {
            Span::styled("YYYY-MM-DD", theme.text_muted())
        } else {
            Span::styled(tile.date_input.as_str(), theme.input(true))
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Date: ", theme.text_secondary()),
                value,
                Span::styled("▏", theme.text_highlight()),
            ])),
            chunks[1],
        );
    }

    let label = if tile.is_busy() {
        " Working... "
    } else {
        " Generate Report "
    };
    let button = Rect::new(
        chunks[2].x,
        chunks[2].y,
        (label.chars().count() as u16).min(chunks[2].width),
        chunks[2].height,
    );
    frame.render_widget(Paragraph::new(label).style(theme.button(!tile.is_busy())), button);

    status_line::render(frame, chunks[3], &tile.status, theme);

    Some(button)
}
