//! Live occupancy counters shown above the kiosk flow

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use turnstile_core::LiveStatsDisplay;

use crate::ui::Theme;

/// Render the three counters side by side
pub fn render(frame: &mut Frame, area: Rect, stats: &LiveStatsDisplay, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let counters = [
        ("Entries Today", stats.entries_today.as_str()),
        ("Currently Inside", stats.currently_inside.as_str()),
        ("Peak Hour", stats.peak_hour_today.as_str()),
    ];

    for (chunk, (label, value)) in chunks.iter().zip(counters) {
        let block = Block::default()
            .title(format!(" {} ", label))
            .title_style(theme.text_secondary())
            .borders(Borders::ALL)
            .border_style(theme.border());

        let value = Paragraph::new(value)
            .style(theme.text_highlight())
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(value, *chunk);
    }
}
