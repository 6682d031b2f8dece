//! One-line feedback message

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};
use turnstile_core::StatusDisplay;

use crate::ui::Theme;

/// Render a [`StatusDisplay`]; nothing is drawn when it is empty
pub fn render(frame: &mut Frame, area: Rect, status: &StatusDisplay, theme: &Theme) {
    if status.is_empty() {
        return;
    }

    let paragraph = Paragraph::new(status.message.as_str())
        .style(theme.status(status.kind))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
