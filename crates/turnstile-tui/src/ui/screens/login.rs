//! Staff login prompt shown until a session is established

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use turnstile_core::LockoutPolicy;

use crate::app::{AppState, LoginField};
use crate::ui::components::status_line;
use crate::ui::layout::{centered_rect_fixed, render_footer, render_header, ScreenLayout};
use crate::ui::Theme;
use crate::utils::mask;

/// Draw the login screen
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let layout = ScreenLayout::new(frame.area());
    render_header(frame, layout.header, "Staff Login", theme);

    let locked = state.gate.lockout_remaining().is_some();
    let dialog = centered_rect_fixed(52, 15, layout.content);

    let (title, border) = if locked {
        (" Locked ", theme.danger())
    } else {
        (" Authentication Required ", theme.border_focused())
    };
    let block = Block::default()
        .title(title)
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(border);

    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Instructions
            Constraint::Length(3), // ID
            Constraint::Length(3), // Password
            Constraint::Length(2), // Message
            Constraint::Min(0),    // Attempts warning
        ])
        .split(inner);

    let instructions = if state.gate.is_in_flight() {
        "Verifying credentials..."
    } else {
        "Sign in to open the check-in kiosk"
    };
    frame.render_widget(
        Paragraph::new(instructions)
            .style(theme.text_secondary())
            .alignment(Alignment::Center),
        chunks[0],
    );

    render_field(
        frame,
        chunks[1],
        "ID",
        &state.login.id,
        state.login.focus == LoginField::Id && !locked,
        theme,
    );
    render_field(
        frame,
        chunks[2],
        "Password",
        &mask(&state.login.password),
        state.login.focus == LoginField::Password && !locked,
        theme,
    );

    status_line::render(frame, chunks[3], &state.gate.message, theme);

    let failed = state.gate.attempts().failed_attempts;
    let max = LockoutPolicy::default().max_attempts;
    if failed > 0 && !locked {
        let left = max.saturating_sub(failed);
        let warning = format!(
            "⚠ {} attempt{} remaining before lockout",
            left,
            if left == 1 { "" } else { "s" }
        );
        frame.render_widget(
            Paragraph::new(warning)
                .style(theme.warning())
                .alignment(Alignment::Center),
            chunks[4],
        );
    }

    let hints = &[("Tab", "Switch field"), ("Enter", "Sign in"), ("Ctrl+C", "Quit")];
    render_footer(frame, layout.footer, hints, theme);
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .title(format!(" {} ", label))
        .title_style(theme.text_secondary())
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.border_focused()
        } else {
            theme.border()
        });

    let cursor = if focused { "▏" } else { "" };
    let field = Paragraph::new(format!("{}{}", value, cursor))
        .style(theme.input(focused))
        .block(block);
    frame.render_widget(field, area);
}
