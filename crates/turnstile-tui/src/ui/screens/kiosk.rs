//! Check-in kiosk: logo, role selection and enrollment entry

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use turnstile_core::KioskFlowState;

use crate::app::AppState;
use crate::ui::components::stats_strip;
use crate::ui::layout::{centered_rect_fixed, render_footer, render_header, section_block, ScreenLayout};
use crate::ui::Theme;
use crate::utils::digit_slots;

const LOGO: [&str; 3] = ["▛▀▀▀▀▀▀▀▀▀▀▀▜", "▌  LIBRARY  ▐", "▙▄▄▄▄▄▄▄▄▄▄▄▟"];

/// Draw the kiosk screen
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let layout = ScreenLayout::new(frame.area());
    render_header(frame, layout.header, "Check-In / Check-Out", theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Live stats
            Constraint::Length(7), // Logo
            Constraint::Length(1), // Prompt
            Constraint::Min(6),    // Selection panel
        ])
        .split(layout.content);

    stats_strip::render(frame, chunks[0], &state.stats, theme);
    render_logo(frame, chunks[1], state, theme);

    if state.kiosk.prompt_visible() {
        frame.render_widget(
            Paragraph::new("Press Enter or click the logo to begin")
                .style(theme.text_muted())
                .alignment(Alignment::Center),
            chunks[2],
        );
    }

    if state.kiosk.panel_visible() {
        match state.kiosk.state() {
            KioskFlowState::RoleSelect => render_roles(frame, chunks[3], state, theme),
            KioskFlowState::EnrollmentEntry => render_enrollment(frame, chunks[3], state, theme),
            KioskFlowState::Idle => {}
        }
    }

    let hints: &[(&str, &str)] = match state.kiosk.state() {
        KioskFlowState::Idle => &[("Enter", "Start")],
        KioskFlowState::RoleSelect => &[("↑/↓", "Choose role"), ("Enter", "Select"), ("Esc", "Cancel")],
        KioskFlowState::EnrollmentEntry => &[("0-9", "Digits"), ("Enter", "Submit"), ("Esc", "Cancel")],
    };
    render_footer(frame, layout.footer, hints, theme);
}

fn render_logo(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let raised = state.kiosk.logo_raised();
    let (width, height) = if raised { (23, 7) } else { (19, 5) };
    let logo_area = centered_rect_fixed(width, height, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if raised {
            BorderType::Double
        } else {
            BorderType::Rounded
        })
        .border_style(theme.logo(raised));

    let lines: Vec<Line> = LOGO.iter().map(|l| Line::from(*l)).collect();
    let logo = Paragraph::new(lines)
        .style(theme.logo(raised))
        .alignment(Alignment::Center)
        .block(block);

    frame.render_widget(logo, logo_area);
    state.hitboxes.logo = Some(logo_area);
}

fn render_roles(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let roles = state.kiosk.roles().len() as u16;
    let panel = centered_rect_fixed(36, roles + 4, area);

    let block = section_block("Who are you?", true, theme);
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let selected = state.kiosk.selected_role_index();
    for (i, role) in state.kiosk.roles().iter().enumerate() {
        let y = inner.y + 1 + i as u16;
        if y >= inner.y + inner.height {
            break;
        }
        let row = Rect::new(inner.x, y, inner.width, 1);
        let marker = if i == selected { "▸ " } else { "  " };

        frame.render_widget(
            Paragraph::new(format!("{}{}", marker, role)).style(theme.menu_item(i == selected)),
            row,
        );
        state.hitboxes.roles.push(row);
    }
}

fn render_enrollment(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let panel = centered_rect_fixed(44, 10, area);
    let block = section_block("Enrollment Number", true, theme);
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Role
            Constraint::Length(2), // Digits
            Constraint::Length(2), // Error
            Constraint::Length(1), // Button
            Constraint::Min(0),
        ])
        .split(inner);

    let expected = state.kiosk.expected_length();
    frame.render_widget(
        Paragraph::new(format!(
            "{}: last {} digits of your registry number",
            state.kiosk.selected_role(),
            expected
        ))
        .style(theme.text_secondary())
        .alignment(Alignment::Center),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(digit_slots(state.kiosk.enrollment_digits(), expected))
            .style(theme.text_highlight())
            .alignment(Alignment::Center),
        chunks[1],
    );

    if let Some(error) = state.kiosk.error() {
        frame.render_widget(
            Paragraph::new(error)
                .style(theme.danger())
                .alignment(Alignment::Center),
            chunks[2],
        );
    }

    let checking = state.kiosk.is_checking() || state.kiosk.is_navigating();
    let label = if checking { " Checking... " } else { " Submit " };
    let button = centered_rect_fixed(label.chars().count() as u16, 1, chunks[3]);
    frame.render_widget(Paragraph::new(label).style(theme.button(!checking)), button);
    state.hitboxes.submit = Some(button);
}
