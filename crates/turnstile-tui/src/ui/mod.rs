//! UI rendering

pub mod components;
pub mod layout;
pub mod screens;
pub mod theme;

pub use theme::Theme;

use ratatui::prelude::*;

use crate::app::{AppState, Screen};

/// Main render function - delegates to appropriate screen
///
/// Clickable regions are re-recorded on every frame.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    state.hitboxes.clear();

    match state.screen() {
        Screen::Login => screens::login::render(frame, state, theme),
        Screen::Kiosk => screens::kiosk::render(frame, state, theme),
        Screen::Reports => screens::reports::render(frame, state, theme),
    }

    state.toast.render(frame, frame.area(), theme);
}
