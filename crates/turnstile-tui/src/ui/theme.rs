//! Colors for the kiosk and report screens

use ratatui::style::{Color, Modifier, Style};
use turnstile_core::StatusKind;

/// Terminal palette
///
/// Royal blue carries the brand and informational toasts; the error red
/// matches the kiosk page's error toast.
pub struct Theme {
    pub primary: Color,
    pub primary_soft: Color,
    pub background: Color,
    pub error: Color,
    pub ok: Color,
    pub caution: Color,
    pub line: Color,
    pub ink: Color,
    pub ink_dim: Color,
    pub ink_faint: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Rgb(65, 105, 225),       // #4169E1
            primary_soft: Color::Rgb(150, 175, 240), // #96AFF0
            background: Color::Rgb(24, 26, 32),
            error: Color::Rgb(217, 83, 79), // #D9534F
            ok: Color::Rgb(92, 184, 92),    // #5CB85C
            caution: Color::Rgb(240, 173, 78),
            line: Color::Rgb(70, 74, 86),
            ink: Color::Rgb(236, 238, 242),
            ink_dim: Color::Rgb(170, 175, 186),
            ink_faint: Color::Rgb(110, 115, 128),
        }
    }
}

impl Theme {
    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.ink_dim)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.ink_faint)
    }

    pub fn text_highlight(&self) -> Style {
        Style::default().fg(self.primary_soft).add_modifier(Modifier::BOLD)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.line)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn danger(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.caution)
    }

    /// Inline feedback text
    pub fn status(&self, kind: StatusKind) -> Style {
        match kind {
            StatusKind::None => self.text_muted(),
            StatusKind::Info => Style::default().fg(self.primary_soft),
            StatusKind::Success => Style::default().fg(self.ok),
            StatusKind::Error => self.danger(),
        }
    }

    /// Toast banner: red for errors, blue for everything else
    pub fn toast(&self, kind: StatusKind) -> Style {
        let bg = match kind {
            StatusKind::Error => self.error,
            _ => self.primary,
        };
        Style::default().fg(Color::White).bg(bg).add_modifier(Modifier::BOLD)
    }

    pub fn menu_item(&self, selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(Color::White)
                .bg(self.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.ink)
        }
    }

    pub fn input(&self, focused: bool) -> Style {
        let fg = if focused { self.ink } else { self.ink_dim };
        Style::default().fg(fg).bg(self.background)
    }

    /// Disabled while its request is outstanding
    pub fn button(&self, enabled: bool) -> Style {
        if enabled {
            Style::default()
                .fg(Color::White)
                .bg(self.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.ink_faint).bg(self.line)
        }
    }

    pub fn logo(&self, raised: bool) -> Style {
        if raised {
            Style::default().fg(self.primary_soft).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.primary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_is_red_only_for_errors() {
        let theme = Theme::default();
        assert_eq!(theme.toast(StatusKind::Error).bg, Some(theme.error));
        assert_eq!(theme.toast(StatusKind::Success).bg, Some(theme.primary));
        assert_eq!(theme.toast(StatusKind::Info).bg, Some(theme.primary));
        assert_eq!(theme.status(StatusKind::Success).fg, Some(theme.ok));
        assert_ne!(theme.button(true), theme.button(false));
    }
}
