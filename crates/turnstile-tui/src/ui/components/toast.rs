//! Transient result banner
//!
//! One message at a time, like the kiosk page's toast: a new message
//! replaces the current one and each stays up for [`TOAST_DURATION`].

use std::time::{Duration, Instant};

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use turnstile_core::StatusKind;

use crate::ui::Theme;

pub const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: StatusKind,
    until: Instant,
}

#[derive(Debug, Default)]
pub struct ToastSlot {
    current: Option<Toast>,
}

impl ToastSlot {
    pub fn show(&mut self, message: impl Into<String>, kind: StatusKind, now: Instant) {
        self.current = Some(Toast {
            message: message.into(),
            kind,
            until: now + TOAST_DURATION,
        });
    }

    /// Drop the message once its time is up
    pub fn expire(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|t| now >= t.until) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    /// Banner across the top of the content area
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(toast) = &self.current else {
            return;
        };

        let width = (toast.message.chars().count() as u16).saturating_add(4).min(area.width);
        let x = area.x + area.width.saturating_sub(width) / 2;
        let banner = Rect::new(x, area.y + 2, width, area.height.saturating_sub(2).min(3));

        frame.render_widget(Clear, banner);
        frame.render_widget(
            Paragraph::new(toast.message.as_str())
                .style(theme.toast(toast.kind))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).border_style(theme.toast(toast.kind))),
            banner,
        );
    }
}
