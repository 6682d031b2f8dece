//! Per-panel feedback message

/// Feedback severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StatusKind {
    #[default]
    None,
    Info,
    Success,
    Error,
}

/// Message area attached to one panel or tile
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusDisplay {
    pub message: String,
    pub kind: StatusKind,
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the message
    pub fn update(&mut self, message: impl Into<String>, kind: StatusKind) {
        self.message = message.into();
        self.kind = kind;
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.update(message, StatusKind::Info);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.update(message, StatusKind::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.update(message, StatusKind::Error);
    }

    pub fn clear(&mut self) {
        self.message.clear();
        self.kind = StatusKind::None;
    }

    pub fn is_empty(&self) -> bool {
        self.kind == StatusKind::None
    }
}
