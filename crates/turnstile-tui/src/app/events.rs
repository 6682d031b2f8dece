//! Results of background requests, delivered to the UI loop

use tokio::sync::mpsc;
use turnstile_core::api::{LoginRequest, LoginResponse, Navigation, StatusCheck};
use turnstile_core::reports::Downloaded;
use turnstile_core::{CheckinError, TransportError};

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// `POST /login` resolved
    LoginFinished {
        request: LoginRequest,
        outcome: Result<LoginResponse, TransportError>,
    },
    /// `POST /check-status` resolved
    StatusChecked {
        ticket: u64,
        outcome: Result<StatusCheck, TransportError>,
    },
    /// The check-in form submission resolved
    Navigated(Result<Navigation, TransportError>),
    /// A report tile's request cycle ended
    ReportFinished {
        index: usize,
        outcome: Result<Downloaded, CheckinError>,
    },
}

/// Channel pair carrying [`AppEvent`]s from spawned tasks
pub struct EventHandler {
    sender: mpsc::UnboundedSender<AppEvent>,
    receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Get a clone of the sender for other tasks to send events
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.sender.clone()
    }

    /// Try to receive the next event (non-blocking)
    pub fn try_recv(&mut self) -> Option<AppEvent> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_delivers_in_order() {
        let mut events = EventHandler::new();
        let sender = events.sender();

        sender
            .send(AppEvent::Navigated(Err(TransportError::Unreachable("x".into()))))
            .unwrap();
        sender
            .send(AppEvent::StatusChecked {
                ticket: 7,
                outcome: Ok(StatusCheck::default()),
            })
            .unwrap();

        assert!(matches!(events.try_recv(), Some(AppEvent::Navigated(Err(_)))));
        assert!(matches!(
            events.try_recv(),
            Some(AppEvent::StatusChecked { ticket: 7, .. })
        ));
        assert!(events.try_recv().is_none());
    }
}
