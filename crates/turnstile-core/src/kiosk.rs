//! Check-in flow state machine
//!
//! The kiosk walks a visitor from the idle logo screen through role
//! selection to enrollment code entry, then asks the backend whether the
//! code may check in or out. Pointer clicks, keystrokes, timer expiries and
//! server replies all enter through one transition function, which is the
//! only code that mutates the controller.
//!
//! Side effects are returned as [`KioskEffect`] values for the host to
//! perform; their results come back as [`KioskInput::StatusChecked`].

use std::time::{Duration, Instant};

use crate::api::{CheckForm, StatusCheck};
use crate::error::TransportError;
use crate::expected_length;
use crate::scheduler::Scheduler;

/// Entrance animation before the role panel appears
pub const OPEN_DELAY: Duration = Duration::from_millis(400);

/// Feedback pause after a pointer role selection
pub const SELECT_DELAY: Duration = Duration::from_millis(200);

/// Collapse animation before returning to idle
pub const CLOSE_DELAY: Duration = Duration::from_millis(500);

const MSG_REJECTED: &str = "Invalid user or role.";
const MSG_SYSTEM_ERROR: &str = "System error. Please try again.";

/// Default role options
pub fn default_roles() -> Vec<String> {
    vec!["Student".to_string(), "Faculty".to_string()]
}

/// Keep only digits, at most `max_len` of them
pub fn sanitize_digits(raw: &str, max_len: usize) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).take(max_len).collect()
}

/// Step of the check-in flow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KioskFlowState {
    #[default]
    Idle,
    RoleSelect,
    EnrollmentEntry,
}

/// Keys the kiosk reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KioskKey {
    Enter,
    Escape,
    Up,
    Down,
    Backspace,
    Char(char),
}

/// Inbound message to the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KioskInput {
    /// Pointer activation of the logo
    ClickLogo,
    /// Pointer activation of a role option
    ClickRole(usize),
    /// Pointer activation of the submit button
    ClickSubmit,
    Key(KioskKey),
    /// Whole-field replacement of the enrollment input (paste)
    Edit(String),
    /// Reply to a [`KioskEffect::CheckStatus`]
    StatusChecked {
        ticket: u64,
        outcome: Result<StatusCheck, TransportError>,
    },
}

/// Work the host must perform
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KioskEffect {
    /// Issue `POST /check-status` and report back with the same ticket
    CheckStatus { ticket: u64, form: CheckForm },
    /// Perform the navigating form submission; the flow is over
    SubmitForm(CheckForm),
}

/// Delayed transitions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Open,
    Select,
    Close,
}

enum Message {
    Input(KioskInput),
    Fired(Step),
}

/// Single kiosk flow instance
#[derive(Debug)]
pub struct KioskController {
    roles: Vec<String>,
    state: KioskFlowState,
    selected_role_index: usize,
    enrollment_digits: String,
    error: Option<String>,
    panel_visible: bool,
    logo_raised: bool,
    scheduler: Scheduler<Step>,
    pending: Option<Step>,
    check_ticket: Option<u64>,
    next_ticket: u64,
    navigating: bool,
}

impl Default for KioskController {
    fn default() -> Self {
        Self::new(default_roles())
    }
}

impl KioskController {
    /// Create a controller for the given role options
    ///
    /// An empty role list falls back to [`default_roles`].
    pub fn new(roles: Vec<String>) -> Self {
        let roles = if roles.is_empty() {
            tracing::warn!("No roles configured, using defaults");
            default_roles()
        } else {
            roles
        };

        Self {
            roles,
            state: KioskFlowState::Idle,
            selected_role_index: 0,
            enrollment_digits: String::new(),
            error: None,
            panel_visible: false,
            logo_raised: false,
            scheduler: Scheduler::new(),
            pending: None,
            check_ticket: None,
            next_ticket: 0,
            navigating: false,
        }
    }

    pub fn state(&self) -> KioskFlowState {
        self.state
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn selected_role_index(&self) -> usize {
        self.selected_role_index
    }

    pub fn selected_role(&self) -> &str {
        &self.roles[self.selected_role_index]
    }

    /// Digits the current role requires
    pub fn expected_length(&self) -> usize {
        expected_length(self.selected_role())
    }

    pub fn enrollment_digits(&self) -> &str {
        &self.enrollment_digits
    }

    /// Error text attached to the enrollment field
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the selection panel is shown
    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    /// Whether the logo is in its enlarged entrance pose
    pub fn logo_raised(&self) -> bool {
        self.logo_raised
    }

    /// Whether the "press to start" prompt is shown
    pub fn prompt_visible(&self) -> bool {
        !self.logo_raised
    }

    /// Whether a status check is outstanding
    pub fn is_checking(&self) -> bool {
        self.check_ticket.is_some()
    }

    /// Whether a delayed transition is in its window
    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the terminal form submission has been issued
    pub fn is_navigating(&self) -> bool {
        self.navigating
    }

    /// When the host should next call [`poll`](Self::poll)
    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Feed an input event
    pub fn handle(&mut self, input: KioskInput, now: Instant) -> Option<KioskEffect> {
        self.transition(Message::Input(input), now)
    }

    /// Fire delayed transitions that are due
    pub fn poll(&mut self, now: Instant) -> Option<KioskEffect> {
        let mut effect = None;
        for (_, step) in self.scheduler.take_due(now) {
            if let Some(e) = self.transition(Message::Fired(step), now) {
                effect = Some(e);
            }
        }
        effect
    }

    fn transition(&mut self, message: Message, now: Instant) -> Option<KioskEffect> {
        if self.navigating {
            return None;
        }

        match message {
            Message::Fired(step) => {
                self.fire(step);
                None
            }
            Message::Input(KioskInput::ClickLogo) => {
                self.open(now);
                None
            }
            Message::Input(KioskInput::ClickRole(index)) => {
                self.click_role(index, now);
                None
            }
            Message::Input(KioskInput::ClickSubmit) => self.submit(),
            Message::Input(KioskInput::Key(key)) => self.key(key, now),
            Message::Input(KioskInput::Edit(raw)) => {
                self.edit(|_| raw);
                None
            }
            Message::Input(KioskInput::StatusChecked { ticket, outcome }) => {
                self.status_checked(ticket, outcome)
            }
        }
    }

    fn key(&mut self, key: KioskKey, now: Instant) -> Option<KioskEffect> {
        match key {
            KioskKey::Escape => {
                self.cancel(now);
                None
            }
            KioskKey::Enter => match self.state {
                KioskFlowState::Idle => {
                    self.open(now);
                    None
                }
                KioskFlowState::RoleSelect => {
                    if self.accepts_input() {
                        self.state = KioskFlowState::EnrollmentEntry;
                    }
                    None
                }
                KioskFlowState::EnrollmentEntry => self.submit(),
            },
            KioskKey::Up | KioskKey::Down => {
                if self.state == KioskFlowState::RoleSelect && self.accepts_input() {
                    let count = self.roles.len();
                    self.selected_role_index = if key == KioskKey::Down {
                        (self.selected_role_index + 1) % count
                    } else {
                        (self.selected_role_index + count - 1) % count
                    };
                }
                None
            }
            KioskKey::Backspace => {
                self.edit(|current| {
                    let mut value = current.to_string();
                    value.pop();
                    value
                });
                None
            }
            KioskKey::Char(c) => {
                self.edit(|current| format!("{}{}", current, c));
                None
            }
        }
    }

    /// Panel shown, no delayed step pending
    fn accepts_input(&self) -> bool {
        self.panel_visible && self.pending.is_none()
    }

    fn open(&mut self, now: Instant) {
        if self.state != KioskFlowState::Idle || self.pending.is_some() {
            return;
        }

        self.logo_raised = true;
        self.pending = Some(Step::Open);
        self.scheduler.schedule(now, OPEN_DELAY, Step::Open);
    }

    fn click_role(&mut self, index: usize, now: Instant) {
        if self.state != KioskFlowState::RoleSelect || !self.accepts_input() {
            return;
        }
        if index >= self.roles.len() {
            return;
        }

        self.selected_role_index = index;
        self.pending = Some(Step::Select);
        self.scheduler.schedule(now, SELECT_DELAY, Step::Select);
    }

    fn cancel(&mut self, now: Instant) {
        if self.state == KioskFlowState::Idle || self.pending == Some(Step::Close) {
            return;
        }

        // Pending selection and outstanding status check both become stale
        self.scheduler.invalidate();
        self.check_ticket = None;
        self.panel_visible = false;
        self.pending = Some(Step::Close);
        self.scheduler.schedule(now, CLOSE_DELAY, Step::Close);
    }

    fn fire(&mut self, step: Step) {
        if self.pending != Some(step) {
            return;
        }
        self.pending = None;

        match step {
            Step::Open => {
                self.panel_visible = true;
                self.state = KioskFlowState::RoleSelect;
            }
            Step::Select => {
                if self.state == KioskFlowState::RoleSelect {
                    self.state = KioskFlowState::EnrollmentEntry;
                }
            }
            Step::Close => self.reset(),
        }
    }

    fn reset(&mut self) {
        self.state = KioskFlowState::Idle;
        self.selected_role_index = 0;
        self.enrollment_digits.clear();
        self.error = None;
        self.panel_visible = false;
        self.logo_raised = false;
        self.check_ticket = None;
    }

    fn edit(&mut self, change: impl FnOnce(&str) -> String) {
        if self.state != KioskFlowState::EnrollmentEntry
            || !self.accepts_input()
            || self.check_ticket.is_some()
        {
            return;
        }

        let raw = change(&self.enrollment_digits);
        self.enrollment_digits = sanitize_digits(&raw, self.expected_length());
        self.error = None;
    }

    fn submit(&mut self) -> Option<KioskEffect> {
        if self.state != KioskFlowState::EnrollmentEntry
            || !self.accepts_input()
            || self.check_ticket.is_some()
        {
            return None;
        }

        let expected = self.expected_length();
        if self.enrollment_digits.len() != expected {
            self.error = Some(format!("Please enter exactly {} digits.", expected));
            return None;
        }
        self.error = None;

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.check_ticket = Some(ticket);

        tracing::debug!("Checking status for role {}", self.selected_role());
        Some(KioskEffect::CheckStatus {
            ticket,
            form: self.form(),
        })
    }

    fn status_checked(
        &mut self,
        ticket: u64,
        outcome: Result<StatusCheck, TransportError>,
    ) -> Option<KioskEffect> {
        if self.check_ticket != Some(ticket) {
            tracing::debug!("Ignoring stale status check reply {}", ticket);
            return None;
        }
        self.check_ticket = None;

        match outcome {
            Ok(StatusCheck { success: true, .. }) => {
                tracing::info!("Status check passed, submitting check-in form");
                self.navigating = true;
                Some(KioskEffect::SubmitForm(self.form()))
            }
            Ok(StatusCheck { error, .. }) => {
                let message = error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| MSG_REJECTED.to_string());
                tracing::warn!("Status check rejected: {}", message);
                self.error = Some(message);
                None
            }
            Err(e) => {
                tracing::warn!("Status check failed: {}", e);
                self.error = Some(MSG_SYSTEM_ERROR.to_string());
                None
            }
        }
    }

    fn form(&self) -> CheckForm {
        CheckForm {
            registry_last_digits: self.enrollment_digits.clone(),
            role: self.selected_role().to_string(),
        }
    }
}
