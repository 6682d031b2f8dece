//! Session gate with failure-count lockout
//!
//! The gate decides at startup whether a persisted session is still valid.
//! If not, it accepts credential submissions until one succeeds, locking
//! the prompt for a fixed window after too many consecutive failures.

use chrono::{DateTime, Duration, Local, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{CheckinApi, LoginRequest, LoginResponse};
use crate::clock::Clock;
use crate::error::{CheckinError, TransportError};
use crate::status::StatusDisplay;
use crate::storage::KeyValueStore;

/// Store key holding the persisted session
pub const SESSION_KEY: &str = "studentSession";

const MSG_MISSING_CREDENTIALS: &str = "Enter ID and password.";
const MSG_INVALID_CREDENTIALS: &str = "Invalid credentials.";
const MSG_CONNECTION: &str = "Login failed. Please check connection.";
const MSG_IN_PROGRESS: &str = "Login already in progress.";

/// Persisted proof of a successful login
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    pub expiry: DateTime<Utc>,
}

impl Session {
    /// Session for `subject_id` lasting until the end of the local day
    pub fn until_end_of_day(subject_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            subject_id: subject_id.into(),
            expiry: end_of_day(now),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry > now
    }
}

/// 23:59:59.999 local time on the day containing `now`
pub fn end_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let last_instant = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    now.with_timezone(&Local)
        .date_naive()
        .and_time(last_instant)
        .and_local_timezone(Local)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        // Unrepresentable local time (DST edge): fall back to a day from now
        .unwrap_or(now + Duration::days(1))
}

/// Lockout policy for failed logins
#[derive(Clone, Debug)]
pub struct LockoutPolicy {
    /// Consecutive failures that trigger the lockout
    pub max_attempts: u32,
    /// How long the prompt stays locked
    pub duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            duration: Duration::minutes(15),
        }
    }
}

/// In-memory login attempt counter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginAttemptState {
    pub failed_attempts: u32,
    pub lockout_until: Option<DateTime<Utc>>,
}

impl LoginAttemptState {
    fn reset(&mut self) {
        self.failed_attempts = 0;
        self.lockout_until = None;
    }
}

/// Whole seconds left until `until`, rounded up
pub fn remaining_seconds(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (until - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis as u64).div_ceil(1000)
    }
}

/// Startup gate in front of the kiosk flow
pub struct SessionGate<S: KeyValueStore, C: Clock> {
    store: S,
    clock: C,
    policy: LockoutPolicy,
    attempts: LoginAttemptState,
    session: Option<Session>,
    in_flight: bool,
    /// Message shown under the credential prompt
    pub message: StatusDisplay,
}

impl<S: KeyValueStore, C: Clock> SessionGate<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_policy(store, clock, LockoutPolicy::default())
    }

    pub fn with_policy(store: S, clock: C, policy: LockoutPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            attempts: LoginAttemptState::default(),
            session: None,
            in_flight: false,
            message: StatusDisplay::new(),
        }
    }

    /// Read the persisted session; returns whether the prompt can be skipped
    pub fn initialize(&mut self) -> bool {
        let now = self.clock.now();

        let stored = match self.store.get(SESSION_KEY) {
            Ok(Some(value)) => match serde_json::from_value::<Session>(value) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable stored session: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read session store: {}", e);
                None
            }
        };

        self.session = stored.filter(|s| s.is_valid_at(now));
        match &self.session {
            Some(session) => {
                tracing::info!("Resuming session for {} until {}", session.subject_id, session.expiry);
                true
            }
            None => false,
        }
    }

    /// Authenticated session, if one is valid right now
    pub fn session(&self) -> Option<&Session> {
        let now = self.clock.now();
        self.session.as_ref().filter(|s| s.is_valid_at(now))
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn attempts(&self) -> &LoginAttemptState {
        &self.attempts
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Seconds of lockout left, `None` when not locked
    pub fn lockout_remaining(&self) -> Option<u64> {
        let now = self.clock.now();
        self.attempts
            .lockout_until
            .filter(|until| now < *until)
            .map(|until| remaining_seconds(until, now))
    }

    /// Clear an elapsed lockout window
    fn expire_lockout(&mut self) {
        if let Some(until) = self.attempts.lockout_until {
            if self.clock.now() >= until {
                tracing::info!("Login lockout elapsed");
                self.attempts.reset();
                self.message.clear();
            }
        }
    }

    /// One-second countdown tick
    ///
    /// Refreshes the lockout message while locked and returns it. When the
    /// window closes the message is cleared and the counter reset.
    pub fn tick(&mut self) -> Option<String> {
        self.attempts.lockout_until?;
        self.expire_lockout();

        let remaining = self.lockout_remaining()?;
        let text = CheckinError::LockedOut {
            remaining_secs: remaining,
        }
        .to_string();
        self.message.error(text.clone());
        Some(text)
    }

    /// Validate a login attempt and build its request
    ///
    /// Fails locally, without producing a request, while locked out, while
    /// another attempt is outstanding, or when a field is blank.
    pub fn begin_login(&mut self, id: &str, password: &str) -> Result<LoginRequest, CheckinError> {
        self.expire_lockout();

        if let Some(remaining_secs) = self.lockout_remaining() {
            let err = CheckinError::LockedOut { remaining_secs };
            self.message.error(err.to_string());
            return Err(err);
        }

        if self.in_flight {
            return Err(CheckinError::Validation(MSG_IN_PROGRESS.to_string()));
        }

        let id = id.trim();
        let pass = password.trim();
        if id.is_empty() || pass.is_empty() {
            self.message.error(MSG_MISSING_CREDENTIALS);
            return Err(CheckinError::Validation(MSG_MISSING_CREDENTIALS.to_string()));
        }

        self.in_flight = true;
        Ok(LoginRequest {
            id: id.to_string(),
            pass: pass.to_string(),
        })
    }

    /// Apply the outcome of the request built by [`begin_login`](Self::begin_login)
    pub fn finish_login(
        &mut self,
        request: &LoginRequest,
        outcome: Result<LoginResponse, TransportError>,
    ) -> Result<Session, CheckinError> {
        self.in_flight = false;

        match outcome {
            Ok(LoginResponse { success: true }) => Ok(self.complete_login(&request.id)),
            Ok(LoginResponse { success: false }) => Err(self.record_failure()),
            Err(TransportError::Malformed(e)) => {
                tracing::warn!("Malformed login response: {}", e);
                Err(self.record_failure())
            }
            Err(TransportError::Unreachable(e)) => {
                tracing::warn!("Login request failed: {}", e);
                self.message.error(MSG_CONNECTION);
                Err(CheckinError::Transport(MSG_CONNECTION.to_string()))
            }
        }
    }

    /// Submit credentials and wait for the backend's verdict
    pub async fn attempt_login(
        &mut self,
        api: &dyn CheckinApi,
        id: &str,
        password: &str,
    ) -> Result<Session, CheckinError> {
        let request = self.begin_login(id, password)?;
        let outcome = api.login(&request).await;
        self.finish_login(&request, outcome)
    }

    fn complete_login(&mut self, subject_id: &str) -> Session {
        self.attempts.reset();
        self.message.clear();

        let session = Session::until_end_of_day(subject_id, self.clock.now());
        match serde_json::to_value(&session) {
            Ok(value) => {
                if let Err(e) = self.store.set(SESSION_KEY, value) {
                    tracing::error!("Failed to persist session: {}", e);
                }
            }
            Err(e) => tracing::error!("Failed to serialize session: {}", e),
        }

        tracing::info!("Logged in as {} until {}", session.subject_id, session.expiry);
        self.session = Some(session.clone());
        session
    }

    fn record_failure(&mut self) -> CheckinError {
        self.attempts.failed_attempts += 1;
        self.message.error(MSG_INVALID_CREDENTIALS);
        tracing::warn!(
            "Login rejected ({} consecutive failures)",
            self.attempts.failed_attempts
        );

        if self.attempts.failed_attempts >= self.policy.max_attempts {
            let until = self.clock.now() + self.policy.duration;
            self.attempts.lockout_until = Some(until);
            tracing::warn!("Login locked until {}", until);
        }

        CheckinError::Rejected(MSG_INVALID_CREDENTIALS.to_string())
    }
}
