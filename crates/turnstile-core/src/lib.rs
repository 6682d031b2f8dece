//! Turnstile Core - Client-side controllers for library check-in kiosks
//!
//! This crate provides the interaction layer shared by the Turnstile kiosk
//! and admin terminals: the session gate with login lockout, the check-in
//! flow state machine, the live stats poller and the report download
//! controller. Rendering is left to the host (see `turnstile-tui`).

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod kiosk;
pub mod reports;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod status;
pub mod storage;

pub use api::{
    CheckForm, CheckinApi, HttpClient, LiveStats, PageToast, ReportApi, ReportResponse, StatusCheck,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TurnstileConfig;
pub use error::{CheckinError, ConfigError, StorageError, TransportError};
pub use kiosk::{KioskController, KioskEffect, KioskFlowState, KioskInput, KioskKey};
pub use reports::{DirectoryDownloads, DownloadSink, ReportBoard, ReportKind, ReportRequest, ReportTile};
pub use scheduler::Scheduler;
pub use session::{LockoutPolicy, LoginAttemptState, Session, SessionGate};
pub use stats::LiveStatsDisplay;
pub use status::{StatusDisplay, StatusKind};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Role whose enrollment code is five digits long
pub const STUDENT_ROLE: &str = "Student";

/// Enrollment digits expected for the student role
pub const STUDENT_CODE_LENGTH: usize = 5;

/// Enrollment digits expected for every other role
pub const STAFF_CODE_LENGTH: usize = 4;

/// Expected enrollment code length for a role
pub fn expected_length(role: &str) -> usize {
    if role == STUDENT_ROLE {
        STUDENT_CODE_LENGTH
    } else {
        STAFF_CODE_LENGTH
    }
}
