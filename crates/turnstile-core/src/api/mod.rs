//! Backend request/response contracts
//!
//! The controllers talk to the backend only through [`CheckinApi`] and
//! [`ReportApi`], so tests can substitute recording fakes for the reqwest
//! client in [`http`].

pub mod http;
pub mod page;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::reports::ReportRequest;

pub use http::HttpClient;
pub use page::PageToast;

/// `POST /login` body
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub id: String,
    pub pass: String,
}

/// `POST /login` response
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
}

/// `POST /check-status` response
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCheck {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /api/stats` response
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiveStats {
    pub total_entries_today: u64,
    pub currently_inside: u64,
    pub peak_hour_today: String,
}

/// Fields of the terminal check-in form submission
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckForm {
    pub registry_last_digits: String,
    pub role: String,
}

/// Where a form submission landed after redirects
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub status: u16,
    pub url: String,
    /// Result message flashed onto the landing page
    pub toast: Option<PageToast>,
}

/// Raw report response
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportResponse {
    pub status: u16,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl ReportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Kiosk-side backend operations
#[async_trait]
pub trait CheckinApi: Send + Sync {
    /// Verify credentials
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, TransportError>;

    /// Ask whether an enrollment code and role may check in or out
    async fn check_status(&self, form: &CheckForm) -> Result<StatusCheck, TransportError>;

    /// Read today's counters
    async fn fetch_stats(&self) -> Result<LiveStats, TransportError>;

    /// Submit the check-in form and follow the resulting navigation
    async fn submit_check(&self, form: &CheckForm) -> Result<Navigation, TransportError>;
}

/// Admin-side report download
#[async_trait]
pub trait ReportApi: Send + Sync {
    async fn fetch_report(&self, request: &ReportRequest) -> Result<ReportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_check_without_error_field() {
        let parsed: StatusCheck = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(parsed.success);
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_login_response_missing_success_reads_as_failure() {
        let parsed: LoginResponse = serde_json::from_str("{}").unwrap();
        assert!(!parsed.success);
    }

    #[test]
    fn test_live_stats_wire_names() {
        let parsed: LiveStats = serde_json::from_str(
            r#"{"total_entries_today": 120, "currently_inside": 17, "peak_hour_today": "11:00"}"#,
        )
        .unwrap();
        assert_eq!(parsed.total_entries_today, 120);
        assert_eq!(parsed.currently_inside, 17);
        assert_eq!(parsed.peak_hour_today, "11:00");
    }

    #[test]
    fn test_report_response_success_range() {
        let mut response = ReportResponse {
            status: 200,
            ..Default::default()
        };
        assert!(response.is_success());
        response.status = 404;
        assert!(!response.is_success());
    }
}
