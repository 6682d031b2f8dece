//! reqwest implementation of the backend contracts

use async_trait::async_trait;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Client;

use super::{
    CheckForm, CheckinApi, LiveStats, LoginRequest, LoginResponse, Navigation, ReportApi,
    ReportResponse, StatusCheck,
};
use super::page::toast_from_page;
use crate::error::{ConfigError, TransportError};
use crate::reports::ReportRequest;

/// HTTP client for both the kiosk backend and the report backend
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    kiosk_base: String,
    report_base: String,
}

impl HttpClient {
    /// Create a client for the given origins
    ///
    /// No request timeout is configured; a request stays outstanding until
    /// the transport resolves it.
    pub fn new(kiosk_base: &str, report_base: &str) -> Result<Self, ConfigError> {
        let kiosk_base = validate_base(kiosk_base)?;
        let report_base = validate_base(report_base)?;

        let client = Client::builder()
            .user_agent(format!("turnstile/{}", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            kiosk_base,
            report_base,
        })
    }

    pub fn kiosk_base(&self) -> &str {
        &self.kiosk_base
    }

    pub fn report_base(&self) -> &str {
        &self.report_base
    }

    fn kiosk_url(&self, path: &str) -> String {
        format!("{}{}", self.kiosk_base, path)
    }
}

/// Check that a base URL parses and is http(s); returns it without a trailing slash
pub fn validate_base(base: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(base)
        .map_err(|e| ConfigError::Invalid(format!("Invalid base URL {:?}: {}", base, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(base.trim_end_matches('/').to_string()),
        other => Err(ConfigError::Invalid(format!(
            "Base URL must use http or https (got: {})",
            other
        ))),
    }
}

#[async_trait]
impl CheckinApi for HttpClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, TransportError> {
        let url = self.kiosk_url("/login");
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))
    }

    async fn check_status(&self, form: &CheckForm) -> Result<StatusCheck, TransportError> {
        let url = self.kiosk_url("/check-status");
        tracing::debug!("POST {} (role {})", url, form.role);

        let response = self.client.post(&url).form(form).send().await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))
    }

    async fn fetch_stats(&self) -> Result<LiveStats, TransportError> {
        let url = self.kiosk_url("/api/stats");
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))
    }

    async fn submit_check(&self, form: &CheckForm) -> Result<Navigation, TransportError> {
        let url = self.kiosk_url("/check");
        tracing::debug!("POST {} (form submission)", url);

        // Redirects are followed like a browser navigation; the cookie store
        // carries the flashed result across the redirect
        let response = self.client.post(&url).form(form).send().await?;
        let status = response.status().as_u16();
        let landed = response.url().to_string();

        let body = response.text().await?;
        let toast = toast_from_page(&body);
        match &toast {
            Some(toast) => {
                tracing::info!("Check-in result ({:?}): {}", toast.kind, toast.message)
            }
            None => tracing::warn!(
                "Check-in form landed on {} ({}) without a result message",
                landed,
                status
            ),
        }

        Ok(Navigation {
            status,
            url: landed,
            toast,
        })
    }
}

#[async_trait]
impl ReportApi for HttpClient {
    async fn fetch_report(&self, request: &ReportRequest) -> Result<ReportResponse, TransportError> {
        let url = request
            .url(&self.report_base)
            .map_err(|e| TransportError::Unreachable(format!("Invalid report URL: {}", e)))?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response.bytes().await?.to_vec();
        tracing::debug!("Report response {} ({} bytes)", status, body.len());

        Ok(ReportResponse {
            status,
            content_disposition,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_non_http_scheme() {
        assert!(HttpClient::new("ftp://example.com", "http://localhost:5001").is_err());
    }

    #[test]
    fn test_client_rejects_garbage_url() {
        assert!(HttpClient::new("not-a-url", "http://localhost:5001").is_err());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = HttpClient::new("http://localhost:5000/", "http://localhost:5001").unwrap();
        assert_eq!(client.kiosk_base(), "http://localhost:5000");
        assert_eq!(client.kiosk_url("/login"), "http://localhost:5000/login");
    }
}
