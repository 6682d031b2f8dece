//! In-process check-in and report backend for end-to-end tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use turnstile_core::HttpClient;

/// Staff credentials the backend accepts
pub const STAFF_ID: &str = "lib01";
pub const STAFF_PASS: &str = "open-sesame";

/// Enrollment recognised by `/check-status`
pub const KNOWN_DIGITS: &str = "12345";

/// Date for which the report backend has no data
pub const EMPTY_DATE: &str = "2025-08-01";

/// Visitor name behind [`KNOWN_DIGITS`]
pub const KNOWN_NAME: &str = "Ada O'Neil";

/// Flashed when the library is closed
pub const CLOSED_MESSAGE: &str = "Library closed. Hours: 7 AM - 8 PM";

/// Payload served for every successful report
pub const REPORT_BYTES: &[u8] = b"PK\x03\x04 fake spreadsheet";

/// One request seen by the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hit {
    pub path: String,
    pub fields: HashMap<String, String>,
}

/// Shared request log
#[derive(Clone, Default)]
pub struct Backend {
    hits: Arc<Mutex<Vec<Hit>>>,
    closed: Arc<AtomicBool>,
}

impl Backend {
    fn record(&self, path: &str, fields: HashMap<String, String>) {
        self.hits.lock().unwrap().push(Hit {
            path: path.to_string(),
            fields,
        });
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    /// Requests made to `path`
    pub fn count(&self, path: &str) -> usize {
        self.hits().iter().filter(|h| h.path == path).count()
    }

    pub fn paths(&self) -> Vec<String> {
        self.hits().into_iter().map(|h| h.path).collect()
    }

    /// Refuse entries from now on, as outside opening hours
    pub fn close_library(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A running backend and a client pointed at it
pub struct TestServer {
    pub backend: Backend,
    pub base_url: String,
    pub client: HttpClient,
}

/// Serve the backend on an ephemeral local port
pub async fn spawn_backend() -> TestServer {
    let backend = Backend::default();
    let app = Router::new()
        .route("/", get(index))
        .route("/login", post(login))
        .route("/check-status", post(check_status))
        .route("/check", post(check))
        .route("/api/stats", get(stats))
        .route("/report/daily_student_count", get(broken_report))
        .route("/report/daily_summary", get(daily_summary))
        .route("/report/weekly_summary", get(weekly_summary))
        .route("/report/full_log_dump", get(full_log_dump))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base_url = format!("http://{}", addr);
    let client = HttpClient::new(&base_url, &base_url).unwrap();
    TestServer {
        backend,
        base_url,
        client,
    }
}

/// A client whose backend refuses connections
pub async fn unreachable_client() -> HttpClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    HttpClient::new(&base_url, &base_url).unwrap()
}

async fn login(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    let id = body["id"].as_str().unwrap_or_default().to_string();
    let pass = body["pass"].as_str().unwrap_or_default().to_string();
    let success = id == STAFF_ID && pass == STAFF_PASS;

    backend.record("/login", HashMap::from([("id".to_string(), id)]));
    Json(json!({ "success": success }))
}

async fn check_status(
    State(backend): State<Backend>,
    Form(fields): Form<HashMap<String, String>>,
) -> Json<Value> {
    let known = fields.get("registry_last_digits").map(String::as_str) == Some(KNOWN_DIGITS)
        && fields.get("role").map(String::as_str) == Some("Student");
    backend.record("/check-status", fields);

    if known {
        Json(json!({ "success": true }))
    } else {
        Json(json!({ "success": false, "error": "No matching enrollment found." }))
    }
}

/// Record the entry and flash its outcome onto the index page
async fn check(
    State(backend): State<Backend>,
    Form(fields): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let flash = if backend.closed.load(Ordering::SeqCst) {
        "closed"
    } else {
        "welcome"
    };
    backend.record("/check", fields);
    (
        [(header::SET_COOKIE, format!("flash={}; Path=/", flash))],
        Redirect::to("/"),
    )
}

/// Index page; renders and consumes the flashed message
async fn index(headers: HeaderMap) -> Response {
    let flash = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| pair.trim().strip_prefix("flash="))
        .map(str::to_string);

    let (message, kind) = match flash.as_deref() {
        Some("welcome") => (
            format!("Welcome! {} entered the library.", KNOWN_NAME.replace('\'', "&#39;")),
            "success",
        ),
        Some("closed") => (CLOSED_MESSAGE.to_string(), "error"),
        _ => (String::new(), "info"),
    };

    let page = format!(
        r#"<html><body><div id="toast" class="toast" data-message="{}" data-type="{}"></div><h1>Library</h1></body></html>"#,
        message, kind
    );
    (
        [(header::SET_COOKIE, "flash=; Path=/; Max-Age=0")],
        Html(page),
    )
        .into_response()
}

async fn stats(State(backend): State<Backend>) -> Json<Value> {
    backend.record("/api/stats", HashMap::new());
    Json(json!({
        "total_entries_today": 42,
        "currently_inside": 17,
        "peak_hour_today": "11:00 - 12:00"
    }))
}

fn spreadsheet(filename: Option<&str>) -> Response {
    match filename {
        Some(name) => (
            [(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            )],
            REPORT_BYTES,
        )
            .into_response(),
        None => REPORT_BYTES.into_response(),
    }
}

async fn daily_summary(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let date = params.get("date").cloned().unwrap_or_default();
    backend.record("/report/daily_summary", params);

    if date == EMPTY_DATE {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No data for this date" })),
        )
            .into_response();
    }
    spreadsheet(Some(&format!("daily_summary_{}.xlsx", date)))
}

async fn weekly_summary(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let date = params.get("date").cloned().unwrap_or_default();
    backend.record("/report/weekly_summary", params);
    spreadsheet(Some(&format!("weekly_{}.xlsx", date)))
}

async fn full_log_dump(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    backend.record("/report/full_log_dump", params);
    spreadsheet(None)
}

async fn broken_report(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    backend.record("/report/daily_student_count", params);
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>Internal Server Error</html>").into_response()
}
