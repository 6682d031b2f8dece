//! Report request and download controller
//!
//! Each report tile owns one request cycle at a time: it disables its own
//! trigger, shows a busy message, fetches the generated file and saves it
//! under the name the backend suggests. Tiles are independent of each
//! other and may have requests outstanding at the same time.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::{ReportApi, ReportResponse};
use crate::error::{CheckinError, StorageError};
use crate::status::StatusDisplay;

/// Name used when the backend does not suggest one
pub const DEFAULT_FILENAME: &str = "report.xlsx";

const MSG_NO_DATE: &str = "Please select a date first.";
const MSG_BAD_DATE: &str = "Please enter the date as YYYY-MM-DD.";
const MSG_BUSY: &str = "Connecting to server and generating report...";
const MSG_IN_PROGRESS: &str = "Report request already in progress.";
const MSG_CONNECTION: &str =
    "Connection Error: Could not connect to the backend server. Please ensure it is running.";

/// Available reports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    DailyStudentCount,
    DailySummary,
    WeeklySummary,
    FullLogDump,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::DailyStudentCount,
        ReportKind::DailySummary,
        ReportKind::WeeklySummary,
        ReportKind::FullLogDump,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            ReportKind::DailyStudentCount => "/report/daily_student_count",
            ReportKind::DailySummary => "/report/daily_summary",
            ReportKind::WeeklySummary => "/report/weekly_summary",
            ReportKind::FullLogDump => "/report/full_log_dump",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::DailyStudentCount => "Number of Students",
            ReportKind::DailySummary => "Daily Summarized Report",
            ReportKind::WeeklySummary => "Weekly Report",
            ReportKind::FullLogDump => "Download Full Log",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReportKind::DailyStudentCount => "Visitor count for a single day",
            ReportKind::DailySummary => "Entries and exits for a single day",
            ReportKind::WeeklySummary => "Summary of the week containing the date",
            ReportKind::FullLogDump => "Every logged entry as a spreadsheet",
        }
    }

    /// Whether the tile has a date input
    pub fn needs_date(&self) -> bool {
        !matches!(self, ReportKind::FullLogDump)
    }
}

/// One fetch/download cycle's parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRequest {
    pub endpoint: String,
    pub params: Option<BTreeMap<String, String>>,
}

impl ReportRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// `base + endpoint`, with the parameters URL-encoded into the query
    pub fn url(&self, base: &str) -> Result<url::Url, url::ParseError> {
        let mut url = url::Url::parse(&format!("{}{}", base.trim_end_matches('/'), self.endpoint))?;
        if let Some(params) = &self.params {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

/// Extract the quoted `filename="..."` token of a `Content-Disposition` value
pub fn filename_from_disposition(header: &str) -> Option<String> {
    const TOKEN: &str = "filename=\"";
    let start = header.find(TOKEN)? + TOKEN.len();
    let rest = &header[start..];
    let end = rest.find('"')?;
    let name = &rest[..end];
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Destination for downloaded payloads
pub trait DownloadSink: Send + Sync {
    /// Persist `body` under `filename`; returns where it went
    fn save(&self, filename: &str, body: &[u8]) -> Result<PathBuf, StorageError>;
}

/// Saves downloads into a directory, never overwriting
#[derive(Clone, Debug)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// First free path for `filename`, appending " (n)" before the extension
    fn free_path(&self, filename: &str) -> PathBuf {
        let candidate = self.dir.join(filename);
        if !candidate.exists() {
            return candidate;
        }

        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        let ext = path.extension().and_then(|e| e.to_str());

        (1u32..)
            .map(|n| match ext {
                Some(ext) => self.dir.join(format!("{} ({}).{}", stem, n, ext)),
                None => self.dir.join(format!("{} ({})", stem, n)),
            })
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }
}

impl DownloadSink for DirectoryDownloads {
    fn save(&self, filename: &str, body: &[u8]) -> Result<PathBuf, StorageError> {
        // Only the final component of a suggested name is honoured
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FILENAME);

        fs::create_dir_all(&self.dir)?;
        let path = self.free_path(name);
        fs::write(&path, body)?;
        Ok(path)
    }
}

/// A saved report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Downloaded {
    /// Name resolved from the response
    pub filename: String,
    /// Where the file was written
    pub path: PathBuf,
}

impl Downloaded {
    pub fn success_message(&self) -> String {
        format!(
            "Success! Your report \"{}\" has started downloading.",
            self.filename
        )
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Turn a report response into a saved file or a rejection
pub fn handle_report_response(
    response: ReportResponse,
    sink: &dyn DownloadSink,
) -> Result<Downloaded, CheckinError> {
    if !response.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&response.body)
            .ok()
            .and_then(|b| b.error)
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed (Status: {}).", response.status));
        tracing::warn!("Report request rejected ({}): {}", response.status, message);
        return Err(CheckinError::Rejected(message));
    }

    let filename = match response
        .content_disposition
        .as_deref()
        .and_then(filename_from_disposition)
    {
        Some(name) => name,
        None => {
            tracing::warn!(
                "Report response carried no usable Content-Disposition filename ({:?}), saving as {}",
                response.content_disposition,
                DEFAULT_FILENAME
            );
            DEFAULT_FILENAME.to_string()
        }
    };

    let path = sink.save(&filename, &response.body).map_err(|e| {
        tracing::error!("Failed to save report {}: {}", filename, e);
        CheckinError::Rejected(format!("Could not save report: {}", e))
    })?;

    tracing::info!("Saved report {} to {:?}", filename, path);
    Ok(Downloaded { filename, path })
}

/// Fetch a report and save it
pub async fn fetch_and_download(
    api: &dyn ReportApi,
    sink: &dyn DownloadSink,
    request: &ReportRequest,
) -> Result<Downloaded, CheckinError> {
    match api.fetch_report(request).await {
        Ok(response) => handle_report_response(response, sink),
        Err(e) => {
            tracing::warn!("Report fetch error: {}", e);
            Err(connection_error())
        }
    }
}

fn connection_error() -> CheckinError {
    CheckinError::Transport(MSG_CONNECTION.to_string())
}

/// Connectivity failure for a request whose task died before reporting
pub fn lost_request(e: impl std::fmt::Display) -> CheckinError {
    tracing::error!("Report request task failed: {}", e);
    connection_error()
}

/// One report tile: input, trigger and feedback area
#[derive(Clone, Debug)]
pub struct ReportTile {
    pub kind: ReportKind,
    /// Raw date input, `YYYY-MM-DD`
    pub date_input: String,
    pub status: StatusDisplay,
    busy: bool,
    expanded: bool,
}

impl ReportTile {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            date_input: String::new(),
            status: StatusDisplay::new(),
            busy: false,
            expanded: false,
        }
    }

    /// Whether the trigger is disabled by an outstanding request
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Validate inputs and build this tile's request, without side effects
    pub fn build_request(&self) -> Result<ReportRequest, CheckinError> {
        let request = ReportRequest::new(self.kind.endpoint());
        if !self.kind.needs_date() {
            return Ok(request);
        }

        let date = self.date_input.trim();
        if date.is_empty() {
            return Err(CheckinError::Validation(MSG_NO_DATE.to_string()));
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| CheckinError::Validation(MSG_BAD_DATE.to_string()))?;

        Ok(request.with_param("date", date))
    }

    /// Start a request cycle: validate, disable the trigger, show busy
    pub fn begin(&mut self) -> Result<ReportRequest, CheckinError> {
        if self.busy {
            return Err(CheckinError::Validation(MSG_IN_PROGRESS.to_string()));
        }

        let request = match self.build_request() {
            Ok(request) => request,
            Err(e) => {
                self.status.error(e.to_string());
                return Err(e);
            }
        };

        self.busy = true;
        self.status.info(MSG_BUSY);
        Ok(request)
    }

    /// End a request cycle: re-enable the trigger and show the outcome
    pub fn complete(&mut self, outcome: &Result<Downloaded, CheckinError>) {
        self.busy = false;
        match outcome {
            Ok(downloaded) => self.status.success(downloaded.success_message()),
            Err(e) => self.status.error(e.to_string()),
        }
    }

    /// Run a full request cycle on this tile
    pub async fn request_report(
        &mut self,
        api: &dyn ReportApi,
        sink: &dyn DownloadSink,
    ) -> Result<Downloaded, CheckinError> {
        let request = self.begin()?;
        let outcome = fetch_and_download(api, sink, &request).await;
        self.complete(&outcome);
        outcome
    }

    fn collapse(&mut self) {
        self.expanded = false;
        self.status.clear();
    }
}

/// The admin report grid
#[derive(Clone, Debug)]
pub struct ReportBoard {
    tiles: Vec<ReportTile>,
    grid_visible: bool,
}

impl Default for ReportBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBoard {
    pub fn new() -> Self {
        Self {
            tiles: ReportKind::ALL.iter().copied().map(ReportTile::new).collect(),
            grid_visible: false,
        }
    }

    pub fn tiles(&self) -> &[ReportTile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&ReportTile> {
        self.tiles.get(index)
    }

    pub fn tile_mut(&mut self, index: usize) -> Option<&mut ReportTile> {
        self.tiles.get_mut(index)
    }

    pub fn is_grid_visible(&self) -> bool {
        self.grid_visible
    }

    /// Index of the expanded tile
    pub fn expanded(&self) -> Option<usize> {
        self.tiles.iter().position(|t| t.expanded)
    }

    /// Show or hide the grid; hiding collapses every tile
    pub fn toggle_grid(&mut self) {
        if self.grid_visible {
            self.hide_grid();
        } else {
            self.grid_visible = true;
        }
    }

    pub fn hide_grid(&mut self) {
        self.grid_visible = false;
        self.collapse_all();
    }

    /// Expand a tile, collapsing the others, or collapse it if already open
    pub fn toggle_tile(&mut self, index: usize) {
        if index >= self.tiles.len() {
            return;
        }

        let was_expanded = self.tiles[index].expanded;
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            if i != index && tile.expanded {
                tile.collapse();
            }
        }

        if was_expanded {
            self.tiles[index].collapse();
        } else {
            self.tiles[index].expanded = true;
        }
    }

    pub fn collapse_all(&mut self) {
        for tile in self.tiles.iter_mut().filter(|t| t.expanded) {
            tile.collapse();
        }
    }

    /// End the request cycle of tile `index`
    ///
    /// The trigger is always re-enabled. Feedback is shown only if the tile
    /// is still open; a tile collapsed meanwhile stays blank.
    pub fn complete_tile(&mut self, index: usize, outcome: &Result<Downloaded, CheckinError>) {
        let Some(tile) = self.tiles.get_mut(index) else {
            return;
        };
        if tile.expanded {
            tile.complete(outcome);
        } else {
            tile.busy = false;
            tile.status.clear();
        }
    }
}
