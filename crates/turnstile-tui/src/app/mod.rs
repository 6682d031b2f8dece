//! Application state and event handling

mod events;
mod state;

pub use events::{AppEvent, EventHandler};
pub use state::{AppState, Hitboxes, LoginField, LoginForm, Screen, Surface};

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use turnstile_core::api::{CheckinApi, LiveStats};
use turnstile_core::reports::{fetch_and_download, lost_request};
use turnstile_core::stats::spawn_stats_poller;
use turnstile_core::{
    DirectoryDownloads, FileStore, HttpClient, KioskController, KioskEffect, KioskInput, KioskKey,
    StatusKind, TurnstileConfig,
};

use crate::ui::{self, Theme};
use crate::utils::display_path;

/// UI refresh and timer resolution
const TICK_RATE: Duration = Duration::from_millis(50);

/// Lockout countdown period
const COUNTDOWN_RATE: Duration = Duration::from_secs(1);

/// Shown when the landing page flashed nothing back
const MSG_SUBMITTED: &str = "Check-in submitted.";

/// Main application struct
pub struct App {
    pub state: AppState,
    pub theme: Theme,
    pub should_quit: bool,
    config: TurnstileConfig,
    api: Arc<HttpClient>,
    downloads: Arc<DirectoryDownloads>,
    events: EventHandler,
    stats_rx: Option<mpsc::UnboundedReceiver<LiveStats>>,
    stats_task: Option<JoinHandle<()>>,
}

impl App {
    /// Create a new application instance
    pub fn new(surface: Surface, config: TurnstileConfig) -> Result<Self> {
        let api = Arc::new(HttpClient::new(
            &config.kiosk_base_url,
            &config.report_base_url,
        )?);
        let downloads = Arc::new(DirectoryDownloads::new(config.download_dir.clone()));
        let store = FileStore::new(config.session_file.clone());

        tracing::info!(
            "Starting {:?} surface (kiosk {}, reports {})",
            surface,
            api.kiosk_base(),
            api.report_base()
        );

        Ok(Self {
            state: AppState::new(surface, store, config.roles.clone()),
            theme: Theme::default(),
            should_quit: false,
            config,
            api,
            downloads,
            events: EventHandler::new(),
            stats_rx: None,
            stats_task: None,
        })
    }

    /// Run the application main loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        // A restored session opens straight onto the kiosk
        if self.state.screen() == Screen::Kiosk {
            self.start_stats();
        }

        let mut input = EventStream::new();
        let mut ticker = tokio::time::interval(TICK_RATE);
        let mut countdown = tokio::time::interval(COUNTDOWN_RATE);

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, &mut self.state, &self.theme))?;

            tokio::select! {
                maybe_event = input.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_terminal_event(event),
                    Some(Err(e)) => return Err(e.into()),
                    None => self.should_quit = true,
                },
                _ = ticker.tick() => self.on_tick(),
                _ = countdown.tick() => self.on_countdown(),
            }

            self.drain_events();
        }

        if let Some(task) = self.stats_task.take() {
            task.abort();
        }
        Ok(())
    }

    fn start_stats(&mut self) {
        if self.stats_task.is_some() {
            return;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let api: Arc<dyn CheckinApi> = self.api.clone();
        self.stats_task = Some(spawn_stats_poller(api, self.config.stats_interval(), tx));
        self.stats_rx = Some(rx);
    }

    fn on_tick(&mut self) {
        let now = Instant::now();
        self.state.toast.expire(now);

        if let Some(effect) = self.state.kiosk.poll(now) {
            self.perform(effect);
        }
    }

    fn on_countdown(&mut self) {
        if self.state.screen() == Screen::Login {
            self.state.gate.tick();
        }
    }

    /// Apply everything background tasks have reported
    fn drain_events(&mut self) {
        while let Some(event) = self.events.try_recv() {
            self.handle_app_event(event);
        }

        if let Some(rx) = self.stats_rx.as_mut() {
            while let Ok(stats) = rx.try_recv() {
                self.state.stats.apply(&stats);
            }
        }
    }

    fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(text) => self.handle_paste(&text),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Global quit handler
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state.screen() {
            Screen::Login => self.handle_login_key(key.code),
            Screen::Kiosk => self.handle_kiosk_key(key.code),
            Screen::Reports => self.handle_reports_key(key.code),
        }
    }

    fn handle_login_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.state.login.toggle_focus()
            }
            KeyCode::Enter => self.submit_login(),
            KeyCode::Backspace => self.state.login.pop(),
            KeyCode::Char(c) => self.state.login.push(c),
            _ => {}
        }
    }

    fn handle_kiosk_key(&mut self, key: KeyCode) {
        let key = match key {
            KeyCode::Enter => KioskKey::Enter,
            KeyCode::Esc => KioskKey::Escape,
            KeyCode::Up => KioskKey::Up,
            KeyCode::Down => KioskKey::Down,
            KeyCode::Backspace => KioskKey::Backspace,
            KeyCode::Char(c) => KioskKey::Char(c),
            _ => return,
        };
        self.kiosk_input(KioskInput::Key(key));
    }

    fn handle_reports_key(&mut self, key: KeyCode) {
        let board = &mut self.state.board;

        if !board.is_grid_visible() {
            match key {
                KeyCode::Char('g') | KeyCode::Enter => board.toggle_grid(),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        if let Some(index) = board.expanded() {
            match key {
                KeyCode::Esc => board.toggle_tile(index),
                KeyCode::Enter => self.request_tile(index),
                KeyCode::Backspace => {
                    if let Some(tile) = board.tile_mut(index) {
                        tile.date_input.pop();
                    }
                }
                KeyCode::Char('g') => board.hide_grid(),
                KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                    if let Some(tile) = board.tile_mut(index) {
                        if tile.kind.needs_date() && tile.date_input.len() < 10 {
                            tile.date_input.push(c);
                        }
                    }
                }
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Up | KeyCode::Char('k') => self.state.move_tile(false),
            KeyCode::Down | KeyCode::Char('j') => self.state.move_tile(true),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let index = self.state.tile_index;
                self.state.board.toggle_tile(index);
            }
            KeyCode::Char('g') => board.hide_grid(),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let (column, row) = (mouse.column, mouse.row);
        let hitboxes = &self.state.hitboxes;

        match self.state.screen() {
            Screen::Kiosk => {
                let input = if hitboxes.on_logo(column, row) {
                    Some(KioskInput::ClickLogo)
                } else if let Some(index) = hitboxes.role_at(column, row) {
                    Some(KioskInput::ClickRole(index))
                } else if hitboxes.on_submit(column, row) {
                    Some(KioskInput::ClickSubmit)
                } else {
                    None
                };
                if let Some(input) = input {
                    self.kiosk_input(input);
                }
            }
            Screen::Reports => {
                if let Some(index) = hitboxes.tile_button_at(column, row) {
                    self.request_tile(index);
                } else if let Some(index) = hitboxes.tile_at(column, row) {
                    self.state.tile_index = index;
                    self.state.board.toggle_tile(index);
                }
            }
            Screen::Login => {}
        }
    }

    fn handle_paste(&mut self, text: &str) {
        match self.state.screen() {
            Screen::Login => text.chars().for_each(|c| self.state.login.push(c)),
            Screen::Kiosk => {
                let combined = format!("{}{}", self.state.kiosk.enrollment_digits(), text);
                self.kiosk_input(KioskInput::Edit(combined));
            }
            Screen::Reports => {}
        }
    }

    fn kiosk_input(&mut self, input: KioskInput) {
        if let Some(effect) = self.state.kiosk.handle(input, Instant::now()) {
            self.perform(effect);
        }
    }

    /// Carry out a controller effect on a background task
    fn perform(&mut self, effect: KioskEffect) {
        let api = self.api.clone();
        let sender = self.events.sender();

        match effect {
            KioskEffect::CheckStatus { ticket, form } => {
                tracing::debug!("Dispatching status check {}", ticket);
                tokio::spawn(async move {
                    let outcome = api.check_status(&form).await;
                    let _ = sender.send(AppEvent::StatusChecked { ticket, outcome });
                });
            }
            KioskEffect::SubmitForm(form) => {
                tokio::spawn(async move {
                    let outcome = api.submit_check(&form).await;
                    let _ = sender.send(AppEvent::Navigated(outcome));
                });
            }
        }
    }

    fn submit_login(&mut self) {
        let request = match self
            .state
            .gate
            .begin_login(&self.state.login.id, &self.state.login.password)
        {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("Login not sent: {}", e);
                return;
            }
        };

        let api = self.api.clone();
        let sender = self.events.sender();
        tokio::spawn(async move {
            let outcome = api.login(&request).await;
            let _ = sender.send(AppEvent::LoginFinished { request, outcome });
        });
    }

    /// Start a request cycle on a report tile
    fn request_tile(&mut self, index: usize) {
        let Some(tile) = self.state.board.tile_mut(index) else {
            return;
        };
        let request = match tile.begin() {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("Report request not sent: {}", e);
                return;
            }
        };

        let api = self.api.clone();
        let downloads = self.downloads.clone();
        let sender = self.events.sender();
        tokio::spawn(async move {
            // The tile must be re-enabled even if the request task dies
            let worker = tokio::spawn(async move {
                fetch_and_download(api.as_ref(), downloads.as_ref(), &request).await
            });
            let outcome = worker.await.unwrap_or_else(|e| Err(lost_request(e)));
            let _ = sender.send(AppEvent::ReportFinished { index, outcome });
        });
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LoginFinished { request, outcome } => {
                match self.state.gate.finish_login(&request, outcome) {
                    Ok(session) => {
                        self.state.login.clear();
                        self.state.kiosk = KioskController::new(self.config.roles.clone());
                        self.state.toast.show(
                            format!("Signed in as {}", session.subject_id),
                            StatusKind::Success,
                            Instant::now(),
                        );
                        self.start_stats();
                    }
                    Err(_) => self.state.login.clear_password(),
                }
            }
            AppEvent::StatusChecked { ticket, outcome } => {
                self.kiosk_input(KioskInput::StatusChecked { ticket, outcome });
            }
            AppEvent::Navigated(outcome) => {
                let (message, kind) = match outcome {
                    Ok(nav) => match nav.toast {
                        Some(toast) => {
                            tracing::info!("Check-in result ({}): {}", nav.status, toast.message);
                            (toast.message, toast.kind)
                        }
                        None if (200..300).contains(&nav.status) => {
                            tracing::debug!("No result message on {}", nav.url);
                            (MSG_SUBMITTED.to_string(), StatusKind::Info)
                        }
                        None => {
                            tracing::warn!("Check-in form returned {} ({})", nav.status, nav.url);
                            (format!("Check-in failed (Status: {}).", nav.status), StatusKind::Error)
                        }
                    },
                    Err(e) => {
                        tracing::warn!("Check-in form submission failed: {}", e);
                        ("System error. Please try again.".to_string(), StatusKind::Error)
                    }
                };
                self.state.toast.show(message, kind, Instant::now());
                // The flow instance ended with the navigation
                self.state.kiosk = KioskController::new(self.config.roles.clone());
            }
            AppEvent::ReportFinished { index, outcome } => {
                if let Ok(downloaded) = &outcome {
                    self.state.toast.show(
                        format!("Saved to {}", display_path(&downloaded.path, 48)),
                        StatusKind::Info,
                        Instant::now(),
                    );
                }
                self.state.board.complete_tile(index, &outcome);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use tempfile::TempDir;
    use turnstile_core::api::{LoginResponse, Navigation};
    use turnstile_core::reports::Downloaded;
    use turnstile_core::{CheckinError, KioskFlowState, PageToast};

    fn app(surface: Surface, dir: &TempDir) -> App {
        let config = TurnstileConfig {
            download_dir: dir.path().join("downloads"),
            session_file: dir.path().join("session.json"),
            ..TurnstileConfig::default()
        };
        App::new(surface, config).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_blank_password_is_rejected_locally() {
        let dir = TempDir::new().unwrap();
        let mut app = app(Surface::Kiosk, &dir);
        assert_eq!(app.state.screen(), Screen::Login);

        type_text(&mut app, "librarian");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state.login.id, "librarian");
        assert!(!app.state.gate.is_in_flight());
        assert_eq!(app.state.gate.message.message, "Enter ID and password.");
    }

    #[test]
    fn test_tab_moves_typing_to_password() {
        let dir = TempDir::new().unwrap();
        let mut app = app(Surface::Kiosk, &dir);

        type_text(&mut app, "lib");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "secret");

        assert_eq!(app.state.login.id, "lib");
        assert_eq!(app.state.login.password, "secret");
    }

    #[test]
    fn test_navigation_starts_a_fresh_flow() {
        let dir = TempDir::new().unwrap();
        let mut app = app(Surface::Kiosk, &dir);

        let start = Instant::now();
        app.state.kiosk.handle(KioskInput::ClickLogo, start);
        app.state.kiosk.poll(start + Duration::from_secs(1));
        assert_eq!(app.state.kiosk.state(), KioskFlowState::RoleSelect);

        app.handle_app_event(AppEvent::Navigated(Err(
            turnstile_core::TransportError::Unreachable("refused".into()),
        )));

        assert_eq!(app.state.kiosk.state(), KioskFlowState::Idle);
        assert!(!app.state.kiosk.logo_raised());
        let toast = app.state.toast.current().unwrap();
        assert_eq!(toast.message, "System error. Please try again.");
        assert_eq!(toast.kind, StatusKind::Error);
    }

    fn landed(toast: Option<PageToast>) -> AppEvent {
        AppEvent::Navigated(Ok(Navigation {
            status: 200,
            url: "http://127.0.0.1:5000/".into(),
            toast,
        }))
    }

    #[test]
    fn test_flashed_error_is_shown_as_error() {
        let dir = TempDir::new().unwrap();
        let mut app = app(Surface::Kiosk, &dir);

        app.handle_app_event(landed(Some(PageToast {
            message: "Library closed. Hours: 7 AM - 8 PM".into(),
            kind: StatusKind::Error,
        })));

        let toast = app.state.toast.current().unwrap();
        assert_eq!(toast.message, "Library closed. Hours: 7 AM - 8 PM");
        assert_eq!(toast.kind, StatusKind::Error);
    }

    #[test]
    fn test_flashed_welcome_is_shown_verbatim() {
        let dir = TempDir::new().unwrap();
        let mut app = app(Surface::Kiosk, &dir);

        app.handle_app_event(landed(Some(PageToast {
            message: "Welcome! Ada Lovelace entered the library.".into(),
            kind: StatusKind::Success,
        })));

        let toast = app.state.toast.current().unwrap();
        assert_eq!(toast.message, "Welcome! Ada Lovelace entered the library.");
        assert_eq!(toast.kind, StatusKind::Success);
    }

    /// A 200 landing page without a message is not reported as an admission
    #[test]
    fn test_silent_landing_page_is_neutral() {
        let dir = TempDir::new().unwrap();
        let mut app = app(Surface::Kiosk, &dir);

        app.handle_app_event(landed(None));

        let toast = app.state.toast.current().unwrap();
        assert_eq!(toast.message, MSG_SUBMITTED);
        assert_eq!(toast.kind, StatusKind::Info);
    }

    #[tokio::test]
    async fn test_stats_start_once_signed_in() {
        let dir = TempDir::new().unwrap();
        let mut app = app(Surface::Kiosk, &dir);
        assert_eq!(app.state.screen(), Screen::Login);
        assert!(app.stats_task.is_none());

        // A failed attempt keeps the poller off
        let request = app.state.gate.begin_login("librarian", "wrong").unwrap();
        app.handle_app_event(AppEvent::LoginFinished {
            request,
            outcome: Ok(LoginResponse { success: false }),
        });
        assert!(app.stats_task.is_none());

        let request = app.state.gate.begin_login("librarian", "secret").unwrap();
        app.handle_app_event(AppEvent::LoginFinished {
            request,
            outcome: Ok(LoginResponse { success: true }),
        });
        assert_eq!(app.state.screen(), Screen::Kiosk);
        assert!(app.stats_task.is_some());

        if let Some(task) = app.stats_task.take() {
            task.abort();
        }
    }

    #[test]
    fn test_report_result_after_collapse_is_dropped() {
        let dir = TempDir::new().unwrap();
        let mut app = app(Surface::Admin, &dir);

        app.state.board.toggle_tile(3);
        app.state.board.tile_mut(3).unwrap().begin().unwrap();
        app.state.board.toggle_tile(3);

        app.handle_app_event(AppEvent::ReportFinished {
            index: 3,
            outcome: Ok(Downloaded {
                filename: "report.xlsx".into(),
                path: dir.path().join("downloads/report.xlsx"),
            }),
        });

        let tile = app.state.board.tile(3).unwrap();
        assert!(!tile.is_busy());
        assert!(tile.status.is_empty());
    }

    #[tokio::test]
    async fn test_report_tile_cycle() {
        let dir = TempDir::new().unwrap();
        let mut app = app(Surface::Admin, &dir);

        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.board.expanded(), Some(1));

        // Empty date never leaves the tile
        press(&mut app, KeyCode::Enter);
        let tile = app.state.board.tile(1).unwrap();
        assert!(!tile.is_busy());
        assert_eq!(tile.status.message, "Please select a date first.");

        type_text(&mut app, "2025-08-10x");
        assert_eq!(app.state.board.tile(1).unwrap().date_input, "2025-08-10");

        press(&mut app, KeyCode::Enter);
        assert!(app.state.board.tile(1).unwrap().is_busy());

        app.handle_app_event(AppEvent::ReportFinished {
            index: 1,
            outcome: Err(CheckinError::Rejected("No data for this date".into())),
        });
        let tile = app.state.board.tile(1).unwrap();
        assert!(!tile.is_busy());
        assert_eq!(tile.status.kind, StatusKind::Error);
        assert_eq!(tile.status.message, "No data for this date");

        // Collapsing clears the tile's feedback
        press(&mut app, KeyCode::Esc);
        assert!(app.state.board.tile(1).unwrap().status.is_empty());
    }
}
