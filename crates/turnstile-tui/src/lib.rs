//! Turnstile TUI Library
//!
//! Terminal hosts for the Turnstile controllers: the check-in kiosk and the
//! admin report panel.

pub mod app;
pub mod ui;
pub mod utils;

pub use app::{App, Surface};
