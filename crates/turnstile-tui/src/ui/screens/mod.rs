//! Screen modules for different views

pub mod kiosk;
pub mod login;
pub mod reports;
