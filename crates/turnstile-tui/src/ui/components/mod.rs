//! Reusable UI components

pub mod toast;
pub mod stats_strip;
pub mod status_line;
