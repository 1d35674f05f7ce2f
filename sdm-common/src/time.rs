//! Timestamp utilities

use chrono::{DateTime, Local};

/// Display format of the startup banner, e.g. `10/19/2026 09:05:00 AM`
pub const BANNER_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Get current local timestamp
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Format a timestamp for the startup banner
pub fn format_banner(timestamp: &DateTime<Local>) -> String {
    timestamp.format(BANNER_FORMAT).to_string()
}
