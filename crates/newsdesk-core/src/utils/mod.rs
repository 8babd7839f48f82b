//! Formatting helpers for displaying news and session data.

pub mod format;

pub use format::{format_age, format_publish_time, truncate_string};
