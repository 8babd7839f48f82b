use std::io::{self, IsTerminal, Write};

use newsdesk_core::Notifier;

/// Shows pipeline notifications as one-line toasts on stderr.
pub struct StderrToast {
    color: bool,
}

impl StderrToast {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }
}

impl Default for StderrToast {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for StderrToast {
    fn notify(&self, message: &str) {
        let mut stderr = io::stderr().lock();
        let _ = if self.color {
            writeln!(stderr, "\x1b[33m! {}\x1b[0m", message)
        } else {
            writeln!(stderr, "! {}", message)
        };
    }
}
