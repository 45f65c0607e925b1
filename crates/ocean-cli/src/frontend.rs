//! Terminal frontend: frames to stdout, real sleeps between ticks.

use ocean_world::Frontend;
use std::io::{self, Write};
use std::time::Duration;
use tracing::warn;

pub struct TerminalFrontend {
    quiet: bool,
}

impl TerminalFrontend {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Frontend for TerminalFrontend {
    fn render(&mut self, frame: &str) {
        if self.quiet {
            return;
        }
        let mut stdout = io::stdout().lock();
        if let Err(e) = stdout.write_all(frame.as_bytes()).and_then(|_| stdout.flush()) {
            warn!("Failed to write frame: {}", e);
        }
    }

    fn pause(&mut self, delay: Duration) {
        if !self.quiet && !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
