//! Operator-facing message output
//!
//! Everything the operator reads (banners, command output, error lines)
//! goes through a [`Console`]. Internal events go to `tracing` instead.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Message sink for the debugger dialogue
pub struct Console {
    out: Box<dyn Write + Send>,
    color: bool,
}

impl Console {
    /// Console on stdout, colored when stdout is a terminal
    pub fn stdout() -> Self {
        Self {
            out: Box::new(io::stdout()),
            color: io::stdout().is_terminal(),
        }
    }

    /// Console writing into a shared in-memory buffer
    pub fn captured() -> (Self, Captured) {
        let captured = Captured::default();
        let console = Self {
            out: Box::new(captured.clone()),
            color: false,
        };
        (console, captured)
    }

    /// Print an ordinary message line
    pub fn msg(&mut self, text: impl Display) {
        let _ = writeln!(self.out, "{}", text);
        let _ = self.out.flush();
    }

    /// Print an error line
    pub fn errmsg(&mut self, text: impl Display) {
        if self.color {
            let _ = writeln!(self.out, "\x1b[31m** {}\x1b[0m", text);
        } else {
            let _ = writeln!(self.out, "** {}", text);
        }
        let _ = self.out.flush();
    }

    /// Print a banner preceded by a blank line
    pub fn banner(&mut self, text: impl Display) {
        let _ = writeln!(self.out);
        self.msg(text);
    }
}

/// Shared buffer behind a captured console
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    /// Everything written so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Number of lines written so far that start with the error prefix
    pub fn error_count(&self) -> usize {
        self.contents()
            .lines()
            .filter(|l| l.starts_with("** "))
            .count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_output() {
        let (mut console, captured) = Console::captured();
        console.msg("hello");
        console.errmsg("bad thing");
        console.banner("Banner");

        assert_eq!(captured.contents(), "hello\n** bad thing\n\nBanner\n");
        assert_eq!(captured.error_count(), 1);

        captured.clear();
        assert!(captured.contents().is_empty());
    }
}
