//! makedbg: an interactive debugger for build-execution engines
//!
//! The host engine calls into the debugger at its interception points
//! (before prerequisites, after prerequisites, after a recipe, on error).
//! The debugger decides whether to actually stop there and, if so, runs a
//! read-eval loop where the operator can inspect and alter state before
//! handing control back.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     Host build engine (recursive)       │
//! │  interception point → Debugger::enter   │
//! └────────────────────┬────────────────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   Session gate (stop / continue)        │
//! │  stepping counters, quit state, flags   │
//! └────────────────────┬────────────────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   REPL loop                             │
//! │  prompt → line → resolver → handler     │
//! │  until a terminal LoopSignal            │
//! └─────────────────────────────────────────┘
//! ```

pub mod config;
pub mod console;
pub mod frame;
pub mod gate;
pub mod host;
pub mod interactive;
pub mod location;
pub mod runner;
pub mod session;
pub mod signal;

// Re-exports for convenience
pub use config::Config;
pub use console::Console;
pub use frame::{BreakpointFlags, InvocationFrame, SourceLocation, StopReason};
pub use host::{Host, MemoryHost};
pub use interactive::{CommandRegistry, Debugger, Interception, LineSource};
pub use location::Location;
pub use runner::{Outcome, PlanRunner};
pub use session::{DebugSession, QuitState, Settings};
pub use signal::LoopSignal;

/// Crate-level error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No such debugger command: {0}.")]
    UnknownCommand(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Command table error: {0}")]
    Registry(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Command error: {0}")]
    Command(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl Error {
    /// Whether this error was caused by what the operator typed, as opposed
    /// to a failure inside the debugger or the host.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::UnknownCommand(_) | Error::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_classification() {
        assert!(Error::UnknownCommand("frob".into()).is_user_error());
        assert!(Error::InvalidArgument("bad count".into()).is_user_error());
        assert!(!Error::Host("boom".into()).is_user_error());
        assert!(!Error::Io(std::io::Error::other("disk")).is_user_error());
    }

    #[test]
    fn test_unknown_command_message() {
        let err = Error::UnknownCommand("frob".into());
        assert_eq!(err.to_string(), "No such debugger command: frob.");
    }
}
