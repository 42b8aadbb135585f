//! Loop signals
//!
//! The result vocabulary shared by command handlers, the resolver's
//! dispatch, the session gate and the REPL loop itself.

use std::fmt;

/// What should happen after a command (or a gate decision)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSignal {
    /// Keep reading commands
    ReadMore,
    /// The last command failed; keep reading commands
    CommandError,
    /// Resume the host until the next stop
    ContinueExecution,
    /// Resume, stopping after the configured number of steps
    Step,
    /// Resume, stepping over nested work
    Next,
    /// Resume until the current target finishes
    Finish,
    /// Skip the current recipe and resume
    Skip,
    /// Restart the host's execution from the beginning
    Restart,
    /// Leave the debugger; the host exits with this code
    Quit(i32),
}

impl LoopSignal {
    /// Whether the REPL loop ends when it sees this signal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoopSignal::ReadMore | LoopSignal::CommandError)
    }

    /// Whether the host should keep executing after this signal.
    pub fn resumes_host(&self) -> bool {
        matches!(
            self,
            LoopSignal::ContinueExecution
                | LoopSignal::Step
                | LoopSignal::Next
                | LoopSignal::Finish
                | LoopSignal::Skip
        )
    }
}

impl fmt::Display for LoopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadMore => write!(f, "read-more"),
            Self::CommandError => write!(f, "command-error"),
            Self::ContinueExecution => write!(f, "continue"),
            Self::Step => write!(f, "step"),
            Self::Next => write!(f, "next"),
            Self::Finish => write!(f, "finish"),
            Self::Skip => write!(f, "skip"),
            Self::Restart => write!(f, "restart"),
            Self::Quit(code) => write!(f, "quit({})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_read_signals_keep_loop_running() {
        assert!(!LoopSignal::ReadMore.is_terminal());
        assert!(!LoopSignal::CommandError.is_terminal());
        assert!(LoopSignal::ContinueExecution.is_terminal());
        assert!(LoopSignal::Step.is_terminal());
        assert!(LoopSignal::Restart.is_terminal());
        assert!(LoopSignal::Quit(0).is_terminal());
    }

    #[test]
    fn test_resumes_host() {
        assert!(LoopSignal::Next.resumes_host());
        assert!(!LoopSignal::Restart.resumes_host());
        assert!(!LoopSignal::Quit(2).resumes_host());
    }
}
