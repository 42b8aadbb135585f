//! Session gate
//!
//! Decides at every interception point whether the debugger actually stops:
//! - After an explicit quit: never
//! - While a step/next count above one is running down: only at breakpoints
//! - Otherwise: at breakpoints, on errors, on termination, or everywhere
//!   when stop-on-error is set

use tracing::debug;

use crate::console::Console;
use crate::frame::{BreakpointFlags, InvocationFrame, StopReason};
use crate::session::DebugSession;

/// Error code the host passes when its execution has terminated
pub const TERMINATED: i32 = -2;

/// Error code the host passes when entering on a recoverable error
pub const RECOVERABLE: i32 = -1;

/// Result of a gate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Let the host keep running
    Continue,
    /// Enter the interactive loop
    Stop,
}

/// Meaning of the integer code passed with an interception
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrCode {
    /// Ordinary interception
    Ordinary,
    /// Entered because of an error the host can recover from
    Recoverable,
    /// The host's execution at this level has finished
    Terminated,
    /// Fatal error; the code is the host's exit status
    Fatal(i32),
}

impl From<i32> for ErrCode {
    fn from(code: i32) -> Self {
        match code {
            0 => ErrCode::Ordinary,
            RECOVERABLE => ErrCode::Recoverable,
            TERMINATED => ErrCode::Terminated,
            other => ErrCode::Fatal(other),
        }
    }
}

impl ErrCode {
    /// Print the entry banner for this code and update the session.
    ///
    /// Termination at a nested level requests a quit for this call only, so
    /// that unwinding through the parents does not stop at each of them.
    pub fn announce(self, session: &mut DebugSession, console: &mut Console, depth: u32) {
        match self {
            ErrCode::Ordinary => {}
            ErrCode::Recoverable => {
                console.banner("***Entering debugger because we encountered an error.");
            }
            ErrCode::Terminated if depth == 0 => {
                console.banner("Build terminated.");
                console.msg("Use q to quit or R to restart");
            }
            ErrCode::Terminated => {
                console.banner(format!(
                    "Build finished at level {}. Continuing in parent.",
                    depth
                ));
                session.request_quit();
            }
            ErrCode::Fatal(code) => {
                console.banner("***Entering debugger because we encountered a fatal error.");
                console.errmsg(format!(
                    "Exiting the debugger will exit with exit code {}.",
                    code
                ));
                session.set_exit_code(code);
            }
        }
    }
}

/// Evaluate the stop/continue policy for one interception.
///
/// On a stop, a temporary breakpoint on `frame` is cleared when the stop
/// reason spends it.
pub fn check(
    session: &mut DebugSession,
    frame: Option<&mut InvocationFrame>,
    errcode: i32,
    reason: StopReason,
) -> Verdict {
    if session.is_force_quit() {
        return Verdict::Continue;
    }
    session.last_stop_reason = reason;

    let flagged = frame.as_ref().is_some_and(|f| f.has_breakpoint());

    if session.stepping > 1 || session.nexting > 1 {
        if session.stepping > 0 {
            session.stepping -= 1;
        }
        if session.nexting > 0 {
            session.nexting -= 1;
        }
        if !flagged {
            debug!(
                stepping = session.stepping,
                nexting = session.nexting,
                "Stepping through interception point"
            );
            return Verdict::Continue;
        }
    } else if !session.stop_on_error()
        && session.stepping == 0
        && session.nexting == 0
        && frame.is_some()
        && !flagged
        && errcode != TERMINATED
    {
        return Verdict::Continue;
    }

    if let Some(frame) = frame {
        if frame.flags.contains(BreakpointFlags::TEMPORARY) && reason.clears_temporary() {
            debug!(target = %frame.target, "Clearing temporary breakpoint");
            frame.flags = BreakpointFlags::empty();
        }
    }

    debug!(%reason, errcode, "Gate stops");
    Verdict::Stop
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::QuitState;

    fn plain_frame() -> InvocationFrame {
        InvocationFrame::new("all")
    }

    #[test]
    fn test_errcode_classification() {
        assert_eq!(ErrCode::from(0), ErrCode::Ordinary);
        assert_eq!(ErrCode::from(-1), ErrCode::Recoverable);
        assert_eq!(ErrCode::from(-2), ErrCode::Terminated);
        assert_eq!(ErrCode::from(-7), ErrCode::Fatal(-7));
        assert_eq!(ErrCode::from(2), ErrCode::Fatal(2));
    }

    #[test]
    fn test_force_quit_always_continues() {
        let mut session = DebugSession::default();
        session.force_quit();
        session.stepping = 1;
        let mut frame = plain_frame().with_flags(BreakpointFlags::RUN);

        let verdict = check(&mut session, Some(&mut frame), -1, StopReason::ErrorHit);

        assert_eq!(verdict, Verdict::Continue);
        assert_eq!(session.stepping, 1);
        assert_eq!(frame.flags, BreakpointFlags::RUN);
    }

    #[test]
    fn test_no_reason_to_stop_continues() {
        let mut session = DebugSession::default();
        let mut frame = plain_frame();
        let verdict = check(&mut session, Some(&mut frame), 0, StopReason::BeforePrereq);
        assert_eq!(verdict, Verdict::Continue);
    }

    #[test]
    fn test_missing_frame_stops() {
        let mut session = DebugSession::default();
        let verdict = check(&mut session, None, 0, StopReason::Explicit);
        assert_eq!(verdict, Verdict::Stop);
    }

    #[test]
    fn test_breakpoint_stops() {
        let mut session = DebugSession::default();
        let mut frame = plain_frame().with_flags(BreakpointFlags::PREREQ);
        let verdict = check(&mut session, Some(&mut frame), 0, StopReason::BeforePrereq);
        assert_eq!(verdict, Verdict::Stop);
        assert_eq!(frame.flags, BreakpointFlags::PREREQ);
    }

    #[test]
    fn test_stop_on_error_stops_everywhere() {
        let mut session = DebugSession::default();
        session.settings.stop_on_error = true;
        let mut frame = plain_frame();
        let verdict = check(&mut session, Some(&mut frame), 0, StopReason::AfterPrereq);
        assert_eq!(verdict, Verdict::Stop);
    }

    #[test]
    fn test_terminated_stops() {
        let mut session = DebugSession::default();
        let mut frame = plain_frame();
        let verdict = check(&mut session, Some(&mut frame), TERMINATED, StopReason::GoalUpdated);
        assert_eq!(verdict, Verdict::Stop);
    }

    #[test]
    fn test_step_count_runs_down() {
        let mut session = DebugSession::default();
        session.stepping = 3;
        let mut frame = plain_frame();

        assert_eq!(
            check(&mut session, Some(&mut frame), 0, StopReason::StepHit),
            Verdict::Continue
        );
        assert_eq!(
            check(&mut session, Some(&mut frame), 0, StopReason::StepHit),
            Verdict::Continue
        );
        assert_eq!(session.stepping, 1);
        assert_eq!(
            check(&mut session, Some(&mut frame), 0, StopReason::StepHit),
            Verdict::Stop
        );
    }

    #[test]
    fn test_breakpoint_interrupts_step_count() {
        let mut session = DebugSession::default();
        session.nexting = 5;
        let mut frame = plain_frame().with_flags(BreakpointFlags::END);
        let verdict = check(&mut session, Some(&mut frame), 0, StopReason::AfterCommand);
        assert_eq!(verdict, Verdict::Stop);
        assert_eq!(session.nexting, 4);
    }

    #[test]
    fn test_temporary_breakpoint_fires_once() {
        let mut session = DebugSession::default();
        let mut frame = plain_frame().with_flags(BreakpointFlags::END | BreakpointFlags::TEMPORARY);

        let first = check(&mut session, Some(&mut frame), 0, StopReason::AfterCommand);
        assert_eq!(first, Verdict::Stop);
        assert!(frame.flags.is_empty());

        let second = check(&mut session, Some(&mut frame), 0, StopReason::AfterCommand);
        assert_eq!(second, Verdict::Continue);
    }

    #[test]
    fn test_temporary_kept_for_other_reasons() {
        let mut session = DebugSession::default();
        let flags = BreakpointFlags::RUN | BreakpointFlags::TEMPORARY;
        let mut frame = plain_frame().with_flags(flags);
        check(&mut session, Some(&mut frame), 0, StopReason::ErrorHit);
        assert_eq!(frame.flags, flags);
    }

    #[test]
    fn test_last_stop_reason_recorded() {
        let mut session = DebugSession::default();
        check(&mut session, None, 0, StopReason::ReadMakefile);
        assert_eq!(session.last_stop_reason, StopReason::ReadMakefile);

        session.force_quit();
        check(&mut session, None, 0, StopReason::ErrorHit);
        assert_eq!(session.last_stop_reason, StopReason::ReadMakefile);
    }

    #[test]
    fn test_announce_terminated_top_level() {
        let (mut console, captured) = Console::captured();
        let mut session = DebugSession::default();
        ErrCode::Terminated.announce(&mut session, &mut console, 0);
        assert!(captured.contents().contains("Build terminated."));
        assert_eq!(session.quit_state, QuitState::Active);
    }

    #[test]
    fn test_announce_terminated_nested() {
        let (mut console, captured) = Console::captured();
        let mut session = DebugSession::default();
        ErrCode::Terminated.announce(&mut session, &mut console, 2);
        assert!(captured.contents().contains("finished at level 2"));
        assert_eq!(session.quit_state, QuitState::RequestQuit);
    }

    #[test]
    fn test_announce_fatal_records_exit_code() {
        let (mut console, captured) = Console::captured();
        let mut session = DebugSession::default();
        ErrCode::Fatal(-5).announce(&mut session, &mut console, 0);
        assert!(captured.contents().contains("exit code -5"));
        assert_eq!(session.exit_code(), -5);
    }
}
