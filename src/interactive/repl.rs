//! Debugger entry point and read-eval loop
//!
//! The host calls [`Debugger::enter`] at each interception point. The gate
//! decides whether to stop; if it does, the loop prompts, resolves and runs
//! commands until one of them hands control back to the host.

use std::sync::Arc;

use tracing::{debug, warn};

use super::commands::{execute_line, CommandRegistry};
use super::handlers::{quit_session, CommandContext};
use super::input::{self, LineSource, ReadLine};
use crate::config::{Config, HistoryConfig};
use crate::console::Console;
use crate::frame::{InvocationFrame, StopReason};
use crate::gate::{self, ErrCode, Verdict};
use crate::host::Host;
use crate::location::{self, Location};
use crate::session::{DebugSession, QuitState, Settings};
use crate::signal::LoopSignal;
use crate::Result;

/// One call from the host into the debugger
#[derive(Debug)]
pub struct Interception<'a> {
    /// Host call stack, outermost first
    pub stack: &'a [InvocationFrame],
    /// Frame being processed, if the host has one
    pub target: Option<&'a mut InvocationFrame>,
    /// 0, or an error/termination code (see [`ErrCode`])
    pub errcode: i32,
    pub reason: StopReason,
    /// Host nesting depth, 0 at top level
    pub depth: u32,
}

impl<'a> Interception<'a> {
    pub fn new(reason: StopReason) -> Self {
        Self {
            stack: &[],
            target: None,
            errcode: 0,
            reason,
            depth: 0,
        }
    }

    pub fn stack(mut self, stack: &'a [InvocationFrame]) -> Self {
        self.stack = stack;
        self
    }

    pub fn target(mut self, target: &'a mut InvocationFrame) -> Self {
        self.target = Some(target);
        self
    }

    pub fn errcode(mut self, errcode: i32) -> Self {
        self.errcode = errcode;
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }
}

/// Opens the terminal line source for an editing mode
type Opener = fn(bool, &HistoryConfig) -> Box<dyn LineSource>;

/// Process-lifetime debugger: session state, command table, I/O
pub struct Debugger {
    config: Config,
    session: DebugSession,
    registry: Arc<CommandRegistry>,
    console: Console,
    input: Option<Box<dyn LineSource>>,
    /// Editing mode `input` was opened with; `None` for a source set from
    /// outside, which is never reopened
    opened_editing: Option<bool>,
    opener: Opener,
}

impl Debugger {
    /// Debugger on the terminal with the builtin command table. The line
    /// source is opened the first time the loop runs.
    pub fn new(config: Config) -> Result<Self> {
        let registry = CommandRegistry::global()?;
        Ok(Self::with_registry(config, registry, Console::stdout()))
    }

    /// Debugger with an explicit command table and console
    pub fn with_registry(config: Config, registry: Arc<CommandRegistry>, console: Console) -> Self {
        let session = DebugSession::new(Settings::from(&config.debugger));
        Self {
            config,
            session,
            registry,
            console,
            input: None,
            opened_editing: None,
            opener: input::open,
        }
    }

    /// Debugger reading from `input` and writing to `console`
    pub fn with_io(config: Config, input: Box<dyn LineSource>, console: Console) -> Result<Self> {
        let mut debugger = Self::with_registry(config, CommandRegistry::global()?, console);
        debugger.set_input(input);
        Ok(debugger)
    }

    /// Replace the line source
    pub fn set_input(&mut self, input: Box<dyn LineSource>) {
        self.input = Some(input);
        self.opened_editing = None;
    }

    pub fn session(&self) -> &DebugSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DebugSession {
        &mut self.session
    }

    /// Where operator-facing output goes
    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Handle one interception point. Returns what the host should do next.
    pub fn enter(&mut self, host: &mut dyn Host, mut point: Interception<'_>) -> LoopSignal {
        let verdict = gate::check(
            &mut self.session,
            point.target.as_deref_mut(),
            point.errcode,
            point.reason,
        );
        if verdict == Verdict::Continue {
            return LoopSignal::ContinueExecution;
        }

        ErrCode::from(point.errcode).announce(&mut self.session, &mut self.console, point.depth);
        if self.session.quit_state == QuitState::RequestQuit {
            debug!(depth = point.depth, "Nested level finished, resuming parent");
            self.session.leave_loop();
            return LoopSignal::ContinueExecution;
        }

        let mut location = Location::resolve(point.stack, point.target.as_deref(), point.depth);
        let banner = location.describe(point.reason, self.session.settings.basename_filenames);
        self.console.msg(banner);

        let signal = self.read_loop(host, &mut point, &mut location);
        self.session.leave_loop();

        if let Some(input) = self.input.as_mut() {
            if let Err(e) = input.save_history() {
                warn!(error = %e, "Failed to save history");
            }
        }
        debug!(%signal, reason = %point.reason, depth = point.depth, "Leaving debugger");
        signal
    }

    fn read_loop(
        &mut self,
        host: &mut dyn Host,
        point: &mut Interception<'_>,
        location: &mut Location,
    ) -> LoopSignal {
        let mut signal = LoopSignal::ReadMore;

        while !signal.is_terminal() {
            let prompt = location::prompt(
                &self.config.debugger.prompt,
                point.depth,
                self.session.settings.max_nest_depth,
                self.session.history().len(),
            );
            let line = match self.read_line(&prompt) {
                Ok(ReadLine::Line(line)) => line,
                Ok(ReadLine::Interrupted) => continue,
                Ok(ReadLine::Eof) => {
                    self.console.msg("");
                    return quit_session(&mut self.session);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read a command line");
                    self.console.errmsg(format!("Can't read input: {}", e));
                    return quit_session(&mut self.session);
                }
            };

            let line = if line.is_empty() { "step".to_string() } else { line };
            self.session.record(&line);
            if let Some(input) = self.input.as_mut() {
                input.add_history(&line);
            }

            let registry = Arc::clone(&self.registry);
            let mut ctx = CommandContext {
                session: &mut self.session,
                location: &mut *location,
                stack: point.stack,
                target: point.target.as_deref_mut(),
                host: &mut *host,
                console: &mut self.console,
                registry: &registry,
                source_depth: 0,
            };
            let result = execute_line(&mut ctx, &line);
            signal = recover(&mut self.console, result);
        }
        signal
    }

    fn read_line(&mut self, prompt: &str) -> Result<ReadLine> {
        let editing = self.session.settings.line_editing;
        if let Some(opened) = self.opened_editing.filter(|&mode| mode != editing) {
            debug!(from = opened, to = editing, "Editing mode changed, reopening input");
            if let Some(mut old) = self.input.take() {
                if let Err(e) = old.save_history() {
                    warn!(error = %e, "Failed to save history");
                }
            }
        }

        if self.input.is_none() {
            self.input = Some((self.opener)(editing, &self.config.history));
            self.opened_editing = Some(editing);
        }
        match self.input.as_mut() {
            Some(source) => source.read_line(prompt),
            None => Ok(ReadLine::Eof),
        }
    }
}

/// Turn a command failure into a loop signal after telling the operator.
/// Operator mistakes keep the loop going with `CommandError`; anything else
/// is logged and the prompt comes back.
fn recover(console: &mut Console, result: Result<LoopSignal>) -> LoopSignal {
    match result {
        Ok(signal) => signal,
        Err(e) if e.is_user_error() => {
            console.errmsg(&e);
            LoopSignal::CommandError
        }
        Err(e) => {
            warn!(error = %e, "Command failed");
            console.errmsg(format!("Internal error: {}", e));
            LoopSignal::ReadMore
        }
    }
}

impl std::fmt::Debug for Debugger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debugger")
            .field("session", &self.session)
            .field("registry", &self.registry)
            .field("has_input", &self.input.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactive::PlainSource;
    use crate::Error;
    use std::io::{self, Cursor};

    fn debugger(script: &'static str) -> (Debugger, crate::console::Captured) {
        let (console, captured) = Console::captured();
        let input = Box::new(PlainSource::new(Cursor::new(script), io::sink()));
        (
            Debugger::with_io(Config::default(), input, console).unwrap(),
            captured,
        )
    }

    #[test]
    fn test_recover_user_error() {
        let (mut console, captured) = Console::captured();
        let signal = recover(&mut console, Err(Error::UnknownCommand("frob".into())));
        assert_eq!(signal, LoopSignal::CommandError);
        assert_eq!(captured.error_count(), 1);
    }

    #[test]
    fn test_recover_internal_error() {
        let (mut console, captured) = Console::captured();
        let signal = recover(&mut console, Err(Error::Host("disk on fire".into())));
        assert_eq!(signal, LoopSignal::ReadMore);
        assert_eq!(captured.error_count(), 1);
        assert!(captured.contents().contains("disk on fire"));
    }

    #[test]
    fn test_gate_continue_skips_loop() {
        let (mut debugger, captured) = debugger("quit\n");
        let mut host = crate::host::MemoryHost::new();
        let mut frame = InvocationFrame::new("all");
        let signal = debugger.enter(
            &mut host,
            Interception::new(StopReason::BeforePrereq).target(&mut frame),
        );
        assert_eq!(signal, LoopSignal::ContinueExecution);
        assert!(captured.contents().is_empty());
    }

    #[test]
    fn test_empty_line_steps() {
        let (mut debugger, _captured) = debugger("\n");
        let mut host = crate::host::MemoryHost::new();
        let signal = debugger.enter(&mut host, Interception::new(StopReason::Explicit));
        assert_eq!(signal, LoopSignal::Step);
        assert_eq!(debugger.session().history(), ["step"]);
        assert_eq!(debugger.session().stepping, 1);
    }

    fn scripted_opener(editing: bool, _history: &HistoryConfig) -> Box<dyn LineSource> {
        let script = if editing { "set editing off\n" } else { "quit 3\n" };
        Box::new(PlainSource::new(Cursor::new(script), io::sink()))
    }

    #[test]
    fn test_editing_toggle_reopens_input() {
        let (console, captured) = Console::captured();
        let mut debugger =
            Debugger::with_registry(Config::default(), CommandRegistry::global().unwrap(), console);
        debugger.opener = scripted_opener;
        let mut host = crate::host::MemoryHost::new();

        let signal = debugger.enter(&mut host, Interception::new(StopReason::Explicit));

        assert_eq!(signal, LoopSignal::Quit(3));
        assert_eq!(debugger.opened_editing, Some(false));
        assert!(captured.contents().contains("editing is off."));
    }

    #[test]
    fn test_injected_input_is_kept() {
        let (mut debugger, _captured) = debugger("set editing off\nquit 5\n");
        debugger.opener = scripted_opener;
        let mut host = crate::host::MemoryHost::new();
        let signal = debugger.enter(&mut host, Interception::new(StopReason::Explicit));
        assert_eq!(signal, LoopSignal::Quit(5));
    }

    #[test]
    fn test_eof_quits() {
        let (mut debugger, _captured) = debugger("");
        let mut host = crate::host::MemoryHost::new();
        let signal = debugger.enter(&mut host, Interception::new(StopReason::Explicit));
        assert_eq!(signal, LoopSignal::Quit(0));
        assert!(debugger.session().is_force_quit());
    }
}
