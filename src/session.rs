//! Debug session state
//!
//! One `DebugSession` lives for the whole process. Nested interceptions
//! (the host recursing into a sub-build) share it, so stepping counters and
//! history carry across nesting levels.

use crate::config::DebuggerConfig;
use crate::frame::StopReason;

/// Quit state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuitState {
    /// Normal operation
    #[default]
    Active,
    /// A nested level finished; skip the prompt for the current call
    RequestQuit,
    /// The operator quit; every later interception continues silently
    ForceQuit,
}

/// Runtime settings observed by the gate and the REPL loop and changed by
/// `set` commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Stop at every interception point
    pub stop_on_error: bool,
    /// Use the interactive line editor
    pub line_editing: bool,
    /// Depth indicator cap for the prompt
    pub max_nest_depth: usize,
    /// Show base names only in locations
    pub basename_filenames: bool,
    /// Host flag: ignore recipe errors
    pub ignore_errors: bool,
    /// Host flag: keep going after errors
    pub keep_going: bool,
    /// Host flag: don't echo recipes
    pub silent: bool,
    /// Host flag: trace shell commands
    pub trace: bool,
    /// Host debug output mask
    pub debug_mask: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&DebuggerConfig::default())
    }
}

impl From<&DebuggerConfig> for Settings {
    fn from(config: &DebuggerConfig) -> Self {
        Self {
            stop_on_error: config.stop_on_error,
            line_editing: config.line_editing,
            max_nest_depth: config.max_nest_depth,
            basename_filenames: config.basename_filenames,
            ignore_errors: false,
            keep_going: false,
            silent: false,
            trace: false,
            debug_mask: 0,
        }
    }
}

/// Mutable, process-lifetime session state
#[derive(Debug, Clone, Default)]
pub struct DebugSession {
    pub quit_state: QuitState,
    /// Remaining `step` count
    pub stepping: u32,
    /// Remaining `next` count
    pub nexting: u32,
    pub settings: Settings,
    pub last_stop_reason: StopReason,
    history: Vec<String>,
    exit_code: Option<i32>,
}

impl DebugSession {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Entered lines, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Append a line to the history
    pub fn record(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    pub fn stop_on_error(&self) -> bool {
        self.settings.stop_on_error
    }

    /// Exit code the host should use when the operator quits
    pub fn exit_code(&self) -> i32 {
        self.exit_code.unwrap_or(0)
    }

    /// Remember a fatal host code to pass through on quit
    pub fn set_exit_code(&mut self, code: i32) {
        self.exit_code = Some(code);
    }

    /// Forget a pending exit code, e.g. when the build restarts
    pub fn clear_exit_code(&mut self) {
        self.exit_code = None;
    }

    /// Mark that the current nested level finished. Has no effect once the
    /// operator has quit.
    pub fn request_quit(&mut self) {
        if self.quit_state != QuitState::ForceQuit {
            self.quit_state = QuitState::RequestQuit;
        }
    }

    /// The operator quit explicitly
    pub fn force_quit(&mut self) {
        self.quit_state = QuitState::ForceQuit;
    }

    pub fn is_force_quit(&self) -> bool {
        self.quit_state == QuitState::ForceQuit
    }

    /// Called when a loop invocation ends
    pub fn leave_loop(&mut self) {
        if self.quit_state != QuitState::ForceQuit {
            self.quit_state = QuitState::Active;
        }
    }

    /// Stop counting steps
    pub fn clear_stepping(&mut self) {
        self.stepping = 0;
        self.nexting = 0;
    }
}
