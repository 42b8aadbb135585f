//! Command bodies
//!
//! Each handler receives the loop's [`CommandContext`] and the trimmed
//! argument string and tells the loop what to do next.

mod breakpoints;
mod environment;
mod inspect;
mod settings;
mod stepping;

pub use stepping::quit_session;

use super::commands::Command;
use crate::console::Console;
use crate::frame::InvocationFrame;
use crate::host::Host;
use crate::interactive::CommandRegistry;
use crate::location::Location;
use crate::session::DebugSession;
use crate::{Error, Result};

/// Everything a command body may read or change
pub struct CommandContext<'a> {
    pub session: &'a mut DebugSession,
    pub location: &'a mut Location,
    /// Host call stack, outermost first
    pub stack: &'a [InvocationFrame],
    /// Frame the host stopped at
    pub target: Option<&'a mut InvocationFrame>,
    pub host: &'a mut dyn Host,
    pub console: &'a mut Console,
    pub registry: &'a CommandRegistry,
    /// Nesting of `source` commands
    pub source_depth: usize,
}

/// Aliases, sorted by alias name
pub const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("!!", "shell"),
    ("?", "help"),
    ("L", "break"),
    ("backtrace", "where"),
    ("bt", "where"),
    ("exit", "quit"),
    ("restart", "run"),
    ("return", "quit"),
];

/// The builtin command table, sorted by long name
pub fn builtin_commands() -> Vec<Command> {
    vec![
        Command::new(
            "break",
            'b',
            breakpoints::set_breakpoint,
            "break [TARGET] [all|run|prereq|end|temp]",
            "Set a breakpoint on a target.\n\
             Without a target, the current target is used. Keywords pick the\n\
             points to stop at; the default is all of them. `temp` makes the\n\
             breakpoint go away after it first stops.",
        ),
        Command::new(
            "cd",
            'C',
            environment::cd,
            "cd [DIR]",
            "Change the working directory.\nWithout an argument, go to the home directory.",
        ),
        Command::new(
            "comment",
            '#',
            environment::comment,
            "comment TEXT",
            "Ignore the rest of the line.",
        ),
        Command::new(
            "continue",
            'c',
            stepping::continue_execution,
            "continue [TARGET...]",
            "Continue executing.\nGiven targets get a temporary breakpoint first.",
        ),
        Command::new(
            "delete",
            'd',
            breakpoints::delete_breakpoint,
            "delete [TARGET...]",
            "Delete breakpoints.\nWithout an argument, delete all of them.",
        ),
        Command::new(
            "down",
            'D',
            inspect::down,
            "down [N]",
            "Select the frame N levels closer to the stop point.",
        ),
        Command::new(
            "edit",
            'e',
            environment::edit,
            "edit",
            "Edit the build description at the current location with $EDITOR.",
        ),
        Command::new(
            "expand",
            'x',
            inspect::expand,
            "expand TEXT",
            "Show TEXT with variable references expanded.",
        ),
        Command::new(
            "finish",
            'F',
            stepping::finish,
            "finish",
            "Run until the current target is finished.",
        ),
        Command::new(
            "frame",
            'f',
            inspect::frame,
            "frame [N]",
            "Select frame N, counted from the stop point.",
        ),
        Command::new(
            "help",
            'h',
            inspect::help,
            "help [COMMAND]",
            "Show the command list, or help for one command.",
        ),
        Command::new(
            "info",
            'i',
            inspect::info,
            "info [breakpoints|frame|line|program]",
            "Show information about the debugged build.",
        ),
        Command::new(
            "list",
            'l',
            inspect::list,
            "list [LINE]",
            "List the build description around the current location.",
        ),
        Command::new(
            "load",
            'M',
            environment::load,
            "load FILE",
            "Read an additional build description.",
        ),
        Command::new(
            "next",
            'n',
            stepping::next,
            "next [N]",
            "Continue to the next target at this level, N times.",
        ),
        Command::new(
            "print",
            'p',
            inspect::print,
            "print VARIABLE",
            "Show a variable's value.\n$(VARIABLE) and ${VARIABLE} are accepted too.",
        ),
        Command::new(
            "pwd",
            'P',
            environment::pwd,
            "pwd",
            "Show the working directory.",
        ),
        Command::new(
            "quit",
            'q',
            stepping::quit,
            "quit [EXIT-CODE]",
            "Quit the debugger and the build.\n\
             Without an exit code, a pending fatal code is used, else 0.",
        ),
        Command::new(
            "run",
            'R',
            stepping::run,
            "run",
            "Restart the build from the beginning.",
        ),
        Command::new(
            "set",
            '=',
            settings::set,
            "set OPTION {on|off|toggle} | set [variable] NAME VALUE",
            "Change a debugger setting, or a variable (value expanded).",
        ),
        Command::new(
            "setq",
            '"',
            settings::setq,
            "setq NAME VALUE",
            "Set a variable to VALUE without expanding it.",
        ),
        Command::new(
            "setqx",
            '`',
            settings::setqx,
            "setqx NAME VALUE",
            "Set a variable to VALUE after expanding it.",
        ),
        Command::new(
            "shell",
            '!',
            environment::shell,
            "shell COMMAND",
            "Run COMMAND with /bin/sh.",
        ),
        Command::new(
            "show",
            'S',
            settings::show,
            "show [SETTING|commands|version]",
            "Show debugger settings, or the command history.",
        ),
        Command::new(
            "skip",
            'k',
            stepping::skip,
            "skip",
            "Skip running the current recipe.",
        ),
        Command::new(
            "source",
            '<',
            environment::source,
            "source FILE",
            "Execute debugger commands from FILE.",
        ),
        Command::new(
            "step",
            's',
            stepping::step,
            "step [N]",
            "Step to the next interception point, N times.\nAn empty line steps once.",
        ),
        Command::new(
            "target",
            't',
            inspect::target,
            "target [NAME]",
            "Describe a target; the current one by default.",
        ),
        Command::new(
            "up",
            'u',
            inspect::up,
            "up [N]",
            "Select the frame N levels further from the stop point.",
        ),
        Command::new(
            "where",
            'T',
            inspect::backtrace,
            "where [N]",
            "Show the target stack, innermost first.",
        ),
        Command::new(
            "write",
            'w',
            environment::write,
            "write [TARGET [FILE]]",
            "Write a target's expanded recipe to FILE, or show it.",
        ),
    ]
}

/// Parse an optional positive count.
pub(crate) fn parse_count(args: &str, default: u32) -> Result<u32> {
    if args.is_empty() {
        return Ok(default);
    }
    match args.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::InvalidArgument(format!(
            "Expecting a positive integer; got {}.",
            args
        ))),
    }
}

/// Parse an on/off/toggle argument against the current value.
pub(crate) fn parse_on_off(args: &str, current: bool) -> Result<bool> {
    match args {
        "" => Ok(!current),
        "on" | "1" | "yes" => Ok(true),
        "off" | "0" | "no" => Ok(false),
        t if super::commands::is_abbrev_of(t, "toggle", 1) => Ok(!current),
        other => Err(Error::InvalidArgument(format!(
            "Expecting \"on\", \"off\" or \"toggle\"; got {}.",
            other
        ))),
    }
}

/// Strip `$(...)` or `${...}` around a variable name.
pub(crate) fn variable_name(text: &str) -> &str {
    text.strip_prefix("$(")
        .and_then(|t| t.strip_suffix(')'))
        .or_else(|| text.strip_prefix("${").and_then(|t| t.strip_suffix('}')))
        .unwrap_or(text)
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("", 1).unwrap(), 1);
        assert_eq!(parse_count("4", 1).unwrap(), 4);
        assert!(parse_count("0", 1).unwrap_err().is_user_error());
        assert!(parse_count("-3", 1).is_err());
        assert!(parse_count("lots", 1).is_err());
    }

    #[test]
    fn test_parse_on_off() {
        assert!(parse_on_off("on", false).unwrap());
        assert!(!parse_on_off("off", true).unwrap());
        assert!(parse_on_off("", false).unwrap());
        assert!(!parse_on_off("tog", true).unwrap());
        assert!(parse_on_off("maybe", true).is_err());
    }

    #[test]
    fn test_variable_name() {
        assert_eq!(variable_name("CC"), "CC");
        assert_eq!(variable_name("$(CC)"), "CC");
        assert_eq!(variable_name("${CFLAGS}"), "CFLAGS");
        assert_eq!(variable_name("$(CC"), "$(CC");
    }
}
