//! Settings and variable assignment: set, setq, setqx, show

use super::{on_off, parse_on_off, variable_name, CommandContext};
use crate::interactive::commands::{is_abbrev_of, split_word};
use crate::session::Settings;
use crate::signal::LoopSignal;
use crate::{Error, Result};

/// A debugger setting reachable through `set` and `show`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setting {
    Basename,
    Debug,
    Editing,
    IgnoreErrors,
    KeepGoing,
    NestDepth,
    Silent,
    StopOnError,
    Trace,
}

/// Name, minimum abbreviation, setting, description
const SETTINGS: &[(&str, usize, Setting, &str)] = &[
    ("basename", 4, Setting::Basename, "Show only file base names in locations"),
    ("debug", 3, Setting::Debug, "Host debug output mask"),
    ("editing", 3, Setting::Editing, "Interactive line editing"),
    ("ignore-errors", 3, Setting::IgnoreErrors, "Ignore recipe errors"),
    ("keep-going", 3, Setting::KeepGoing, "Keep going after errors"),
    ("nest-depth", 3, Setting::NestDepth, "Depth indicator cap in the prompt"),
    ("silent", 3, Setting::Silent, "Don't echo recipes"),
    ("stop-on-error", 3, Setting::StopOnError, "Stop at every interception point"),
    ("trace", 3, Setting::Trace, "Trace recipe execution"),
];

impl Setting {
    fn parse(word: &str) -> Option<(&'static str, Setting)> {
        SETTINGS
            .iter()
            .find(|(name, min, _, _)| is_abbrev_of(word, name, *min))
            .map(|(name, _, setting, _)| (*name, *setting))
    }

    fn flag_mut(self, settings: &mut Settings) -> Option<&mut bool> {
        match self {
            Setting::Basename => Some(&mut settings.basename_filenames),
            Setting::Editing => Some(&mut settings.line_editing),
            Setting::IgnoreErrors => Some(&mut settings.ignore_errors),
            Setting::KeepGoing => Some(&mut settings.keep_going),
            Setting::Silent => Some(&mut settings.silent),
            Setting::StopOnError => Some(&mut settings.stop_on_error),
            Setting::Trace => Some(&mut settings.trace),
            Setting::Debug | Setting::NestDepth => None,
        }
    }

    fn render(self, settings: &Settings) -> String {
        let flag = match self {
            Setting::Basename => settings.basename_filenames,
            Setting::Editing => settings.line_editing,
            Setting::IgnoreErrors => settings.ignore_errors,
            Setting::KeepGoing => settings.keep_going,
            Setting::Silent => settings.silent,
            Setting::StopOnError => settings.stop_on_error,
            Setting::Trace => settings.trace,
            Setting::Debug => return settings.debug_mask.to_string(),
            Setting::NestDepth => return settings.max_nest_depth.to_string(),
        };
        on_off(flag).to_string()
    }
}

fn show_setting(ctx: &mut CommandContext<'_>, name: &str, setting: Setting) {
    let value = setting.render(&ctx.session.settings);
    ctx.console.msg(format!("{} is {}.", name, value));
}

fn apply_setting(ctx: &mut CommandContext<'_>, setting: Setting, value: &str) -> Result<()> {
    let settings = &mut ctx.session.settings;
    match setting {
        Setting::Debug => {
            settings.debug_mask = value.parse().map_err(|_| {
                Error::InvalidArgument(format!("Expecting an integer debug mask; got {}.", value))
            })?;
        }
        Setting::NestDepth => {
            settings.max_nest_depth = match value.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::InvalidArgument(format!(
                        "Expecting a positive nesting depth; got {}.",
                        value
                    )))
                }
            };
        }
        flag => {
            if let Some(slot) = flag.flag_mut(settings) {
                *slot = parse_on_off(value, *slot)?;
            }
        }
    }
    Ok(())
}

pub(super) fn set(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    if args.is_empty() {
        ctx.console.msg("Set subcommands:");
        for (name, _, _, doc) in SETTINGS {
            ctx.console.msg(format!("  set {:<14} -- {}", name, doc));
        }
        ctx.console
            .msg(format!("  set {:<14} -- {}", "variable", "Set a variable, expanding the value"));
        return Ok(LoopSignal::ReadMore);
    }

    let (word, rest) = split_word(args);
    if is_abbrev_of(word, "variable", 3) {
        return assign(ctx, rest, true);
    }
    match Setting::parse(word) {
        Some((name, setting)) => {
            apply_setting(ctx, setting, rest)?;
            show_setting(ctx, name, setting);
            Ok(LoopSignal::ReadMore)
        }
        None => assign(ctx, args, true),
    }
}

pub(super) fn setq(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    assign(ctx, args, false)
}

pub(super) fn setqx(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    assign(ctx, args, true)
}

/// Give an existing variable a new value.
fn assign(ctx: &mut CommandContext<'_>, args: &str, expand: bool) -> Result<LoopSignal> {
    let (name, value) = split_word(args);
    if name.is_empty() {
        return Err(Error::InvalidArgument(
            "You need to supply a variable name.".to_string(),
        ));
    }
    let name = variable_name(name);
    if ctx.host.variable(name).is_none() {
        return Err(Error::InvalidArgument(format!(
            "Can't find variable {}.",
            name
        )));
    }

    let value = if expand {
        ctx.host.expand(value)
    } else {
        value.to_string()
    };
    ctx.host.define_variable(name, &value)?;
    ctx.console
        .msg(format!("Variable {} now has value '{}'", name, value));
    Ok(LoopSignal::ReadMore)
}

pub(super) fn show(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let (word, _) = split_word(args);
    if word.is_empty() {
        for (name, _, setting, _) in SETTINGS {
            show_setting(ctx, name, *setting);
        }
        return Ok(LoopSignal::ReadMore);
    }

    if is_abbrev_of(word, "commands", 3) {
        let lines: Vec<String> = ctx
            .session
            .history()
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{:>5}  {}", i + 1, line))
            .collect();
        for line in lines {
            ctx.console.msg(line);
        }
    } else if is_abbrev_of(word, "version", 3) {
        ctx.console
            .msg(format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
    } else {
        let (name, setting) = Setting::parse(word).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "Undefined show command \"{}\". Try \"help show\".",
                word
            ))
        })?;
        show_setting(ctx, name, setting);
    }
    Ok(LoopSignal::ReadMore)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_abbreviations() {
        assert_eq!(Setting::parse("bas"), None);
        assert_eq!(Setting::parse("base"), Some(("basename", Setting::Basename)));
        assert_eq!(Setting::parse("tra"), Some(("trace", Setting::Trace)));
        assert_eq!(Setting::parse("sil"), Some(("silent", Setting::Silent)));
        assert_eq!(Setting::parse("sto"), Some(("stop-on-error", Setting::StopOnError)));
        assert_eq!(Setting::parse("ignore-errors"), Some(("ignore-errors", Setting::IgnoreErrors)));
        assert_eq!(Setting::parse("tr"), None);
    }

    #[test]
    fn test_each_toggle_owns_its_flag() {
        let mut settings = Settings::default();
        *Setting::Trace.flag_mut(&mut settings).unwrap() = true;
        assert!(settings.trace);
        assert!(!settings.silent);
        assert_eq!(Setting::Trace.render(&settings), "on");
        assert_eq!(Setting::Silent.render(&settings), "off");
    }
}
