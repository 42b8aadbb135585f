//! Inspection commands: print, expand, target, info, where, frame, up,
//! down, list, help

use super::{parse_count, variable_name, CommandContext};
use crate::interactive::commands::{is_abbrev_of, split_word};
use crate::location::frame_at;
use crate::signal::LoopSignal;
use crate::{Error, Result};

/// Lines shown on each side of the current line by `list`
const LIST_CONTEXT: u32 = 5;

pub(super) fn print(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    if args.is_empty() {
        return Err(Error::InvalidArgument(
            "You need to supply a variable name.".to_string(),
        ));
    }
    for word in args.split_whitespace() {
        let name = variable_name(word);
        match ctx.host.variable(name) {
            Some(value) => ctx.console.msg(format!("{} = {}", name, value)),
            None => {
                return Err(Error::InvalidArgument(format!(
                    "Can't find variable {}.",
                    name
                )))
            }
        }
    }
    Ok(LoopSignal::ReadMore)
}

pub(super) fn expand(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    if args.is_empty() {
        return Err(Error::InvalidArgument(
            "You need to supply a string to expand.".to_string(),
        ));
    }
    let expanded = ctx.host.expand(args);
    ctx.console.msg(expanded);
    Ok(LoopSignal::ReadMore)
}

pub(super) fn target(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let (name, _) = split_word(args);
    let name = if name.is_empty() {
        ctx.location.target.as_str()
    } else {
        name
    };
    if name.is_empty() {
        return Err(Error::InvalidArgument("No current target.".to_string()));
    }
    let text = ctx
        .host
        .describe_target(name)
        .ok_or_else(|| Error::InvalidArgument(format!("Can't find target {}.", name)))?;
    ctx.console.msg(text);
    Ok(LoopSignal::ReadMore)
}

const INFO_SUBCOMMANDS: &[(&str, &str)] = &[
    ("breakpoints", "Breakpoints set on targets"),
    ("frame", "The selected frame"),
    ("line", "Current source line"),
    ("program", "Why and where the build stopped"),
];

pub(super) fn info(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let (sub, _) = split_word(args);
    if sub.is_empty() {
        ctx.console.msg("Info subcommands:");
        for (name, doc) in INFO_SUBCOMMANDS {
            ctx.console.msg(format!("  info {:<12} -- {}", name, doc));
        }
        return Ok(LoopSignal::ReadMore);
    }

    let basename = ctx.session.settings.basename_filenames;
    if is_abbrev_of(sub, "breakpoints", 1) {
        let all = ctx.host.breakpoints();
        if all.is_empty() {
            ctx.console.msg("No breakpoints.");
        }
        for (number, (name, flags)) in all.iter().enumerate() {
            ctx.console
                .msg(format!("{:>3}  {:<24} {}", number + 1, name, flags));
        }
    } else if is_abbrev_of(sub, "frame", 1) {
        let place = ctx
            .location
            .source
            .as_ref()
            .map(|s| s.render(basename))
            .unwrap_or_else(|| "unknown location".to_string());
        ctx.console.msg(format!(
            "#{} {} at {} (level {})",
            ctx.location.stack_pos, ctx.location.target, place, ctx.location.depth
        ));
    } else if is_abbrev_of(sub, "line", 1) {
        match &ctx.location.source {
            Some(source) => ctx.console.msg(format!(
                "Line {} of \"{}\"",
                source.line,
                source.file.display()
            )),
            None => ctx.console.msg("No line number information available."),
        }
    } else if is_abbrev_of(sub, "program", 1) {
        let reason = ctx.session.last_stop_reason;
        ctx.console.msg(format!("Stopped {} ({}).", reason, reason.marker()));
        if ctx.session.stepping > 0 {
            ctx.console
                .msg(format!("Steps remaining: {}.", ctx.session.stepping));
        }
        if ctx.session.nexting > 0 {
            ctx.console
                .msg(format!("Nexts remaining: {}.", ctx.session.nexting));
        }
        if ctx.session.exit_code() != 0 {
            ctx.console.msg(format!(
                "Quitting will exit with code {}.",
                ctx.session.exit_code()
            ));
        }
    } else {
        return Err(Error::InvalidArgument(format!(
            "Undefined info command \"{}\". Try \"help info\".",
            sub
        )));
    }
    Ok(LoopSignal::ReadMore)
}

pub(super) fn backtrace(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let limit = parse_count(args, u32::MAX)? as usize;
    let basename = ctx.session.settings.basename_filenames;

    if ctx.stack.is_empty() {
        let target = if ctx.location.target.is_empty() {
            "<unknown target>"
        } else {
            ctx.location.target.as_str()
        };
        ctx.console.msg(format!("=>#0  {}", target));
        return Ok(LoopSignal::ReadMore);
    }

    for (pos, frame) in ctx.stack.iter().rev().enumerate().take(limit) {
        let marker = if pos == ctx.location.stack_pos {
            "=>"
        } else {
            "  "
        };
        let place = frame
            .location
            .as_ref()
            .map(|s| format!(" at {}", s.render(basename)))
            .unwrap_or_default();
        ctx.console
            .msg(format!("{}#{}  {}{}", marker, pos, frame.target, place));
    }
    Ok(LoopSignal::ReadMore)
}

/// Select frame `pos` and show it.
fn select_frame(ctx: &mut CommandContext<'_>, pos: usize) -> Result<LoopSignal> {
    if frame_at(ctx.stack, pos).is_none() {
        return Err(Error::InvalidArgument(format!(
            "Frame {} out of range; the stack has {} frame(s).",
            pos,
            ctx.stack.len()
        )));
    }
    ctx.location.select(ctx.stack, pos);
    let reason = ctx.session.last_stop_reason;
    let text = ctx
        .location
        .describe(reason, ctx.session.settings.basename_filenames);
    ctx.console.msg(text);
    Ok(LoopSignal::ReadMore)
}

pub(super) fn frame(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let pos = if args.is_empty() {
        0
    } else {
        args.parse::<usize>().map_err(|_| {
            Error::InvalidArgument(format!("Expecting a frame number; got {}.", args))
        })?
    };
    select_frame(ctx, pos)
}

pub(super) fn up(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let n = parse_count(args, 1)? as usize;
    let pos = ctx.location.stack_pos.saturating_add(n);
    select_frame(ctx, pos)
}

pub(super) fn down(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let n = parse_count(args, 1)? as usize;
    let pos = ctx
        .location
        .stack_pos
        .checked_sub(n)
        .ok_or_else(|| {
            Error::InvalidArgument(
                "Bottom (innermost) frame selected; you cannot go down.".to_string(),
            )
        })?;
    select_frame(ctx, pos)
}

pub(super) fn list(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let source = ctx
        .location
        .source
        .clone()
        .ok_or_else(|| Error::InvalidArgument("No source location to list.".to_string()))?;
    let center = if args.is_empty() {
        source.line
    } else {
        args.parse::<u32>().map_err(|_| {
            Error::InvalidArgument(format!("Expecting a line number; got {}.", args))
        })?
    };

    let text = ctx.host.read_source(&source.file)?;
    let first = center.saturating_sub(LIST_CONTEXT).max(1);
    let last = center.saturating_add(LIST_CONTEXT);
    for (number, line) in (1u32..).zip(text.lines()) {
        if number < first {
            continue;
        }
        if number > last {
            break;
        }
        let marker = if number == source.line { "=>" } else { "  " };
        ctx.console.msg(format!("{:>4}{} {}", number, marker, line));
    }
    Ok(LoopSignal::ReadMore)
}

pub(super) fn help(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let registry = ctx.registry;
    let (word, _) = split_word(args);

    if word.is_empty() {
        ctx.console.msg("Available commands:");
        for command in registry.commands() {
            ctx.console.msg(format!(
                "  {:<9} ({}) -- {}",
                command.long_name,
                command.short_code,
                command.summary()
            ));
        }
        ctx.console.msg("");
        let aliases: Vec<String> = registry
            .aliases()
            .iter()
            .map(|a| format!("{}={}", a.alias, a.command))
            .collect();
        ctx.console.msg(format!("Aliases: {}", aliases.join(", ")));
        ctx.console
            .msg("Type \"help COMMAND\" for more on a command.");
        return Ok(LoopSignal::ReadMore);
    }

    let command = registry
        .find(word)
        .ok_or_else(|| Error::UnknownCommand(word.to_string()))?;
    ctx.console.msg(format!("{} ({})", command.usage, command.short_code));
    ctx.console.msg("");
    ctx.console.msg(command.help);
    let aliases = registry.aliases_of(command.long_name);
    if !aliases.is_empty() {
        ctx.console.msg(format!("Aliases: {}", aliases.join(", ")));
    }
    Ok(LoopSignal::ReadMore)
}
