//! Breakpoint commands

use super::CommandContext;
use crate::frame::BreakpointFlags;
use crate::interactive::commands::{is_abbrev_of, split_word};
use crate::signal::LoopSignal;
use crate::{Error, Result};

const POINT_KEYWORDS: &[(&str, BreakpointFlags)] = &[
    (
        "all",
        BreakpointFlags::PREREQ
            .union(BreakpointFlags::RUN)
            .union(BreakpointFlags::END),
    ),
    ("end", BreakpointFlags::END),
    ("prereq", BreakpointFlags::PREREQ),
    ("run", BreakpointFlags::RUN),
    ("temp", BreakpointFlags::TEMPORARY),
];

fn parse_points(words: &str) -> Result<BreakpointFlags> {
    let mut flags = BreakpointFlags::empty();
    for word in words.split_whitespace() {
        let (_, points) = POINT_KEYWORDS
            .iter()
            .find(|(keyword, _)| is_abbrev_of(word, keyword, 1))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "Unknown breakpoint point {}; expecting all, run, prereq, end or temp.",
                    word
                ))
            })?;
        flags |= *points;
    }
    if !flags.intersects(BreakpointFlags::all_points()) {
        flags |= BreakpointFlags::all_points();
    }
    Ok(flags)
}

pub(super) fn set_breakpoint(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let (name, points) = split_word(args);
    let name = if name.is_empty() {
        ctx.location.target.clone()
    } else {
        name.to_string()
    };
    if name.is_empty() {
        return Err(Error::InvalidArgument(
            "No current target; give a target name.".to_string(),
        ));
    }

    let flags = parse_points(points)?;
    ctx.host.add_breakpoint(&name, flags)?;
    if let Some(frame) = ctx.target.as_deref_mut() {
        if frame.target == name {
            frame.flags = flags;
        }
    }
    ctx.console
        .msg(format!("Breakpoint on target {}: {}.", name, flags));
    Ok(LoopSignal::ReadMore)
}

pub(super) fn delete_breakpoint(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    if args.is_empty() {
        let all = ctx.host.breakpoints();
        for (name, _) in &all {
            ctx.host.delete_breakpoint(name);
        }
        if let Some(frame) = ctx.target.as_deref_mut() {
            frame.flags = BreakpointFlags::empty();
        }
        ctx.console.msg(format!("Deleted {} breakpoint(s).", all.len()));
        return Ok(LoopSignal::ReadMore);
    }

    let mut missing = Vec::new();
    for name in args.split_whitespace() {
        let mut deleted = ctx.host.delete_breakpoint(name);
        if let Some(frame) = ctx.target.as_deref_mut() {
            if frame.target == name && frame.has_breakpoint() {
                frame.flags = BreakpointFlags::empty();
                deleted = true;
            }
        }
        if deleted {
            ctx.console.msg(format!("Deleted breakpoint on target {}.", name));
        } else {
            missing.push(name);
        }
    }

    if missing.is_empty() {
        Ok(LoopSignal::ReadMore)
    } else {
        Err(Error::InvalidArgument(format!(
            "No breakpoint on {}.",
            missing.join(", ")
        )))
    }
}
