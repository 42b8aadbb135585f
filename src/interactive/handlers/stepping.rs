//! Execution control: step, next, continue, finish, skip, run, quit

use super::{parse_count, CommandContext};
use crate::frame::BreakpointFlags;
use crate::session::DebugSession;
use crate::signal::LoopSignal;
use crate::{Error, Result};

pub(super) fn step(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    ctx.session.stepping = parse_count(args, 1)?;
    ctx.session.nexting = 0;
    Ok(LoopSignal::Step)
}

pub(super) fn next(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    ctx.session.nexting = parse_count(args, 1)?;
    ctx.session.stepping = 0;
    Ok(LoopSignal::Next)
}

pub(super) fn continue_execution(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let flags = BreakpointFlags::all_points() | BreakpointFlags::TEMPORARY;
    for name in args.split_whitespace() {
        ctx.host.add_breakpoint(name, flags)?;
        mark_current(ctx, name, flags);
        ctx.console
            .msg(format!("Temporary breakpoint on target {}.", name));
    }
    ctx.session.clear_stepping();
    Ok(LoopSignal::ContinueExecution)
}

/// Stop again once the selected target's recipe has run.
pub(super) fn finish(ctx: &mut CommandContext<'_>, _args: &str) -> Result<LoopSignal> {
    ctx.session.clear_stepping();
    let name = ctx.location.target.clone();
    if name.is_empty() {
        return Ok(LoopSignal::Finish);
    }

    // A temporary breakpoint that stopped us here is already spent
    let spent = ctx
        .target
        .as_deref()
        .is_some_and(|f| f.target == name && f.flags.is_empty());
    let existing = ctx
        .host
        .breakpoints()
        .into_iter()
        .find(|(target, _)| *target == name)
        .map(|(_, flags)| flags)
        .filter(|flags| !(spent && flags.contains(BreakpointFlags::TEMPORARY)));
    let flags = match existing {
        Some(flags) => flags | BreakpointFlags::END,
        None => BreakpointFlags::END | BreakpointFlags::TEMPORARY,
    };
    ctx.host.add_breakpoint(&name, flags)?;
    mark_current(ctx, &name, flags);
    Ok(LoopSignal::Finish)
}

/// Keep the stopped frame in step with a breakpoint just stored for it.
fn mark_current(ctx: &mut CommandContext<'_>, name: &str, flags: BreakpointFlags) {
    if let Some(frame) = ctx.target.as_deref_mut() {
        if frame.target == name {
            frame.flags = flags;
        }
    }
}

pub(super) fn skip(_ctx: &mut CommandContext<'_>, _args: &str) -> Result<LoopSignal> {
    Ok(LoopSignal::Skip)
}

pub(super) fn run(ctx: &mut CommandContext<'_>, _args: &str) -> Result<LoopSignal> {
    ctx.session.clear_stepping();
    ctx.session.clear_exit_code();
    ctx.console.msg("Restarting...");
    Ok(LoopSignal::Restart)
}

pub(super) fn quit(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    if args.is_empty() {
        return Ok(quit_session(ctx.session));
    }
    let code = args.parse::<i32>().map_err(|_| {
        Error::InvalidArgument(format!("Expecting an integer exit code; got {}.", args))
    })?;
    ctx.session.set_exit_code(code);
    Ok(quit_session(ctx.session))
}

/// Quit for good with the pending exit code. Used by `quit` and at end of
/// input.
pub fn quit_session(session: &mut DebugSession) -> LoopSignal {
    session.force_quit();
    session.clear_stepping();
    LoopSignal::Quit(session.exit_code())
}
