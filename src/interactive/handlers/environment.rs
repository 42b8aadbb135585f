//! Commands that touch the outside world: cd, pwd, shell, edit, load,
//! source, write, comment

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};

use super::CommandContext;
use crate::interactive::commands::execute_line;
use crate::signal::LoopSignal;
use crate::{Error, Result};

/// Deepest allowed nesting of `source` commands
const MAX_SOURCE_DEPTH: usize = 16;

/// Expand `~` and environment variables in a path argument.
fn expand_path(arg: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(arg)
        .map_err(|e| Error::InvalidArgument(format!("Can't expand {}: {}", arg, e)))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Split a quoted argument list.
fn split_args(args: &str) -> Result<Vec<String>> {
    shell_words::split(args)
        .map_err(|e| Error::InvalidArgument(format!("Can't parse arguments: {}", e)))
}

pub(super) fn comment(_ctx: &mut CommandContext<'_>, _args: &str) -> Result<LoopSignal> {
    Ok(LoopSignal::ReadMore)
}

pub(super) fn cd(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let dir = if args.is_empty() {
        dirs::home_dir()
            .ok_or_else(|| Error::InvalidArgument("No home directory.".to_string()))?
    } else {
        expand_path(args)?
    };
    std::env::set_current_dir(&dir).map_err(|e| {
        Error::InvalidArgument(format!("cd {}: {}", dir.display(), e))
    })?;
    pwd(ctx, "")
}

pub(super) fn pwd(ctx: &mut CommandContext<'_>, _args: &str) -> Result<LoopSignal> {
    let cwd = std::env::current_dir()?;
    ctx.console
        .msg(format!("Working directory {}.", cwd.display()));
    Ok(LoopSignal::ReadMore)
}

pub(super) fn shell(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    if args.is_empty() {
        return Err(Error::InvalidArgument(
            "You need to supply a command to run.".to_string(),
        ));
    }
    debug!(command = args, "Running shell command");
    let output = Command::new("/bin/sh")
        .arg("-c")
        .arg(args)
        .output()
        .map_err(|e| Error::Command(format!("can't run /bin/sh: {}", e)))?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        ctx.console.msg(line);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        ctx.console.msg(line);
    }
    if !output.status.success() {
        ctx.console.msg(format!("Command exited with {}.", output.status));
    }
    Ok(LoopSignal::ReadMore)
}

pub(super) fn edit(ctx: &mut CommandContext<'_>, _args: &str) -> Result<LoopSignal> {
    let source = ctx
        .location
        .source
        .clone()
        .ok_or_else(|| Error::InvalidArgument("No source location to edit.".to_string()))?;
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let mut words = split_args(&editor)?;
    if words.is_empty() {
        return Err(Error::InvalidArgument("EDITOR is empty.".to_string()));
    }
    let program = words.remove(0);

    info!(editor = %program, file = %source.file.display(), line = source.line, "Launching editor");
    let status = Command::new(&program)
        .args(words)
        .arg(format!("+{}", source.line))
        .arg(&source.file)
        .status()
        .map_err(|e| Error::Command(format!("can't run {}: {}", program, e)))?;
    if !status.success() {
        ctx.console.msg(format!("Editor exited with {}.", status));
    }
    Ok(LoopSignal::ReadMore)
}

pub(super) fn load(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    if args.is_empty() {
        return Err(Error::InvalidArgument(
            "You need to supply a file name.".to_string(),
        ));
    }
    for word in split_args(args)? {
        let path = expand_path(&word)?;
        ctx.host.load(&path)?;
        ctx.console.msg(format!("Read {}.", path.display()));
    }
    Ok(LoopSignal::ReadMore)
}

pub(super) fn source(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let words = split_args(args)?;
    let file = match words.as_slice() {
        [file] => expand_path(file)?,
        _ => {
            return Err(Error::InvalidArgument(
                "source takes exactly one file name.".to_string(),
            ))
        }
    };
    if ctx.source_depth >= MAX_SOURCE_DEPTH {
        return Err(Error::Command(format!(
            "source nested more than {} deep",
            MAX_SOURCE_DEPTH
        )));
    }

    let text = std::fs::read_to_string(&file)
        .map_err(|e| Error::InvalidArgument(format!("Can't read {}: {}", file.display(), e)))?;
    debug!(file = %file.display(), "Sourcing commands");

    ctx.source_depth += 1;
    let mut signal = LoopSignal::ReadMore;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match execute_line(ctx, line) {
            Ok(next) => signal = next,
            Err(e) => {
                ctx.source_depth -= 1;
                return Err(e);
            }
        }
        if signal.is_terminal() {
            break;
        }
    }
    ctx.source_depth -= 1;

    Ok(if signal.is_terminal() {
        signal
    } else {
        LoopSignal::ReadMore
    })
}

pub(super) fn write(ctx: &mut CommandContext<'_>, args: &str) -> Result<LoopSignal> {
    let words = split_args(args)?;
    let target = match words.first() {
        Some(name) => name.clone(),
        None if !ctx.location.target.is_empty() => ctx.location.target.clone(),
        None => {
            return Err(Error::InvalidArgument(
                "No current target; give a target name.".to_string(),
            ))
        }
    };
    let recipe = ctx
        .host
        .recipe(&target)
        .ok_or_else(|| Error::InvalidArgument(format!("Can't find target {}.", target)))?;

    let mut text = format!(
        "#!/bin/sh\n# recipe for target {}, written {}\n",
        target,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    for line in &recipe {
        text.push_str(&ctx.host.expand(line));
        text.push('\n');
    }

    match words.get(1) {
        Some(file) => {
            let path = expand_path(file)?;
            std::fs::write(&path, &text)?;
            ctx.console.msg(format!("File \"{}\" written.", path.display()));
        }
        None => ctx.console.msg(text.trim_end()),
    }
    Ok(LoopSignal::ReadMore)
}
