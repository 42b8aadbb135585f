//! Plan runner
//!
//! Walks a [`MemoryHost`] plan the way a build engine walks its dependency
//! graph and calls into the debugger at each interception point:
//! - before a target's prerequisites
//! - after its prerequisites, before the recipe
//! - after the recipe
//! - on a failing recipe line
//! - when a nested level or the whole build terminates
//!
//! A recipe line `exit N` stands for a command that fails with status N.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::frame::{BreakpointFlags, InvocationFrame, StopReason};
use crate::gate::{RECOVERABLE, TERMINATED};
use crate::host::{Host, MemoryHost};
use crate::interactive::{Debugger, Interception};
use crate::signal::LoopSignal;
use crate::{Error, Result};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every target was processed
    Finished,
    /// The operator asked to start over
    Restart,
    /// The operator quit; exit with this code
    Quit(i32),
}

/// What to do after one interception
enum Flow {
    Proceed,
    SkipRecipe,
    Stop(Outcome),
}

impl From<LoopSignal> for Flow {
    fn from(signal: LoopSignal) -> Self {
        match signal {
            LoopSignal::Skip => Flow::SkipRecipe,
            LoopSignal::Restart => Flow::Stop(Outcome::Restart),
            LoopSignal::Quit(code) => Flow::Stop(Outcome::Quit(code)),
            _ => Flow::Proceed,
        }
    }
}

/// Simulated build driving a [`Debugger`]
pub struct PlanRunner<'d> {
    debugger: &'d mut Debugger,
    stack: Vec<InvocationFrame>,
    done: HashSet<String>,
}

impl<'d> PlanRunner<'d> {
    pub fn new(debugger: &'d mut Debugger) -> Self {
        Self {
            debugger,
            stack: Vec::new(),
            done: HashSet::new(),
        }
    }

    /// Build `goal`, or the plan's default goal.
    pub fn run(&mut self, host: &mut MemoryHost, goal: Option<&str>) -> Result<Outcome> {
        let goal = goal
            .map(str::to_string)
            .or_else(|| host.goal.clone())
            .or_else(|| host.targets.keys().next().cloned())
            .ok_or_else(|| Error::Config("plan has no targets".to_string()))?;
        if !host.targets.contains_key(&goal) {
            return Err(Error::Config(format!("no target {} in plan", goal)));
        }

        info!(goal = %goal, "Starting build");
        self.stack.clear();
        self.done.clear();

        if let Some(outcome) = self.build(host, &goal, 0) {
            return Ok(outcome);
        }

        info!(goal = %goal, "Build finished");
        let point = Interception::new(StopReason::GoalUpdated).errcode(TERMINATED);
        match Flow::from(self.debugger.enter(host, point)) {
            Flow::Stop(outcome) => Ok(outcome),
            _ => Ok(Outcome::Finished),
        }
    }

    /// Process one target; `Some` ends the whole run.
    fn build(&mut self, host: &mut MemoryHost, target: &str, depth: u32) -> Option<Outcome> {
        if self.done.contains(target) {
            return None;
        }
        let Some(spec) = host.targets.get(target).cloned() else {
            debug!(target, "No rule for target; treating it as a file");
            return None;
        };
        if self.stack.iter().any(|f| f.target == target) {
            warn!(target, "Circular dependency dropped");
            return None;
        }

        let mut frame = host.frame_for(target);
        self.stack.push(frame.clone());

        let flow = self.intercept(host, &mut frame, StopReason::BeforePrereq, 0, depth);
        let mut skip = match flow {
            Flow::Stop(outcome) => return Some(outcome),
            Flow::SkipRecipe => true,
            Flow::Proceed => false,
        };

        let child_depth = if spec.recurse { depth + 1 } else { depth };
        for dep in &spec.deps {
            if let Some(outcome) = self.build(host, dep, child_depth) {
                return Some(outcome);
            }
        }
        if spec.recurse && !spec.deps.is_empty() {
            let point = Interception::new(StopReason::GoalUpdated)
                .stack(&self.stack)
                .errcode(TERMINATED)
                .depth(child_depth);
            if let Flow::Stop(outcome) = Flow::from(self.debugger.enter(host, point)) {
                return Some(outcome);
            }
        }

        if !skip {
            match self.intercept(host, &mut frame, StopReason::AfterPrereq, 0, depth) {
                Flow::Stop(outcome) => return Some(outcome),
                Flow::SkipRecipe => skip = true,
                Flow::Proceed => {}
            }
        }

        if skip {
            self.debugger
                .console_mut()
                .msg(format!("Skipping recipe for {}.", target));
        } else {
            for line in &spec.recipe {
                let expanded = host.expand(line);
                if !self.debugger.session().settings.silent {
                    self.debugger.console_mut().msg(&expanded);
                }
                if let Some(status) = failure_status(&expanded) {
                    let ignore_errors = self.debugger.session().settings.ignore_errors;
                    let keep_going = self.debugger.session().settings.keep_going;
                    if ignore_errors {
                        self.debugger
                            .console_mut()
                            .msg(format!("[{}] Error {} (ignored)", target, status));
                        continue;
                    }
                    self.debugger
                        .console_mut()
                        .msg(format!("*** [{}] Error {}", target, status));
                    let errcode = if keep_going { RECOVERABLE } else { status };
                    let flow = self.intercept(host, &mut frame, StopReason::ErrorHit, errcode, depth);
                    if let Flow::Stop(outcome) = flow {
                        return Some(outcome);
                    }
                    if !keep_going {
                        return Some(Outcome::Quit(status));
                    }
                    break;
                }
            }
            if let Flow::Stop(outcome) =
                self.intercept(host, &mut frame, StopReason::AfterCommand, 0, depth)
            {
                return Some(outcome);
            }
        }

        self.stack.pop();
        self.done.insert(target.to_string());
        None
    }

    fn intercept(
        &mut self,
        host: &mut MemoryHost,
        frame: &mut InvocationFrame,
        reason: StopReason,
        errcode: i32,
        depth: u32,
    ) -> Flow {
        // Breakpoints may have changed since the frame was made
        let stored = host.breakpoint_flags(&frame.target);
        frame.flags = stored.at(reason);
        let armed = frame.flags;

        let point = Interception::new(reason)
            .stack(&self.stack)
            .target(frame)
            .errcode(errcode)
            .depth(depth);
        let signal = self.debugger.enter(host, point);

        if armed.contains(BreakpointFlags::TEMPORARY) && frame.flags.is_empty() {
            debug!(target = %frame.target, "Temporary breakpoint spent");
            host.spend_breakpoint(&frame.target, stored);
        }
        let current = host.breakpoint_flags(&frame.target);
        if let Some(top) = self.stack.last_mut() {
            top.flags = current;
        }
        Flow::from(signal)
    }
}

/// Exit status of a simulated `exit N` recipe line
fn failure_status(line: &str) -> Option<i32> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some("exit"), Some(code)) => code.parse().ok().filter(|&c: &i32| c != 0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_status() {
        assert_eq!(failure_status("exit 2"), Some(2));
        assert_eq!(failure_status("exit 0"), None);
        assert_eq!(failure_status("echo exit 2"), None);
        assert_eq!(failure_status("exit"), None);
    }
}
