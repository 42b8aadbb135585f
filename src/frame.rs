//! Invocation frames
//!
//! A frame is one level of the host's nested execution: the target being
//! worked on, where it is defined, and its breakpoint state. Frames are
//! owned by the host and only borrowed by the debugger for the duration of
//! one interception call.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Breakpoint state carried on a frame. Empty means no breakpoint.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BreakpointFlags: u8 {
        /// Stop before the target's prerequisites are considered
        const PREREQ = 0b0001;
        /// Stop after prerequisites, before the recipe runs
        const RUN = 0b0010;
        /// Stop after the recipe has run
        const END = 0b0100;
        /// Clear the breakpoint after it fires once
        const TEMPORARY = 0b1000;
    }
}

impl BreakpointFlags {
    /// Every stopping point, without the one-shot bit.
    pub fn all_points() -> Self {
        Self::PREREQ | Self::RUN | Self::END
    }

    /// Whether any breakpoint bit is set.
    pub fn is_set(&self) -> bool {
        !self.is_empty()
    }

    /// The part of a stored breakpoint that applies at `reason`. The
    /// one-shot bit comes along only when a point matches. Reasons that are
    /// not one of the three points see the breakpoint unchanged.
    pub fn at(self, reason: StopReason) -> Self {
        let point = match reason {
            StopReason::BeforePrereq => Self::PREREQ,
            StopReason::AfterPrereq => Self::RUN,
            StopReason::AfterCommand => Self::END,
            _ => return self,
        };
        let hit = self & point;
        if hit.is_empty() {
            hit
        } else {
            hit | (self & Self::TEMPORARY)
        }
    }
}

impl fmt::Display for BreakpointFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = [
            (Self::PREREQ, "prereq"),
            (Self::RUN, "run"),
            (Self::END, "end"),
            (Self::TEMPORARY, "temp"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
        write!(f, "{}", names.join(","))
    }
}

/// A file/line position in the build description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Render as `file:line`, optionally with only the file's base name.
    pub fn render(&self, basename: bool) -> String {
        let file = if basename {
            self.file
                .file_name()
                .map(Path::new)
                .unwrap_or(self.file.as_path())
        } else {
            self.file.as_path()
        };
        format!("{}:{}", file.display(), self.line)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

/// One level of the host's nested execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationFrame {
    /// Target name
    pub target: String,
    /// Where the target is defined, if known
    pub location: Option<SourceLocation>,
    /// Breakpoint state
    pub flags: BreakpointFlags,
}

impl InvocationFrame {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            location: None,
            flags: BreakpointFlags::empty(),
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_flags(mut self, flags: BreakpointFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn has_breakpoint(&self) -> bool {
        self.flags.is_set()
    }
}

/// Why the host called into the debugger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// Before the target's prerequisites are checked
    BeforePrereq,
    /// After prerequisites, before the recipe
    AfterPrereq,
    /// After the recipe ran
    AfterCommand,
    /// A goal target has been brought up to date
    GoalUpdated,
    /// A build description was read
    ReadMakefile,
    /// The host hit an error
    ErrorHit,
    /// A step or next count ran out
    StepHit,
    /// Explicit call from the build description
    Explicit,
    #[default]
    NotGiven,
}

impl StopReason {
    /// Short marker shown in front of the location banner.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::BeforePrereq => "->",
            Self::AfterPrereq => "..",
            Self::AfterCommand => "<-",
            Self::GoalUpdated => "<>",
            Self::ReadMakefile => "++",
            Self::ErrorHit => "!!",
            Self::StepHit => "--",
            Self::Explicit => ":o",
            Self::NotGiven => "  ",
        }
    }

    /// Reasons after which a temporary breakpoint is considered spent.
    pub fn clears_temporary(&self) -> bool {
        matches!(
            self,
            Self::AfterCommand | Self::BeforePrereq | Self::AfterPrereq
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::BeforePrereq => "before prerequisites",
            Self::AfterPrereq => "after prerequisites",
            Self::AfterCommand => "after recipe",
            Self::GoalUpdated => "goal updated",
            Self::ReadMakefile => "makefile read",
            Self::ErrorHit => "error",
            Self::StepHit => "step",
            Self::Explicit => "explicit call",
            Self::NotGiven => "not given",
        };
        write!(f, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_at_point() {
        let end = BreakpointFlags::END;
        assert!(end.at(StopReason::BeforePrereq).is_empty());
        assert!(end.at(StopReason::AfterPrereq).is_empty());
        assert_eq!(end.at(StopReason::AfterCommand), end);
        assert_eq!(end.at(StopReason::ErrorHit), end);

        let temp = BreakpointFlags::all_points() | BreakpointFlags::TEMPORARY;
        assert_eq!(
            temp.at(StopReason::AfterPrereq),
            BreakpointFlags::RUN | BreakpointFlags::TEMPORARY
        );
        let temp_end = BreakpointFlags::END | BreakpointFlags::TEMPORARY;
        assert!(temp_end.at(StopReason::BeforePrereq).is_empty());
    }

    #[test]
    fn test_flags_display() {
        assert_eq!(BreakpointFlags::empty().to_string(), "none");
        let flags = BreakpointFlags::RUN | BreakpointFlags::TEMPORARY;
        assert_eq!(flags.to_string(), "run,temp");
    }

    #[test]
    fn test_location_render() {
        let loc = SourceLocation::new("/src/project/Makefile", 12);
        assert_eq!(loc.render(false), "/src/project/Makefile:12");
        assert_eq!(loc.render(true), "Makefile:12");
    }

    #[test]
    fn test_frame_builder() {
        let frame = InvocationFrame::new("all")
            .with_location(SourceLocation::new("Makefile", 3))
            .with_flags(BreakpointFlags::END);
        assert!(frame.has_breakpoint());
        assert_eq!(frame.location.unwrap().line, 3);
    }

    #[test]
    fn test_temporary_clearing_reasons() {
        assert!(StopReason::AfterCommand.clears_temporary());
        assert!(StopReason::BeforePrereq.clears_temporary());
        assert!(StopReason::AfterPrereq.clears_temporary());
        assert!(!StopReason::ErrorHit.clears_temporary());
        assert!(!StopReason::StepHit.clears_temporary());
    }
}
