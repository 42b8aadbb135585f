//! Location and nesting context
//!
//! Resolves what the prompt and banners show: the current target, its
//! source location, the frame selected by `up`/`down`/`frame`, and the
//! nesting depth indicator.

use crate::frame::{InvocationFrame, SourceLocation, StopReason};

/// What the debugger is currently looking at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Displayed target name, empty if unknown
    pub target: String,
    /// Displayed source location, if known
    pub source: Option<SourceLocation>,
    /// Host nesting depth, 0 at top level
    pub depth: u32,
    /// Selected frame, counted from the top of the stack
    pub stack_pos: usize,
}

impl Location {
    /// Resolve the displayed location: the top of the stack if there is one,
    /// otherwise the frame handed over by the host, otherwise unknown.
    pub fn resolve(
        stack: &[InvocationFrame],
        fallback: Option<&InvocationFrame>,
        depth: u32,
    ) -> Self {
        let frame = stack.last().or(fallback);
        Self {
            target: frame.map(|f| f.target.clone()).unwrap_or_default(),
            source: frame.and_then(|f| f.location.clone()),
            depth,
            stack_pos: 0,
        }
    }

    /// Select the frame `pos` positions below the top of `stack`.
    pub fn select<'s>(
        &mut self,
        stack: &'s [InvocationFrame],
        pos: usize,
    ) -> Option<&'s InvocationFrame> {
        let frame = frame_at(stack, pos)?;
        self.stack_pos = pos;
        self.target = frame.target.clone();
        self.source = frame.location.clone();
        Some(frame)
    }

    /// Two-line banner shown when the debugger stops.
    pub fn describe(&self, reason: StopReason, basename: bool) -> String {
        let place = self
            .source
            .as_ref()
            .map(|s| s.render(basename))
            .unwrap_or_else(|| "unknown location".to_string());
        let target = if self.target.is_empty() {
            "<unknown target>"
        } else {
            self.target.as_str()
        };
        format!("{} ({})\n{}", reason.marker(), place, target)
    }
}

/// Frame `pos` positions below the top of `stack`
pub fn frame_at(stack: &[InvocationFrame], pos: usize) -> Option<&InvocationFrame> {
    let index = stack.len().checked_sub(pos + 1)?;
    stack.get(index)
}

/// Open/close depth markers: one pair per level, capped with `...`.
pub fn depth_indicator(depth: u32, cap: usize) -> (String, String) {
    let pairs = depth as usize + 1;
    // Elide only past the cap: `cap` levels still print in full
    if pairs > cap {
        (format!("{}...", "<".repeat(cap)), format!("{}...", ">".repeat(cap)))
    } else {
        ("<".repeat(pairs), ">".repeat(pairs))
    }
}

/// Build the prompt, e.g. `makedbg<<3>> `.
pub fn prompt(name: &str, depth: u32, cap: usize, count: usize) -> String {
    let (open, close) = depth_indicator(depth, cap);
    format!("{}{}{}{} ", name, open, count, close)
}
