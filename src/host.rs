//! Host collaborator
//!
//! The build engine owns variables, breakpoints, targets and build
//! descriptions. Commands reach them through the [`Host`] trait; every
//! method has a conservative default so a host only implements what it
//! supports.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frame::{BreakpointFlags, InvocationFrame, SourceLocation};
use crate::{Error, Result};

static VARIABLE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\(([A-Za-z0-9_.\-]+)\)|\{([A-Za-z0-9_.\-]+)\})").expect("valid regex")
});

/// What the debugger needs from the build engine
pub trait Host {
    /// Value of a variable
    fn variable(&self, _name: &str) -> Option<String> {
        None
    }

    /// Redefine an existing variable
    fn define_variable(&mut self, name: &str, _value: &str) -> Result<()> {
        Err(Error::Host(format!("cannot define variable {}", name)))
    }

    /// Expand variable references in `text`
    fn expand(&self, text: &str) -> String {
        text.to_string()
    }

    /// Store a breakpoint on a target
    fn add_breakpoint(&mut self, target: &str, _flags: BreakpointFlags) -> Result<()> {
        Err(Error::Host(format!("cannot set a breakpoint on {}", target)))
    }

    /// Remove a breakpoint; false if there was none
    fn delete_breakpoint(&mut self, _target: &str) -> bool {
        false
    }

    /// All stored breakpoints
    fn breakpoints(&self) -> Vec<(String, BreakpointFlags)> {
        Vec::new()
    }

    /// One-paragraph description of a target
    fn describe_target(&self, _name: &str) -> Option<String> {
        None
    }

    /// Recipe lines of a target
    fn recipe(&self, _name: &str) -> Option<Vec<String>> {
        None
    }

    /// Text of a build description file
    fn read_source(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Read an additional build description
    fn load(&mut self, path: &Path) -> Result<()> {
        Err(Error::Host(format!("cannot load {}", path.display())))
    }
}

/// A target in a [`MemoryHost`] plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Prerequisites, in order
    #[serde(default)]
    pub deps: Vec<String>,

    /// Recipe lines
    #[serde(default)]
    pub recipe: Vec<String>,

    /// File the target is defined in
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Line the target is defined on
    #[serde(default)]
    pub line: u32,

    /// Prerequisites are built one nesting level deeper
    #[serde(default)]
    pub recurse: bool,
}

/// In-memory host, loadable from a TOML plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryHost {
    /// Default goal
    #[serde(default)]
    pub goal: Option<String>,

    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    #[serde(default)]
    pub targets: BTreeMap<String, TargetSpec>,

    #[serde(skip)]
    breakpoints: BTreeMap<String, BreakpointFlags>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a plan from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a plan file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn with_variable(mut self, name: &str, value: &str) -> Self {
        self.variables.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_target(mut self, name: &str, spec: TargetSpec) -> Self {
        self.targets.insert(name.to_string(), spec);
        self
    }

    /// Breakpoint flags stored for a target
    pub fn breakpoint_flags(&self, target: &str) -> BreakpointFlags {
        self.breakpoints.get(target).copied().unwrap_or_default()
    }

    /// Drop a temporary breakpoint that fired, unless it was replaced while
    /// the debugger was stopped.
    pub fn spend_breakpoint(&mut self, target: &str, fired: BreakpointFlags) {
        if self.breakpoints.get(target) == Some(&fired) {
            self.breakpoints.remove(target);
        }
    }

    /// Frame for a target, carrying its location and stored breakpoint
    pub fn frame_for(&self, target: &str) -> InvocationFrame {
        let mut frame = InvocationFrame::new(target).with_flags(self.breakpoint_flags(target));
        if let Some(file) = self.targets.get(target).and_then(|t| t.file.clone()) {
            let line = self.targets.get(target).map(|t| t.line).unwrap_or_default();
            frame = frame.with_location(SourceLocation::new(file, line));
        }
        frame
    }
}

impl Host for MemoryHost {
    fn variable(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }

    fn define_variable(&mut self, name: &str, value: &str) -> Result<()> {
        match self.variables.get_mut(name) {
            Some(slot) => {
                *slot = value.to_string();
                Ok(())
            }
            None => Err(Error::Host(format!("no variable {}", name))),
        }
    }

    fn expand(&self, text: &str) -> String {
        VARIABLE_REF
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                self.variables.get(name).cloned().unwrap_or_default()
            })
            .into_owned()
    }

    fn add_breakpoint(&mut self, target: &str, flags: BreakpointFlags) -> Result<()> {
        if !self.targets.contains_key(target) {
            return Err(Error::InvalidArgument(format!(
                "Can't find target {}; breakpoint not set.",
                target
            )));
        }
        self.breakpoints.insert(target.to_string(), flags);
        Ok(())
    }

    fn delete_breakpoint(&mut self, target: &str) -> bool {
        self.breakpoints.remove(target).is_some()
    }

    fn breakpoints(&self) -> Vec<(String, BreakpointFlags)> {
        self.breakpoints
            .iter()
            .map(|(name, flags)| (name.clone(), *flags))
            .collect()
    }

    fn describe_target(&self, name: &str) -> Option<String> {
        let spec = self.targets.get(name)?;
        let mut text = format!("{}: {}", name, spec.deps.join(" "));
        if let Some(file) = &spec.file {
            text.push_str(&format!("\n#  defined at {}:{}", file.display(), spec.line));
        }
        for line in &spec.recipe {
            text.push_str(&format!("\n\t{}", line));
        }
        Some(text)
    }

    fn recipe(&self, name: &str) -> Option<Vec<String>> {
        self.targets.get(name).map(|t| t.recipe.clone())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let other = Self::from_file(path)?;
        debug!(
            path = %path.display(),
            targets = other.targets.len(),
            "Loaded plan"
        );
        self.variables.extend(other.variables);
        self.targets.extend(other.targets);
        if self.goal.is_none() {
            self.goal = other.goal;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
goal = "all"

[variables]
CC = "gcc"
CFLAGS = "-O2"

[targets.all]
deps = ["prog"]
file = "Makefile"
line = 1

[targets.prog]
recipe = ["$(CC) ${CFLAGS} -o prog prog.c"]
file = "Makefile"
line = 4
"#;

    #[test]
    fn test_parse_plan() {
        let host = MemoryHost::from_toml_str(PLAN).unwrap();
        assert_eq!(host.goal.as_deref(), Some("all"));
        assert_eq!(host.targets["all"].deps, vec!["prog"]);
        assert_eq!(host.variable("CC").as_deref(), Some("gcc"));
    }

    #[test]
    fn test_expand_both_reference_styles() {
        let host = MemoryHost::from_toml_str(PLAN).unwrap();
        let recipe = &host.recipe("prog").unwrap()[0];
        assert_eq!(host.expand(recipe), "gcc -O2 -o prog prog.c");
        assert_eq!(host.expand("$(MISSING)x"), "x");
        assert_eq!(host.expand("no refs"), "no refs");
    }

    #[test]
    fn test_define_requires_existing_variable() {
        let mut host = MemoryHost::new().with_variable("CC", "gcc");
        host.define_variable("CC", "clang").unwrap();
        assert_eq!(host.variable("CC").as_deref(), Some("clang"));
        assert!(host.define_variable("LD", "ld").is_err());
    }

    #[test]
    fn test_breakpoints_and_frames() {
        let mut host = MemoryHost::from_toml_str(PLAN).unwrap();
        host.add_breakpoint("prog", BreakpointFlags::RUN).unwrap();
        assert!(host.add_breakpoint("nope", BreakpointFlags::RUN).is_err());

        let frame = host.frame_for("prog");
        assert_eq!(frame.flags, BreakpointFlags::RUN);
        assert_eq!(frame.location.as_ref().unwrap().line, 4);

        host.spend_breakpoint("prog", BreakpointFlags::END);
        assert_eq!(host.breakpoint_flags("prog"), BreakpointFlags::RUN);
        host.spend_breakpoint("prog", BreakpointFlags::RUN);
        assert!(host.breakpoints().is_empty());
        assert!(!host.delete_breakpoint("prog"));
    }

    #[test]
    fn test_describe_target() {
        let host = MemoryHost::from_toml_str(PLAN).unwrap();
        let text = host.describe_target("prog").unwrap();
        assert!(text.starts_with("prog:"));
        assert!(text.contains("Makefile:4"));
        assert!(host.describe_target("nope").is_none());
    }

    #[test]
    fn test_load_merges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.toml");
        std::fs::write(&path, "[variables]\nLD = \"ld\"\n[targets.clean]\n").unwrap();

        let mut host = MemoryHost::from_toml_str(PLAN).unwrap();
        host.load(&path).unwrap();
        assert!(host.targets.contains_key("clean"));
        assert_eq!(host.variable("LD").as_deref(), Some("ld"));
        assert_eq!(host.goal.as_deref(), Some("all"));
    }
}
