//! Command registry and resolver
//!
//! Commands are looked up by long name, by one-character code, or through
//! an alias. Both tables are kept sorted so a lookup can stop as soon as it
//! has walked past the place the name would be.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use super::handlers::{self, CommandContext};
use crate::signal::LoopSignal;
use crate::{Error, Result};

/// Command handler: receives the trimmed argument string
pub type Handler = fn(&mut CommandContext<'_>, &str) -> Result<LoopSignal>;

/// A registered command
#[derive(Clone)]
pub struct Command {
    /// Full name, the registry's sort key
    pub long_name: &'static str,
    /// One-character code
    pub short_code: char,
    pub handler: Handler,
    /// One-line usage synopsis
    pub usage: &'static str,
    /// Help text; the first line is the summary
    pub help: &'static str,
    /// Registration order
    pub id: usize,
}

impl Command {
    pub fn new(
        long_name: &'static str,
        short_code: char,
        handler: Handler,
        usage: &'static str,
        help: &'static str,
    ) -> Self {
        Self {
            long_name,
            short_code,
            handler,
            usage,
            help,
            id: 0,
        }
    }

    /// First line of the help text
    pub fn summary(&self) -> &'static str {
        self.help.lines().next().unwrap_or_default()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("long_name", &self.long_name)
            .field("short_code", &self.short_code)
            .field("id", &self.id)
            .finish()
    }
}

/// An alternative name for a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alias {
    pub alias: &'static str,
    pub command: &'static str,
}

/// Immutable command table
#[derive(Debug)]
pub struct CommandRegistry {
    /// Sorted by long name
    commands: Vec<Command>,
    /// Sorted by alias name
    aliases: Vec<Alias>,
    by_code: HashMap<char, usize>,
}

static BUILTIN: OnceCell<Arc<CommandRegistry>> = OnceCell::new();

impl CommandRegistry {
    /// Build a registry. Fails if either table is out of order, if an alias
    /// names an unknown command, or if two commands share a code.
    pub fn build(commands: Vec<Command>, aliases: &[(&'static str, &'static str)]) -> Result<Self> {
        if let Some(pair) = commands
            .windows(2)
            .find(|w| w[0].long_name >= w[1].long_name)
        {
            return Err(Error::Registry(format!(
                "commands out of order: {} before {}",
                pair[0].long_name, pair[1].long_name
            )));
        }
        if let Some(pair) = aliases.windows(2).find(|w| w[0].0 >= w[1].0) {
            return Err(Error::Registry(format!(
                "aliases out of order: {} before {}",
                pair[0].0, pair[1].0
            )));
        }

        let commands: Vec<Command> = commands
            .into_iter()
            .enumerate()
            .map(|(id, command)| Command { id, ..command })
            .collect();

        let mut by_code = HashMap::new();
        for (index, command) in commands.iter().enumerate() {
            if let Some(previous) = by_code.insert(command.short_code, index) {
                return Err(Error::Registry(format!(
                    "code '{}' used by both {} and {}",
                    command.short_code, commands[previous].long_name, command.long_name
                )));
            }
        }

        let mut resolved = Vec::with_capacity(aliases.len());
        for &(alias, command) in aliases {
            if !commands.iter().any(|c| c.long_name == command) {
                return Err(Error::Registry(format!(
                    "alias {} names unknown command {}",
                    alias, command
                )));
            }
            resolved.push(Alias { alias, command });
        }

        debug!(
            commands = commands.len(),
            aliases = resolved.len(),
            "Built command registry"
        );

        Ok(Self {
            commands,
            aliases: resolved,
            by_code,
        })
    }

    /// The debugger's own command table
    pub fn builtin() -> Result<Self> {
        Self::build(handlers::builtin_commands(), handlers::BUILTIN_ALIASES)
    }

    /// Process-wide builtin registry, built on first use
    pub fn global() -> Result<Arc<Self>> {
        BUILTIN
            .get_or_try_init(|| Self::builtin().map(Arc::new))
            .cloned()
    }

    /// All commands, sorted by long name
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// All aliases, sorted by alias name
    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// Aliases that resolve to `long_name`
    pub fn aliases_of(&self, long_name: &str) -> Vec<&'static str> {
        self.aliases
            .iter()
            .filter(|a| a.command == long_name)
            .map(|a| a.alias)
            .collect()
    }

    pub fn by_code(&self, code: char) -> Option<&Command> {
        self.by_code.get(&code).map(|&i| &self.commands[i])
    }

    /// Look a name up through the alias table, then the long names.
    pub fn lookup(&self, name: &str) -> Option<&Command> {
        let mut name = name;
        for alias in &self.aliases {
            match name.cmp(alias.alias) {
                Ordering::Equal => {
                    name = alias.command;
                    break;
                }
                Ordering::Less => break,
                Ordering::Greater => {}
            }
        }

        for command in &self.commands {
            match name.cmp(command.long_name) {
                Ordering::Equal => return Some(command),
                Ordering::Less => break,
                Ordering::Greater => {}
            }
        }
        None
    }

    /// Find the command a typed token names. One-character tokens are
    /// codes first; anything else goes through aliases and long names.
    pub fn find(&self, token: &str) -> Option<&Command> {
        let mut chars = token.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            if let Some(command) = self.by_code(code) {
                return Some(command);
            }
        }
        self.lookup(token)
    }

    /// Split `line` into a command and its trimmed argument.
    pub fn resolve<'l>(&self, line: &'l str) -> Result<(&Command, &'l str)> {
        let (word, args) = split_word(line);
        let command = self
            .find(word)
            .ok_or_else(|| Error::UnknownCommand(word.to_string()))?;
        Ok((command, args))
    }
}

/// Resolve `line` and run its handler.
pub fn execute_line(ctx: &mut CommandContext<'_>, line: &str) -> Result<LoopSignal> {
    let registry = ctx.registry;
    let (command, args) = registry.resolve(line)?;
    debug!(command = command.long_name, args, "Dispatching command");
    (command.handler)(ctx, args)
}

/// First whitespace-delimited word and the trimmed rest.
pub fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.find(char::is_whitespace) {
        Some(end) => (&line[..end], line[end..].trim()),
        None => (line, ""),
    }
}

/// Whether `token` abbreviates `keyword` with at least `min` characters.
pub fn is_abbrev_of(token: &str, keyword: &str, min: usize) -> bool {
    token.len() >= min && keyword.starts_with(token)
}
