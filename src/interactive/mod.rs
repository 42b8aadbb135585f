//! Interactive debugger
//!
//! - `commands`: command table, resolver and dispatch
//! - `handlers`: the command bodies
//! - `input`: where command lines come from
//! - `repl`: the entry point the host calls and the read-eval loop

pub mod commands;
pub mod handlers;
pub mod input;
pub mod repl;

pub use commands::{execute_line, is_abbrev_of, Command, CommandRegistry, Handler};
pub use handlers::CommandContext;
pub use input::{EditorSource, LineSource, PlainSource, ReadLine};
pub use repl::{Debugger, Interception};
