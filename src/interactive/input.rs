//! Line acquisition
//!
//! The loop reads lines through [`LineSource`]: an editing terminal when
//! one is available, a plain buffered reader otherwise (and in tests).

use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use crate::config::HistoryConfig;
use crate::Result;

/// Outcome of one read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    /// A line, trimmed
    Line(String),
    /// Interrupted at the prompt
    Interrupted,
    /// End of input
    Eof,
}

/// Where the loop gets its lines from
pub trait LineSource {
    /// Show `prompt` and read one line.
    fn read_line(&mut self, prompt: &str) -> Result<ReadLine>;

    /// Remember a line for recall
    fn add_history(&mut self, _line: &str) {}

    /// Persist remembered lines
    fn save_history(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Interactive line editor with history
pub struct EditorSource {
    editor: DefaultEditor,
    history_file: Option<PathBuf>,
}

impl EditorSource {
    pub fn new(history: &HistoryConfig) -> Result<Self> {
        let config = rustyline::Config::builder()
            .max_history_size(history.max_entries)?
            .auto_add_history(false)
            .build();
        let mut editor = DefaultEditor::with_config(config)?;

        if let Some(file) = &history.file {
            if file.exists() {
                if let Err(e) = editor.load_history(file) {
                    warn!(file = %file.display(), error = %e, "Failed to load history");
                }
            }
        }

        Ok(Self {
            editor,
            history_file: history.file.clone(),
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadLine> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadLine::Line(line.trim().to_string())),
            Err(ReadlineError::Interrupted) => Ok(ReadLine::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadLine::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            debug!(error = %e, "Failed to add history entry");
        }
    }

    fn save_history(&mut self) -> Result<()> {
        if let Some(file) = &self.history_file {
            self.editor.save_history(file)?;
        }
        Ok(())
    }
}

/// Plain reader: prints the prompt to `writer`, reads from `reader`
pub struct PlainSource<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> PlainSource<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl PlainSource<StdinLock<'static>, Stdout> {
    /// Plain reader on the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LineSource for PlainSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadLine> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(ReadLine::Eof);
        }
        Ok(ReadLine::Line(line.trim().to_string()))
    }
}

/// Pick a line source: the editor when editing is on and stdin is a
/// terminal, the plain reader otherwise or if the editor can't start.
pub fn open(line_editing: bool, history: &HistoryConfig) -> Box<dyn LineSource> {
    if line_editing && io::stdin().is_terminal() {
        match EditorSource::new(history) {
            Ok(source) => {
                debug!("Using line editor");
                return Box::new(source);
            }
            Err(e) => warn!(error = %e, "Line editor unavailable, reading plain lines"),
        }
    }
    Box::new(PlainSource::stdio())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_plain_source_trims_and_prompts() {
        let mut out = Vec::new();
        {
            let mut source = PlainSource::new(Cursor::new("  step 2  \r\n\nquit\n"), &mut out);
            assert_eq!(
                source.read_line("db<0> ").unwrap(),
                ReadLine::Line("step 2".to_string())
            );
            assert_eq!(source.read_line("db<1> ").unwrap(), ReadLine::Line(String::new()));
            assert_eq!(source.read_line("db<1> ").unwrap(), ReadLine::Line("quit".to_string()));
            assert_eq!(source.read_line("db<2> ").unwrap(), ReadLine::Eof);
        }
        assert_eq!(String::from_utf8(out).unwrap(), "db<0> db<1> db<1> db<2> ");
    }

    #[test]
    fn test_plain_source_history_is_noop() {
        let mut source = PlainSource::new(Cursor::new(""), io::sink());
        source.add_history("step");
        source.save_history().unwrap();
    }
}
