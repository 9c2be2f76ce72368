use anyhow::Result;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Source of operator input, one line at a time.
pub trait LineSource {
    /// Show `prompt` and read one line without its trailing newline.
    ///
    /// Returns `Ok(None)` when the operator ends input (Ctrl-D) or aborts
    /// the prompt (Ctrl-C).
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Line editor on the controlling terminal.
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let prompt = prompt.white().bold().to_string();
        match self.editor.readline(&prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
