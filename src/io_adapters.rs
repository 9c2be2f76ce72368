use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Result as IoResult, Write};
use std::rc::Rc;

use crate::prompt::LineSource;

/// Memory-backed writer for capturing operator-facing output.
///
/// Clones share one buffer, so a clone can be handed to a [`crate::Reporter`]
/// while the original is kept to inspect what was written.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

/// Pre-recorded operator input. Runs out like a closed terminal.
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl LineSource for ScriptedLines {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_buffer() {
        let writer = MemWriter::new();
        let mut handle = writer.clone();
        write!(handle, "hello").unwrap();
        assert_eq!(writer.contents(), "hello");
    }

    #[test]
    fn scripted_lines_run_out() {
        let mut input = ScriptedLines::new(["1"]);
        assert_eq!(input.read_line("a: ").unwrap().as_deref(), Some("1"));
        assert_eq!(input.read_line("b: ").unwrap(), None);
        assert_eq!(input.prompts(), ["a: ", "b: "]);
    }
}
