//! Operator-facing output: one prefixed, colored line per outcome.

use std::io::{self, IsTerminal, Write};

use colored::Colorize;

/// Writes status lines to an output and an error stream.
///
/// Success, info and warning lines go to `out`; errors go to `err`.
pub struct Reporter {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    clear_screen: bool,
}

impl Reporter {
    /// Reporter that never clears the screen.
    pub fn new(out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Self {
            out,
            err,
            clear_screen: false,
        }
    }

    /// Reporter bound to the process's stdout and stderr.
    ///
    /// Screen clearing follows the color setting (including `--no-color`)
    /// and is off when stdout is not a terminal.
    pub fn stdio() -> Self {
        let clear = io::stdout().is_terminal()
            && colored::control::SHOULD_COLORIZE.should_colorize();
        Self::new(Box::new(io::stdout()), Box::new(io::stderr())).with_screen_clearing(clear)
    }

    pub fn with_screen_clearing(mut self, enabled: bool) -> Self {
        self.clear_screen = enabled;
        self
    }

    pub fn success(&mut self, msg: &str) {
        let line = format!("\n✔ {}", msg).green().bold();
        self.emit_out(line);
    }

    pub fn error(&mut self, msg: &str) {
        let line = format!("\n✖ Error: {}", msg).red().bold();
        // Nothing sensible to do if the terminal itself is gone.
        let _ = writeln!(self.err, "{}", line);
        let _ = self.err.flush();
    }

    pub fn info(&mut self, msg: &str) {
        let line = format!("\nℹ {}", msg).blue().bold();
        self.emit_out(line);
    }

    pub fn warning(&mut self, msg: &str) {
        let line = format!("! Warning: {}", msg).yellow();
        self.emit_out(line);
    }

    /// Unprefixed highlighted note.
    pub fn note(&mut self, msg: &str) {
        self.emit_out(msg.yellow());
    }

    /// Print text as is, e.g. captured tool output.
    pub fn plain(&mut self, text: &str) {
        self.emit_out(text);
    }

    /// Echo a command before it runs.
    pub fn executing(&mut self, command: &dyn std::fmt::Display) {
        self.emit_out(format!("▶ Executing: {}", command).magenta());
    }

    /// Clear the terminal, if escape codes are allowed on `out`.
    pub fn clear_screen(&mut self) {
        if !self.clear_screen {
            return;
        }
        let _ = write!(self.out, "\x1B[2J\x1B[1;1H");
        let _ = self.out.flush();
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    fn emit_out(&mut self, line: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }
}
