use std::fmt;

use crate::error::CommandError;

/// One external program call: executable name, ordered arguments and
/// environment variables handed to the child out of band.
///
/// Environment values are never part of [`fmt::Display`], so an invocation can
/// be echoed to the operator without leaking secrets passed through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set a variable on the child's environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_envs(&self) -> &[(String, String)] {
        &self.envs
    }

    pub(crate) fn to_std(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                // Multi-line scripts are summarized rather than dumped.
                let mut lines = arg.lines().map(str::trim).filter(|l| !l.is_empty());
                match (lines.next(), lines.next()) {
                    (Some(first), Some(_)) => write!(f, " '{} ...'", first)?,
                    _ => write!(f, " '{}'", arg)?,
                }
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// How an interruptible run finished.
#[derive(Debug)]
pub enum StreamOutcome {
    /// The process exited by itself.
    Completed,
    /// The operator interrupted the run and the process was killed.
    ///
    /// `kill_error` is set when the kill itself failed, in which case the
    /// process may still be around.
    Interrupted { kill_error: Option<std::io::Error> },
}

impl StreamOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StreamOutcome::Completed)
    }
}

/// Seam between the menu actions and the processes they start.
///
/// [`crate::SystemRunner`] spawns real processes; tests substitute a recorder.
pub trait CommandRunner {
    /// Run to completion with stdout and stderr connected to the terminal.
    fn run(&mut self, invocation: &Invocation) -> Result<(), CommandError>;

    /// Run to completion and return stdout as text. Stderr stays on the terminal.
    fn capture(&mut self, invocation: &Invocation) -> Result<String, CommandError>;

    /// Like [`CommandRunner::run`], but stop early when the operator sends an
    /// interrupt signal.
    fn stream_until_interrupted(
        &mut self,
        invocation: &Invocation,
    ) -> Result<StreamOutcome, CommandError>;
}
