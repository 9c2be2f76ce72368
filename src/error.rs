use std::process::ExitStatus;

use thiserror::Error;

/// Failure while running an external tool.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The executable could not be started (missing, not executable, ...).
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but reported failure.
    #[error("`{program}` {}", describe_status(.status))]
    Failed { program: String, status: ExitStatus },

    /// The async runtime used for interruptible runs could not be built.
    #[error("failed to prepare runtime for `{program}`: {source}")]
    Runtime {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Operator input rejected before any external command runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("database name '{name}' {reason}")]
    DatabaseName { name: String, reason: &'static str },

    #[error("{0} must not contain control characters")]
    ControlCharacter(&'static str),
}

fn describe_status(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with status {}", code),
        None => match terminated_by_signal(status) {
            Some(signal) => format!("was terminated by signal {}", signal),
            None => "terminated abnormally".to_string(),
        },
    }
}

#[cfg(unix)]
fn terminated_by_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
