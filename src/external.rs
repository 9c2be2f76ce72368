use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::debug;

use crate::command::{CommandRunner, Invocation, StreamOutcome};
use crate::error::CommandError;
use crate::interrupt;

/// [`CommandRunner`] that starts real processes.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<(), CommandError> {
        debug!(command = %invocation, "running");
        let status = invocation
            .to_std()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| spawn_error(invocation, source))?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                program: invocation.program().to_string(),
                status,
            })
        }
    }

    fn capture(&mut self, invocation: &Invocation) -> Result<String, CommandError> {
        debug!(command = %invocation, "capturing");
        let output = invocation
            .to_std()
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| spawn_error(invocation, source))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(CommandError::Failed {
                program: invocation.program().to_string(),
                status: output.status,
            })
        }
    }

    fn stream_until_interrupted(
        &mut self,
        invocation: &Invocation,
    ) -> Result<StreamOutcome, CommandError> {
        interrupt::stream_until_interrupted(invocation)
    }
}

fn spawn_error(invocation: &Invocation, source: std::io::Error) -> CommandError {
    CommandError::Spawn {
        program: invocation.program().to_string(),
        source,
    }
}

/// Locate `program` the way a shell would before running it.
///
/// Paths with more than one component are checked as given; bare names are
/// searched for in each directory of `search_paths` (a PATH-style list).
pub fn find_executable(search_paths: &OsStr, program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, _) => None,
        (Some(name), None) if !path.is_absolute() => std::env::split_paths(search_paths)
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file()),
        _ => path.is_file().then(|| path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing() {
        let found = find_executable(osstr("/nowhere"), "/bin/sh");
        assert_eq!(found.as_deref(), Some(Path::new("/bin/sh")));
    }

    #[test]
    #[cfg(unix)]
    fn absolute_missing() {
        assert!(find_executable(osstr("/bin"), "/bin/nonexisting").is_none());
    }

    #[test]
    #[cfg(unix)]
    fn bare_name_found_in_search_path() {
        let found = find_executable(osstr("/nowhere:/bin"), "sh").expect("sh in /bin");
        assert!(found.starts_with("/bin"));
        assert!(found.ends_with("sh"));
    }

    #[test]
    fn bare_name_not_found() {
        assert!(find_executable(osstr("/bin"), "nonexisting_12345").is_none());
    }

    #[test]
    fn empty_name_is_none() {
        assert!(find_executable(osstr("/bin"), "").is_none());
    }

    #[test]
    #[cfg(unix)]
    fn run_reports_non_zero_exit() {
        let mut runner = SystemRunner::new();
        let err = runner.run(&Invocation::new("false")).unwrap_err();
        assert!(matches!(err, CommandError::Failed { .. }));
    }

    #[test]
    fn run_reports_missing_executable() {
        let mut runner = SystemRunner::new();
        let err = runner
            .run(&Invocation::new("nonexistent_command_12345"))
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn capture_returns_stdout_and_passes_environment() {
        let mut runner = SystemRunner::new();
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("printf '%s' \"$CAPTURE_TEST_VALUE\"")
            .env("CAPTURE_TEST_VALUE", "it's passed");
        assert_eq!(runner.capture(&inv).unwrap(), "it's passed");
    }

    #[test]
    #[cfg(unix)]
    fn capture_blank_output() {
        let mut runner = SystemRunner::new();
        assert!(runner.capture(&Invocation::new("true")).unwrap().trim().is_empty());
    }
}
