//! Running a live-output process that the operator can abort with Ctrl-C.
//!
//! The child's own exit and the interrupt signal race; whichever fires first
//! decides the [`StreamOutcome`]. Signal handlers are installed before the
//! child is spawned and the previous dispositions are back in place by the
//! time [`stream_until_interrupted`] returns.

use std::future::Future;
use std::process::Stdio;

use tracing::{debug, warn};

use crate::command::{Invocation, StreamOutcome};
use crate::error::CommandError;

/// Run `invocation` with inherited stdout/stderr until it exits or `cancel`
/// resolves.
///
/// On cancellation the child is killed and reaped before returning. A failed
/// kill is reported in the outcome, not as an error.
pub async fn run_until_cancelled<C>(
    invocation: &Invocation,
    cancel: C,
) -> Result<StreamOutcome, CommandError>
where
    C: Future<Output = ()>,
{
    let mut std_cmd = invocation.to_std();
    std_cmd
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    // A separate process group keeps the terminal's SIGINT away from the
    // child, so only the cancellation branch below can end an interrupted run.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        std_cmd.process_group(0);
    }

    let mut cmd = tokio::process::Command::from(std_cmd);
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| CommandError::Spawn {
        program: invocation.program().to_string(),
        source,
    })?;
    debug!(pid = ?child.id(), command = %invocation, "streaming process started");

    tokio::select! {
        status = child.wait() => {
            match status {
                Ok(status) => debug!(%status, "streaming process exited"),
                Err(e) => warn!(error = %e, "failed to wait for streaming process"),
            }
            Ok(StreamOutcome::Completed)
        }
        _ = cancel => {
            debug!("interrupt received, killing streaming process");
            let kill_error = child.kill().await.err();
            if let Some(e) = &kill_error {
                warn!(error = %e, "failed to kill streaming process");
            }
            Ok(StreamOutcome::Interrupted { kill_error })
        }
    }
}

/// Run `invocation` until it exits or the program receives SIGINT/SIGTERM.
///
/// Blocks the calling thread on a current-thread runtime that exists only for
/// this call. If the handlers cannot be installed the child is left to finish
/// on its own.
pub fn stream_until_interrupted(invocation: &Invocation) -> Result<StreamOutcome, CommandError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| CommandError::Runtime {
            program: invocation.program().to_string(),
            source,
        })?;

    runtime.block_on(async {
        let listener = match InterruptListener::install() {
            Ok(listener) => Some(listener),
            Err(e) => {
                warn!(error = %e, "cannot listen for interrupt signals");
                None
            }
        };
        let cancel = async {
            match &listener {
                Some(listener) => listener.interrupted().await,
                None => std::future::pending().await,
            }
        };
        run_until_cancelled(invocation, cancel).await
    })
}

#[cfg(unix)]
type InterruptListener = crate::signals::SignalScope;

#[cfg(not(unix))]
struct InterruptListener;

// Console control handlers stay registered on Windows; only Unix gets the
// scoped variant.
#[cfg(not(unix))]
impl InterruptListener {
    fn install() -> std::io::Result<Self> {
        Ok(InterruptListener)
    }

    async fn interrupted(&self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn process_exiting_first_completes() {
        let inv = Invocation::new("true");
        let outcome = run_until_cancelled(&inv, std::future::pending::<()>())
            .await
            .unwrap();
        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn failing_process_still_completes() {
        let inv = Invocation::new("false");
        let outcome = run_until_cancelled(&inv, std::future::pending::<()>())
            .await
            .unwrap();
        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn missing_executable_is_spawn_error() {
        let inv = Invocation::new("nonexistent_command_12345");
        let result = run_until_cancelled(&inv, std::future::pending::<()>()).await;
        assert!(matches!(result, Err(CommandError::Spawn { .. })));
    }

    #[tokio::test]
    #[cfg(target_os = "linux")]
    async fn cancellation_kills_running_process() {
        let pid_file = std::env::temp_dir().join(format!(
            "interrupt_tests_{}_pid",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&pid_file);

        let script = format!("echo $$ > {}; exec sleep 30", pid_file.display());
        let inv = Invocation::new("sh").arg("-c").arg(script);

        let started = Instant::now();
        let outcome = run_until_cancelled(&inv, tokio::time::sleep(Duration::from_millis(300)))
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));
        match outcome {
            StreamOutcome::Interrupted { kill_error } => assert!(kill_error.is_none()),
            StreamOutcome::Completed => panic!("expected the run to be interrupted"),
        }

        let pid = std::fs::read_to_string(&pid_file).expect("pid file");
        let _ = std::fs::remove_file(&pid_file);
        let proc_entry = std::path::PathBuf::from(format!("/proc/{}", pid.trim()));
        assert!(!proc_entry.exists(), "process {} still running", pid.trim());
    }

    #[test]
    #[cfg(unix)]
    fn interrupt_handlers_are_restored_after_each_run() {
        use crate::signals::{SignalScope, current_handler};

        let before = (current_handler(libc::SIGINT), current_handler(libc::SIGTERM));

        let outcome = stream_until_interrupted(&Invocation::new("true")).unwrap();
        assert!(outcome.is_completed());
        assert_eq!(
            (current_handler(libc::SIGINT), current_handler(libc::SIGTERM)),
            before
        );

        // A signal that lands before the child is spawned still cancels it.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let started = Instant::now();
        let outcome = runtime
            .block_on(async {
                let scope = SignalScope::install().unwrap();
                assert_ne!(current_handler(libc::SIGTERM), before.1);
                assert_eq!(unsafe { libc::raise(libc::SIGTERM) }, 0);
                run_until_cancelled(&Invocation::new("sleep").arg("30"), scope.interrupted())
                    .await
            })
            .unwrap();
        assert!(!outcome.is_completed());
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(
            (current_handler(libc::SIGINT), current_handler(libc::SIGTERM)),
            before
        );
    }
}
