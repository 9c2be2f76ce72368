//! SIGINT/SIGTERM handling that can be taken back.
//!
//! `tokio::signal` installs process-wide handlers that stay for the life of
//! the process, which would leave the manager deaf to Ctrl-C and SIGTERM once
//! a log view had run. [`SignalScope`] installs its own handler with
//! `sigaction`, remembers what was there before and puts it back on drop.
//! The handler only writes a byte to a non-blocking self-pipe; the read end
//! is awaited through tokio's reactor.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicI32, Ordering};

use tokio::io::unix::AsyncFd;
use tracing::{debug, warn};

const SIGNALS: [libc::c_int; 2] = [libc::SIGINT, libc::SIGTERM];

/// Write end of the pipe of the active scope, or -1.
static WAKE_FD: AtomicI32 = AtomicI32::new(-1);

extern "C" fn on_signal(_signum: libc::c_int) {
    let fd = WAKE_FD.load(Ordering::SeqCst);
    if fd >= 0 {
        let byte = 1u8;
        // A full pipe already holds a pending wake-up.
        unsafe {
            libc::write(fd, (&byte as *const u8).cast(), 1);
        }
    }
}

/// Interrupt handlers installed for as long as this value lives.
///
/// Only one scope can be active at a time. Must be created inside a tokio
/// runtime with I/O enabled.
pub struct SignalScope {
    reader: AsyncFd<OwnedFd>,
    _writer: OwnedFd,
    previous: Vec<(libc::c_int, libc::sigaction)>,
}

impl SignalScope {
    /// Install the handlers. Signals arriving from here on are remembered
    /// until [`SignalScope::interrupted`] observes them.
    pub fn install() -> io::Result<Self> {
        let (reader, writer) = wake_pipe()?;
        let reader = AsyncFd::new(reader)?;

        WAKE_FD
            .compare_exchange(-1, writer.as_raw_fd(), Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| io::Error::other("interrupt handlers are already installed"))?;

        // From here on Drop undoes whatever was installed.
        let mut scope = SignalScope {
            reader,
            _writer: writer,
            previous: Vec::with_capacity(SIGNALS.len()),
        };
        for signum in SIGNALS {
            let previous = install_handler(signum)?;
            scope.previous.push((signum, previous));
        }
        debug!("interrupt handlers installed");
        Ok(scope)
    }

    /// Resolves once SIGINT or SIGTERM has been received since
    /// [`SignalScope::install`].
    pub async fn interrupted(&self) {
        loop {
            let mut guard = match self.reader.readable().await {
                Ok(guard) => guard,
                Err(e) => {
                    warn!(error = %e, "cannot wait for interrupt signals");
                    return std::future::pending().await;
                }
            };
            match guard.try_io(|fd| read_byte(fd.get_ref().as_raw_fd())) {
                Ok(Ok(0)) => return std::future::pending().await,
                Ok(Ok(_)) => {
                    debug!("interrupt signal received");
                    return;
                }
                Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                Ok(Err(e)) => {
                    warn!(error = %e, "cannot read interrupt notification");
                    return std::future::pending().await;
                }
                Err(_would_block) => continue,
            }
        }
    }
}

impl Drop for SignalScope {
    fn drop(&mut self) {
        for (signum, previous) in self.previous.drain(..).rev() {
            let rc = unsafe { libc::sigaction(signum, &previous, std::ptr::null_mut()) };
            if rc == -1 {
                warn!(signum, error = %io::Error::last_os_error(), "failed to restore signal handler");
            }
        }
        WAKE_FD.store(-1, Ordering::SeqCst);
        debug!("interrupt handlers restored");
    }
}

fn install_handler(signum: libc::c_int) -> io::Result<libc::sigaction> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);

        let mut previous: libc::sigaction = std::mem::zeroed();
        if libc::sigaction(signum, &action, &mut previous) == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(previous)
    }
}

/// Non-blocking, close-on-exec pipe so spawned children never inherit it.
fn wake_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds: [RawFd; 2] = [-1; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } == -1 {
        return Err(io::Error::last_os_error());
    }
    let (reader, writer) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    for fd in [&reader, &writer] {
        let raw = fd.as_raw_fd();
        unsafe {
            let flags = libc::fcntl(raw, libc::F_GETFL);
            if flags == -1 || libc::fcntl(raw, libc::F_SETFL, flags | libc::O_NONBLOCK) == -1 {
                return Err(io::Error::last_os_error());
            }
            if libc::fcntl(raw, libc::F_SETFD, libc::FD_CLOEXEC) == -1 {
                return Err(io::Error::last_os_error());
            }
        }
    }
    Ok((reader, writer))
}

fn read_byte(fd: RawFd) -> io::Result<usize> {
    let mut byte = 0u8;
    let n = unsafe { libc::read(fd, (&mut byte as *mut u8).cast(), 1) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

#[cfg(test)]
pub(crate) fn current_handler(signum: libc::c_int) -> libc::sighandler_t {
    unsafe {
        let mut current: libc::sigaction = std::mem::zeroed();
        libc::sigaction(signum, std::ptr::null(), &mut current);
        current.sa_sigaction
    }
}
