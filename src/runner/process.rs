//! Subprocess execution with full stdout/stderr capture
//!
//! Both pipes are drained while the child runs, so a chatty analyzer can
//! never block on a full pipe buffer.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Output of a finished child process
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Captured {
    /// Standard error as trimmed text, lossily decoded
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(Debug)]
pub enum CaptureError {
    /// The process could not be started
    Spawn(io::Error),
    /// Waiting on or reading from the child failed
    Io(io::Error),
    /// The deadline passed before the child exited and its pipes closed
    TimedOut,
}

/// Run `command` to completion, capturing both output streams.
///
/// With a timeout the call returns by the deadline: a running child is
/// killed, and pipes still held open by its descendants are abandoned.
pub fn run(command: &mut Command, timeout: Option<Duration>) -> Result<Captured, CaptureError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    match timeout {
        // `output()` already reads both pipes concurrently
        None => {
            let output = command.output().map_err(CaptureError::Spawn)?;
            Ok(Captured {
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            })
        }
        Some(limit) => run_with_deadline(command, limit),
    }
}

fn run_with_deadline(command: &mut Command, limit: Duration) -> Result<Captured, CaptureError> {
    let mut child = command.spawn().map_err(CaptureError::Spawn)?;
    let deadline = Instant::now() + limit;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match wait_until(&mut child, deadline) {
        Ok(Some(status)) => status,
        Ok(None) => {
            log::debug!("Killing analyzer process {} after {:?}", child.id(), limit);
            let _ = child.kill();
            let _ = child.wait();
            // Readers are detached; they finish once every writer closes the pipes
            drop((stdout, stderr));
            return Err(CaptureError::TimedOut);
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CaptureError::Io(e));
        }
    };

    // A background descendant can keep the pipes open after the child exits
    Ok(Captured {
        status,
        stdout: collect(stdout, deadline)?,
        stderr: collect(stderr, deadline)?,
    })
}

fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

type Reader = Receiver<io::Result<Vec<u8>>>;

/// Read `pipe` to EOF on a detached thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Reader {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = match pipe {
            Some(mut pipe) => pipe.read_to_end(&mut buf).map(|_| buf),
            None => Ok(buf),
        };
        // The receiver is gone if the deadline already passed
        let _ = tx.send(result);
    });
    rx
}

fn collect(reader: Reader, deadline: Instant) -> Result<Vec<u8>, CaptureError> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    match reader.recv_timeout(remaining) {
        Ok(result) => result.map_err(CaptureError::Io),
        Err(RecvTimeoutError::Timeout) => {
            log::debug!("Analyzer output still open at deadline; abandoning readers");
            Err(CaptureError::TimedOut)
        }
        Err(RecvTimeoutError::Disconnected) => Err(CaptureError::Io(io::Error::other(
            "output reader thread panicked",
        ))),
    }
}
