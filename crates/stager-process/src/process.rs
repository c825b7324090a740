//! Spawning processes with streamed output and a timeout

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use stager_translation::{Error, Result, TranslatableMessage};

use crate::output::{OutputCallback, OutputType};

/// How often the child is polled while no output is arriving.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long to wait for each queued line once the child has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Everything written to standard output
    pub stdout: String,
    /// Everything written to standard error
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Creates [`Process`]es.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessFactory;

impl ProcessFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create a process for `command`, whose first element is the program.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `command` is empty.
    pub fn create<I, S>(&self, command: I) -> Result<Process>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command: Vec<String> = command.into_iter().map(Into::into).collect();
        if command.is_empty() || command[0].is_empty() {
            return Err(Error::invalid_argument(TranslatableMessage::exception(
                "The process command must not be empty.",
            )));
        }
        Ok(Process {
            command,
            env: BTreeMap::new(),
            working_dir: None,
        })
    }
}

/// A command ready to run.
#[derive(Debug, Clone)]
pub struct Process {
    command: Vec<String>,
    env: BTreeMap<String, String>,
    working_dir: Option<PathBuf>,
}

impl Process {
    /// Override an environment variable for the child.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// The command as a single display string.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }

    /// Run to completion and return the captured output, whatever the exit code.
    ///
    /// Each output line is also passed to `callback` as it arrives. With a
    /// `timeout`, the child is killed once it has run that long and a
    /// [`Error::Runtime`] is returned.
    pub fn run(
        &self,
        mut callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput> {
        let started = Instant::now();

        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..])
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %self.command_line(), "Starting process");
        let mut child = cmd.spawn().map_err(|e| {
            Error::runtime(
                TranslatableMessage::exception("Failed to start the process \"%command%\".")
                    .with_parameter("%command%", self.command_line()),
            )
            .with_source(e)
        })?;

        let (tx, rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, OutputType::Out, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, OutputType::Err, tx);
        } else {
            drop(tx);
        }

        let mut output = ProcessOutput {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        };

        let status = match self.pump(&mut child, &rx, &mut callback, &mut output, started, timeout) {
            Ok(status) => status,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        output.exit_code = status.code();
        tracing::debug!(
            command = %self.command_line(),
            exit_code = ?output.exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Process finished"
        );
        Ok(output)
    }

    /// Like [`Process::run`], but a non-zero exit is a [`Error::Runtime`]
    /// carrying the process's standard error.
    pub fn must_run(
        &self,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput> {
        let output = self.run(callback, timeout)?;
        if output.success() {
            return Ok(output);
        }

        let code = output
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string());
        Err(Error::runtime(
            TranslatableMessage::exception(
                "The command \"%command%\" failed with exit code %code%: %error_output%",
            )
            .with_parameter("%command%", self.command_line())
            .with_parameter("%code%", code)
            .with_parameter("%error_output%", output.stderr.trim_end()),
        ))
    }

    /// Deliver output until the child exits.
    ///
    /// The child is polled on every turn, so a backgrounded grandchild that
    /// inherited the pipes cannot hold the call open.
    fn pump(
        &self,
        child: &mut Child,
        rx: &Receiver<(OutputType, String)>,
        callback: &mut Option<&mut dyn OutputCallback>,
        output: &mut ProcessOutput,
        started: Instant,
        timeout: Option<Duration>,
    ) -> Result<ExitStatus> {
        let mut streams_open = true;

        loop {
            if streams_open {
                match rx.recv_timeout(POLL_INTERVAL) {
                    Ok((kind, line)) => deliver(kind, line, output, callback),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => streams_open = false,
                }
            } else {
                thread::sleep(POLL_INTERVAL);
            }

            if let Some(status) = child.try_wait().map_err(|e| self.wait_failed(e))? {
                if streams_open {
                    drain(rx, callback, output);
                }
                return Ok(status);
            }

            if let Some(timeout) = timeout
                && started.elapsed() >= timeout
            {
                return Err(self.timed_out(timeout));
            }
        }
    }

    fn wait_failed(&self, e: std::io::Error) -> Error {
        Error::runtime(
            TranslatableMessage::exception("Failed to wait for the process \"%command%\".")
                .with_parameter("%command%", self.command_line()),
        )
        .with_source(e)
    }

    fn timed_out(&self, timeout: Duration) -> Error {
        tracing::warn!(command = %self.command_line(), ?timeout, "Process timed out");
        Error::runtime(
            TranslatableMessage::exception(
                "The process \"%command%\" exceeded the timeout of %timeout% seconds.",
            )
            .with_parameter("%command%", self.command_line())
            .with_parameter("%timeout%", timeout.as_secs_f64()),
        )
    }
}

fn deliver(
    kind: OutputType,
    line: String,
    output: &mut ProcessOutput,
    callback: &mut Option<&mut dyn OutputCallback>,
) {
    let buffer = match kind {
        OutputType::Out => &mut output.stdout,
        OutputType::Err => &mut output.stderr,
    };
    buffer.push_str(&line);
    buffer.push('\n');
    if let Some(cb) = callback.as_mut() {
        cb.on_output(kind, &line);
    }
}

/// Collect lines still in flight after the child exited.
///
/// Stops at the first quiet gap, since the pipes may stay open in a
/// grandchild for arbitrarily long.
fn drain(
    rx: &Receiver<(OutputType, String)>,
    callback: &mut Option<&mut dyn OutputCallback>,
    output: &mut ProcessOutput,
) {
    while let Ok((kind, line)) = rx.recv_timeout(DRAIN_GRACE) {
        deliver(kind, line, output, callback);
    }
}

/// Forward each line of `stream` to `tx` until it closes.
fn spawn_reader<R>(stream: R, kind: OutputType, tx: Sender<(OutputType, String)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches('\n').trim_end_matches('\r');
                    if tx.send((kind, line.to_string())).is_err() {
                        break;
                    }
                }
            }
        }
    });
}
