//! Blocking tool execution with outcome classification.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::invocation::ToolInvocation;

/// Outcome of one tool invocation.
///
/// Absence, findings, and crashes are distinct outcomes so the caller can
/// degrade a missing tool to a skipped check instead of aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ToolResult {
    /// The process started and exited. Non-zero exit codes are normal for
    /// scanners that signal "findings present" this way.
    Completed {
        exit_code: i64,
        stdout: String,
        stderr: String,
    },
    /// The executable could not be located.
    NotFound,
    /// The configured timeout elapsed; the child was killed and reaped.
    TimedOut { seconds: u64 },
    /// Spawning or waiting failed in an unexpected way.
    Crashed { message: String },
}

impl ToolResult {
    /// True only for a clean zero exit.
    pub fn success(&self) -> bool {
        matches!(self, Self::Completed { exit_code: 0, .. })
    }

    /// Exit code, if the process ran to completion.
    pub fn exit_code(&self) -> Option<i64> {
        match self {
            Self::Completed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Combined stdout + stderr for report bodies; empty for non-completions.
    pub fn combined_output(&self) -> String {
        match self {
            Self::Completed { stdout, stderr, .. } => {
                if stdout.is_empty() {
                    stderr.clone()
                } else if stderr.is_empty() {
                    stdout.clone()
                } else {
                    format!("{}\n{}", stdout, stderr)
                }
            }
            _ => String::new(),
        }
    }
}

/// Runs external commands synchronously and classifies the outcome.
///
/// The poll interval only affects timeout granularity.
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    poll_interval: Duration,
}

impl Default for ToolInvoker {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl ToolInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a binary is runnable, without capturing its output.
    pub fn probe(&self, program: &str) -> bool {
        Command::new(program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    /// Run the invocation to completion and classify the result.
    ///
    /// Never returns an error: every failure mode maps onto a
    /// [`ToolResult`] variant.
    pub fn run(&self, invocation: &ToolInvocation) -> ToolResult {
        debug!("Executing: {}", invocation.command_line());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = invocation.working_dir() {
            cmd.current_dir(dir);
        }
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Tool not found: {}", invocation.program);
                return ToolResult::NotFound;
            }
            Err(e) => {
                return ToolResult::Crashed {
                    message: format!("failed to spawn {}: {}", invocation.program, e),
                };
            }
        };

        let stdout_handle = child.stdout.take().map(Self::drain_stream);
        let stderr_handle = child.stderr.take().map(Self::drain_stream);

        let status = match invocation.timeout {
            Some(timeout) => match self.wait_with_timeout(&mut child, timeout) {
                Ok(Some(status)) => status,
                Ok(None) => {
                    warn!(
                        "{} exceeded {}s timeout, killed",
                        invocation.program,
                        timeout.as_secs()
                    );
                    return ToolResult::TimedOut {
                        seconds: timeout.as_secs(),
                    };
                }
                Err(message) => return ToolResult::Crashed { message },
            },
            None => match child.wait() {
                Ok(status) => status,
                Err(e) => {
                    return ToolResult::Crashed {
                        message: format!("failed to wait for {}: {}", invocation.program, e),
                    };
                }
            },
        };

        let stdout = stdout_handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        let stderr = stderr_handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        ToolResult::Completed {
            exit_code: status.code().map(i64::from).unwrap_or(-1),
            stdout,
            stderr,
        }
    }

    /// Poll the child until it exits or the timeout elapses.
    ///
    /// On timeout the child is killed and reaped, then `Ok(None)` is
    /// returned; no orphaned process is left behind.
    fn wait_with_timeout(
        &self,
        child: &mut Child,
        timeout: Duration,
    ) -> Result<Option<std::process::ExitStatus>, String> {
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(Some(status)),
                Ok(None) => {
                    if start.elapsed() > timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Ok(None);
                    }
                    std::thread::sleep(self.poll_interval);
                }
                Err(e) => return Err(format!("failed to wait for process: {}", e)),
            }
        }
    }

    /// Collect a child stream line by line on a background thread.
    fn drain_stream<R: Read + Send + 'static>(stream: R) -> std::thread::JoinHandle<String> {
        std::thread::spawn(move || {
            let reader = BufReader::new(stream);
            let mut output = String::new();
            for line in reader.lines().map_while(Result::ok) {
                output.push_str(&line);
                output.push('\n');
            }
            output
        })
    }
}
