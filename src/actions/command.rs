//! Command action: run a shell command and capture its output.
//!
//! The command text goes through a shell so pipes and redirection work as
//! written. stdout and stderr are drained by one reader thread each, so a
//! chatty command can never block on a full pipe while the runner waits for
//! it. There is no timeout; a command that never exits holds the run until
//! the operator cancels it.
//!
//! On Unix the shell leads its own process group, so cancelling kills every
//! process the command started, not just the shell. Output is what arrived
//! by the time the shell exited (plus a short grace period); background
//! processes that keep the pipes open do not hold the run.

use crate::cancel::CancelToken;
use crate::config::CommandConfig;
use crate::error::{ReleaseError, Result};
use crate::template::render;
use crate::variables::{ProcessEnv, Variables};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a running child is checked for exit or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long the readers may keep draining after the shell has exited.
const READER_GRACE: Duration = Duration::from_millis(500);

#[cfg(not(windows))]
const DEFAULT_SHELL: &[&str] = &["sh", "-c"];
#[cfg(windows)]
const DEFAULT_SHELL: &[&str] = &["cmd", "/C"];

/// Captured result of a command action.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Everything the command wrote to stdout (lossy UTF-8, untrimmed).
    pub stdout: String,
    /// Everything the command wrote to stderr (lossy UTF-8, untrimmed).
    pub stderr: String,
    /// Exit status of the shell process.
    pub status: ExitStatus,
    /// True when the child was killed because the run was cancelled.
    pub killed: bool,
}

impl CommandOutput {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit code, if the process exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Resolve the shell invocation: the configured one split with shell-words,
/// or the platform default.
pub fn shell_invocation(shell: Option<&str>) -> Result<Vec<String>> {
    let Some(shell) = shell else {
        return Ok(DEFAULT_SHELL.iter().map(|s| s.to_string()).collect());
    };

    let parts = shell_words::split(shell).map_err(|e| {
        ReleaseError::Command(format!(
            "failed to parse shell '{}': {}\n\
             Fix: check for unmatched quotes or invalid escape sequences.",
            shell, e
        ))
    })?;

    if parts.is_empty() {
        return Err(ReleaseError::Command("shell must not be empty".to_string()));
    }
    Ok(parts)
}

/// Run `command` through `shell` with exactly `env` as its environment.
///
/// # Errors
///
/// `ReleaseError::Command` if the process cannot be spawned (missing shell,
/// missing working directory) or its status cannot be read. A non-zero exit
/// status is not an error; it is reported in [`CommandOutput::status`].
pub fn run(
    command: &str,
    shell: &[String],
    env: &ProcessEnv,
    working_directory: &Path,
    cancel: &CancelToken,
) -> Result<CommandOutput> {
    let (program, shell_args) = shell
        .split_first()
        .ok_or_else(|| ReleaseError::Command("shell must not be empty".to_string()))?;

    tracing::debug!(
        %command,
        shell = %shell.join(" "),
        cwd = %working_directory.display(),
        "spawning command"
    );

    let mut cmd = Command::new(program);
    cmd.args(shell_args)
        .arg(command)
        .env_clear()
        .envs(env)
        .current_dir(working_directory)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| {
            ReleaseError::Command(format!(
                "failed to spawn '{}' in '{}': {}",
                command,
                working_directory.display(),
                e
            ))
        })?;

    let stdout_capture = drain(child.stdout.take());
    let stderr_capture = drain(child.stderr.take());

    let (status, killed) = wait_or_kill(&mut child, cancel)?;

    let deadline = Instant::now() + READER_GRACE;
    let stdout = collect(stdout_capture, deadline);
    let stderr = collect(stderr_capture, deadline);

    if killed {
        tracing::warn!(%command, "command killed after cancellation");
    } else if !status.success() {
        tracing::warn!(%command, exit_code = ?status.code(), "command exited unsuccessfully");
    }

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        status,
        killed,
    })
}

/// Run a step's command action.
///
/// The command and `chdir` are rendered against the current variables. The
/// environment is the ambient process environment with the step's `env`
/// entries layered on top.
pub fn run_step(
    config: &CommandConfig,
    variables: &Variables,
    process_env: &ProcessEnv,
    cancel: &CancelToken,
) -> Result<CommandOutput> {
    let command = render(&config.command, variables);
    let shell = shell_invocation(config.shell.as_deref())?;
    let working_directory = match &config.chdir {
        Some(dir) => PathBuf::from(render(dir, variables)),
        None => std::env::current_dir().map_err(|e| {
            ReleaseError::Command(format!("failed to get current working directory: {}", e))
        })?,
    };

    let env = merged_env(process_env, config);
    run(&command, &shell, &env, &working_directory, cancel)
}

/// Process environment with the step's entries winning on conflict.
fn merged_env(process_env: &ProcessEnv, config: &CommandConfig) -> ProcessEnv {
    let mut env = process_env.clone();
    for (key, value) in &config.env {
        env.insert(key.clone(), value.clone());
    }
    env
}

/// A reader thread appending one pipe's output to a shared buffer.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

fn drain<R>(stream: Option<R>) -> Option<Capture>
where
    R: Read + Send + 'static,
{
    stream.map(|mut stream| {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let handle = thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match stream.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => match sink.lock() {
                        Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                        Err(poisoned) => poisoned.into_inner().extend_from_slice(&chunk[..n]),
                    },
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    // A read error ends the capture; whatever arrived so far is kept.
                    Err(_) => break,
                }
            }
        });
        Capture { buf, handle }
    })
}

/// Take what a reader captured, waiting for it to reach EOF until `deadline`.
///
/// A reader still blocked after the deadline (a background process holds the
/// pipe open) is left to finish on its own.
fn collect(capture: Option<Capture>, deadline: Instant) -> Vec<u8> {
    let Some(Capture { buf, handle }) = capture else {
        return Vec::new();
    };

    while !handle.is_finished() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    if handle.is_finished() {
        let _ = handle.join();
    } else {
        tracing::debug!("output pipe still open after the shell exited; not waiting further");
    }

    match buf.lock() {
        Ok(mut buf) => std::mem::take(&mut *buf),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    }
}

/// Kill the child and, on Unix, every process in its process group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Ok(pgid) = i32::try_from(child.id()) {
            if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                tracing::debug!(error = %e, "failed to signal process group");
            }
        }
    }
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
}

/// Wait for the child, killing it if the run is cancelled meanwhile.
///
/// Returns (status, killed).
fn wait_or_kill(child: &mut Child, cancel: &CancelToken) -> Result<(ExitStatus, bool)> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((status, false)),
            Ok(None) => {
                if cancel.is_cancelled() {
                    kill_tree(child);
                    let status = child.wait().map_err(|e| {
                        ReleaseError::Command(format!("failed to reap killed process: {}", e))
                    })?;
                    return Ok((status, true));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(ReleaseError::Command(format!(
                    "failed to check process status: {}",
                    e
                )));
            }
        }
    }
}
