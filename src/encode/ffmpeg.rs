use crate::foundation::error::{SeewavError, SeewavResult};
use crate::session::control::RunControl;
use std::io::{Read, Write as _};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(15);

/// Pipeline stage a subprocess failure is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    Decode,
    Encode,
}

impl Stage {
    pub(crate) fn err(self, msg: impl Into<String>) -> SeewavError {
        match self {
            Self::Decode => SeewavError::decode(msg),
            Self::Encode => SeewavError::encode(msg),
        }
    }
}

/// Base `ffmpeg` invocation with quiet logging and overwrite enabled.
pub(crate) fn ffmpeg_command() -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-loglevel", "error", "-y"]);
    cmd
}

/// A running `ffmpeg` child with drained output pipes.
///
/// Dropping an unfinished process kills it, so every exit path of a run releases the child.
pub(crate) struct FfmpegProcess {
    stage: Stage,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl FfmpegProcess {
    /// Spawn `cmd`, optionally with a writable stdin and a captured stdout.
    pub(crate) fn spawn(
        mut cmd: Command,
        stage: Stage,
        pipe_stdin: bool,
        capture_stdout: bool,
    ) -> SeewavResult<Self> {
        cmd.stdin(if pipe_stdin {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(if capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stderr(Stdio::piped());
        tracing::debug!(?stage, command = ?cmd, "spawning ffmpeg");

        let mut child = cmd.spawn().map_err(|e| {
            stage.err(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child.stdin.take();
        let stdout_drain = child.stdout.take().map(drain);
        let stderr_drain = child.stderr.take().map(drain);

        Ok(Self {
            stage,
            child: Some(child),
            stdin,
            stdout_drain,
            stderr_drain,
        })
    }

    /// Feed bytes to the child's stdin.
    ///
    /// When the child stopped reading, its exit status and stderr become the error.
    pub(crate) fn write_stdin(&mut self, bytes: &[u8], ctl: &RunControl) -> SeewavResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(self.stage.err("ffmpeg stdin is not open"));
        };
        let written = stdin.write_all(bytes);
        if let Err(write_err) = written {
            let msg = match self.wait(ctl) {
                Ok((status, stderr)) if !status.success() => {
                    format!("ffmpeg exited with status {status}: {}", stderr.trim())
                }
                Ok(_) => format!("ffmpeg stopped reading its input: {write_err}"),
                Err(e) => return Err(e),
            };
            return Err(self.stage.err(msg));
        }
        Ok(())
    }

    /// Close stdin, wait for the child and return its captured stdout.
    pub(crate) fn finish(mut self, ctl: &RunControl) -> SeewavResult<Vec<u8>> {
        let (status, stderr) = self.wait(ctl)?;
        if !status.success() {
            return Err(self.stage.err(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        match self.stdout_drain.take() {
            Some(handle) => join_drain(handle, self.stage),
            None => Ok(Vec::new()),
        }
    }

    fn wait(&mut self, ctl: &RunControl) -> SeewavResult<(ExitStatus, String)> {
        drop(self.stdin.take());
        let status = loop {
            if ctl.is_cancelled() {
                self.kill();
                return Err(SeewavError::Cancelled);
            }
            let polled = match self.child.as_mut() {
                Some(child) => child.try_wait(),
                None => return Err(self.stage.err("ffmpeg process already finished")),
            };
            match polled {
                Ok(Some(status)) => break status,
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    return Err(self
                        .stage
                        .err(format!("failed to wait for ffmpeg to finish: {e}")));
                }
            }
        };
        self.child = None;

        let stderr = match self.stderr_drain.take() {
            Some(handle) => join_drain(handle, self.stage)?,
            None => Vec::new(),
        };
        Ok((status, String::from_utf8_lossy(&stderr).into_owned()))
    }

    fn kill(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!(stage = ?self.stage, "ffmpeg killed");
        }
    }
}

impl Drop for FfmpegProcess {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Run `cmd` to completion without stdin and return its stdout.
pub(crate) fn run_ffmpeg(
    cmd: Command,
    stage: Stage,
    capture_stdout: bool,
    ctl: &RunControl,
) -> SeewavResult<Vec<u8>> {
    FfmpegProcess::spawn(cmd, stage, false, capture_stdout)?.finish(ctl)
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(
    handle: JoinHandle<std::io::Result<Vec<u8>>>,
    stage: Stage,
) -> SeewavResult<Vec<u8>> {
    handle
        .join()
        .map_err(|_| stage.err("ffmpeg output drain thread panicked"))?
        .map_err(|e| stage.err(format!("ffmpeg output read failed: {e}")))
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Format seconds for ffmpeg time arguments.
pub(crate) fn secs_arg(secs: f64) -> String {
    format!("{secs:.6}")
}
