//! Running external tools with streamed output and a timeout

use crate::error::{StepError, StepResult};
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Default limit for project init and `npm install`
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(600);

/// An external command, run inside an explicit directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
        }
    }

    /// npm launchers are `.cmd` scripts on Windows
    pub fn npm(program: &str) -> Self {
        if cfg!(windows) {
            Self::new(format!("{}.cmd", program))
        } else {
            Self::new(program)
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

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Environment variable for the child only; values never show in
    /// [`ToolCommand::display`]
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

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Command line for display
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.contains(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion, streaming output. The child is killed when `limit`
    /// elapses.
    pub async fn run(&self, limit: Duration) -> StepResult<()> {
        println!("{} {}", "Running:".dimmed(), self.display().yellow());
        tracing::info!(command = %self.display(), cwd = ?self.cwd, "spawning tool");

        let mut command = TokioCommand::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = timeout(limit, async {
            stream_output(stdout, stderr).await;
            child.wait().await
        })
        .await;

        match finished {
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => Err(StepError::ToolFailed {
                tool: self.program.clone(),
                code: status.code(),
            }),
            Ok(Err(e)) => Err(StepError::Unexpected(
                anyhow::Error::new(e).context(format!("Failed to wait for {}", self.program)),
            )),
            Err(_) => {
                let _ = child.kill().await;
                tracing::warn!(command = %self.display(), secs = limit.as_secs(), "tool timed out");
                Err(StepError::ToolTimeout {
                    tool: self.program.clone(),
                    timeout: limit,
                })
            }
        }
    }

    fn spawn_error(&self, err: io::Error) -> StepError {
        if err.kind() == io::ErrorKind::NotFound {
            StepError::ToolMissing {
                tool: self.program.clone(),
                hint: super::install_hint(self.program.trim_end_matches(".cmd")).to_string(),
            }
        } else {
            StepError::Unexpected(
                anyhow::Error::new(err).context(format!("Failed to start {}", self.program)),
            )
        }
    }
}

/// Echo both pipes line by line until they close
async fn stream_output<O, E>(stdout: Option<O>, stderr: Option<E>)
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_lines = stdout.map(|s| BufReader::new(s).lines());
    let mut err_lines = stderr.map(|s| BufReader::new(s).lines());

    loop {
        tokio::select! {
            line = async { out_lines.as_mut()?.next_line().await.ok().flatten() }, if out_lines.is_some() => {
                match line {
                    Some(line) => println!("  {}", line),
                    None => out_lines = None,
                }
            }
            line = async { err_lines.as_mut()?.next_line().await.ok().flatten() }, if err_lines.is_some() => {
                match line {
                    Some(line) => eprintln!("  {}", line.yellow()),
                    None => err_lines = None,
                }
            }
            else => break,
        }
    }
}

/// Open a documentation page in the default browser
pub fn open_docs(url: &str) -> anyhow::Result<()> {
    println!("{}", format!("Opening {} in your browser...", url).cyan());
    open::that(url)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_spaces() {
        let cmd = ToolCommand::new("keytool")
            .args(["-dname", "CN=My App, C=US"])
            .env("STOREPASS", "secret");
        assert_eq!(cmd.display(), "keytool -dname \"CN=My App, C=US\"");
        assert!(!cmd.display().contains("secret"));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = ToolCommand::new("rnshell-no-such-tool")
            .run(Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, StepError::ToolMissing { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_is_reported() {
        let err = ToolCommand::new("sh")
            .args(["-c", "echo out; echo err >&2; exit 3"])
            .run(Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, StepError::ToolFailed { code: Some(3), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_child() {
        let err = ToolCommand::new("sleep")
            .arg("5")
            .run(Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, StepError::ToolTimeout { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_directory_with_env() {
        let dir = tempfile::TempDir::new().unwrap();
        ToolCommand::new("sh")
            .args(["-c", "printf %s \"$GREETING\" > out.txt"])
            .env("GREETING", "hello")
            .current_dir(dir.path())
            .run(Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("out.txt")).unwrap(), "hello");
    }
}
