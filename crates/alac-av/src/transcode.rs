//! ALAC transcode command construction and execution.
//!
//! A [`TranscodeCommand`] describes one `ffmpeg` invocation that reads a
//! source file and writes an ALAC `.m4a` destination. It can be run either as
//! a discrete argument vector or as a single shell-interpreted string, chosen
//! by [`ExecMode`].

use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Codec passed to `-acodec`.
pub const ALAC_CODEC: &str = "alac";

/// Container extension of every converted file (without the dot).
pub const TARGET_EXTENSION: &str = "m4a";

/// Number of trailing stderr lines kept in failure messages.
const STDERR_TAIL_LINES: usize = 5;

/// How the transcoder process is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Spawn the program directly with a discrete argument vector.
    #[default]
    Argv,
    /// Render one quoted command line and hand it to the platform shell.
    Shell,
}

impl ExecMode {
    /// Select the mode from a "use the shell" flag.
    pub fn from_shell_flag(shell: bool) -> Self {
        if shell {
            ExecMode::Shell
        } else {
            ExecMode::Argv
        }
    }
}

impl std::fmt::Display for ExecMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecMode::Argv => write!(f, "argv"),
            ExecMode::Shell => write!(f, "shell"),
        }
    }
}

/// One transcoder invocation: `ffmpeg [-y] -i <source> -acodec alac <dest>`.
///
/// # Example
///
/// ```
/// use alac_av::TranscodeCommand;
///
/// let cmd = TranscodeCommand::new("ffmpeg", "in/My Song.flac", "out/My Song.m4a");
/// assert_eq!(
///     cmd.shell_line(),
///     r#"ffmpeg -y -i "in/My Song.flac" -acodec alac "out/My Song.m4a""#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeCommand {
    program: PathBuf,
    source: PathBuf,
    dest: PathBuf,
    codec: String,
    overwrite: bool,
}

impl TranscodeCommand {
    /// Create an ALAC transcode command with overwrite enabled.
    pub fn new(
        program: impl Into<PathBuf>,
        source: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            source: source.into(),
            dest: dest.into(),
            codec: ALAC_CODEC.to_string(),
            overwrite: true,
        }
    }

    /// Pass `-y` so an existing destination is replaced without a prompt.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// File read by the transcoder.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// File written by the transcoder.
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Arguments following the program name, unquoted.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(6);
        if self.overwrite {
            args.push("-y".into());
        }
        args.push("-i".into());
        args.push(self.source.clone().into_os_string());
        args.push("-acodec".into());
        args.push(self.codec.clone().into());
        args.push(self.dest.clone().into_os_string());
        args
    }

    /// Render the invocation as one shell command line.
    ///
    /// The program, source and destination are double-quoted when needed;
    /// characters the shell would still interpret inside double quotes are
    /// escaped.
    pub fn shell_line(&self) -> String {
        let mut parts = vec![quote_program(&self.program.to_string_lossy())];
        if self.overwrite {
            parts.push("-y".to_string());
        }
        parts.push("-i".to_string());
        parts.push(quote(&self.source.to_string_lossy()));
        parts.push("-acodec".to_string());
        parts.push(self.codec.clone());
        parts.push(quote(&self.dest.to_string_lossy()));
        parts.join(" ")
    }

    /// Build the [`Command`] for the given mode, with stdin closed and output
    /// captured.
    pub fn to_command(&self, mode: ExecMode) -> Command {
        let mut cmd = match mode {
            ExecMode::Argv => {
                let mut cmd = Command::new(&self.program);
                cmd.args(self.args());
                cmd
            }
            ExecMode::Shell => shell_command(&self.shell_line()),
        };
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Run the transcoder and wait for it to exit.
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] if the source file does not exist.
    /// - [`Error::ToolFailed`] if the process cannot be spawned or exits with
    ///   a non-zero status (message includes the tail of stderr).
    pub fn run(&self, mode: ExecMode) -> Result<Output> {
        if !self.source.exists() {
            return Err(Error::file_not_found(&self.source));
        }

        let tool = self.tool_name();

        #[cfg(feature = "tracing")]
        tracing::debug!(mode = %mode, "running {}", self.display_line(mode));

        let output = self
            .to_command(mode)
            .output()
            .map_err(|e| Error::tool_failed(&tool, format!("failed to spawn: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool_failed(
                tool,
                format!("exited with {}: {}", output.status, stderr_tail(&stderr)),
            ));
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            "{} stderr: {}",
            self.source.display(),
            String::from_utf8_lossy(&output.stderr)
        );

        Ok(output)
    }

    /// Human-readable form of the invocation for logs.
    pub fn display_line(&self, mode: ExecMode) -> String {
        match mode {
            ExecMode::Shell => self.shell_line(),
            ExecMode::Argv => {
                let mut line = self.program.display().to_string();
                for arg in self.args() {
                    line.push(' ');
                    line.push_str(&arg.to_string_lossy());
                }
                line
            }
        }
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }
}

/// Wrap a command line in the platform shell.
pub(crate) fn shell_command(line: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(line);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(line);
        cmd
    }
}

/// Double-quote a path for the shell.
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if cfg!(not(windows)) && matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Bare program names stay unquoted so the line reads like a typed command.
pub(crate) fn quote_program(s: &str) -> String {
    let plain = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+'));
    if plain {
        s.to_string()
    } else {
        quote(s)
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return "no output on stderr".to_string();
    }
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}
