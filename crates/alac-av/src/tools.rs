//! External tool detection.

use crate::transcode::{quote_program, shell_command, ExecMode};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Exit status POSIX shells use for "command not found".
const SHELL_NOT_FOUND: i32 = 127;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool could be invoked.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

impl ToolInfo {
    fn unavailable(name: &str) -> Self {
        ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        }
    }
}

/// Probe ffmpeg availability the way conversions will invoke it.
///
/// The tool counts as available as long as it can be launched; a non-zero
/// exit from ffmpeg itself does not matter here. In shell mode the shell
/// always launches, so its "command not found" status is checked instead.
///
/// # Example
///
/// ```no_run
/// use alac_av::{check_ffmpeg, ExecMode};
/// use std::path::Path;
///
/// let info = check_ffmpeg(Path::new("ffmpeg"), ExecMode::Argv);
/// if info.available {
///     println!("ffmpeg version: {:?}", info.version);
/// }
/// ```
pub fn check_ffmpeg(program: &Path, mode: ExecMode) -> ToolInfo {
    check_tool_with_arg(program, "-version", mode)
}

/// Check if a tool is available using a custom version argument.
fn check_tool_with_arg(program: &Path, version_arg: &str, mode: ExecMode) -> ToolInfo {
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string());

    let mut cmd = match mode {
        ExecMode::Argv => {
            let mut cmd = Command::new(program);
            cmd.arg(version_arg);
            cmd
        }
        ExecMode::Shell => {
            let line = format!(
                "{} {}",
                quote_program(&program.to_string_lossy()),
                version_arg
            );
            shell_command(&line)
        }
    };
    cmd.stdin(Stdio::null());

    let output = match cmd.output() {
        Ok(output) => output,
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("failed to invoke {}: {}", program.display(), _e);
            return ToolInfo::unavailable(&name);
        }
    };

    if mode == ExecMode::Shell && output.status.code() == Some(SHELL_NOT_FOUND) {
        return ToolInfo::unavailable(&name);
    }

    let version = if output.status.success() {
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|s| s.to_string())
    } else {
        None
    };

    let path = if program.components().count() > 1 {
        Some(program.to_path_buf())
    } else {
        which::which(program).ok()
    };

    ToolInfo {
        name,
        available: true,
        version,
        path,
    }
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        #[cfg(feature = "tracing")]
        tracing::warn!(
            "configured {} path {} does not exist, searching PATH",
            name,
            path.display()
        );
    }

    require_tool(name)
}
