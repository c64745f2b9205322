use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "audio-to-alac")]
#[command(author, version, about = "Mirror a directory tree of audio files into ALAC (.m4a) using ffmpeg")]
pub struct Cli {
    /// Base directory to search in
    #[arg(long = "base", value_name = "BASE DIR", required_unless_present = "check_ffmpeg")]
    pub base: Option<PathBuf>,

    /// Target directory to put converted files in
    #[arg(long = "target", value_name = "TARGET DIR", required_unless_present = "check_ffmpeg")]
    pub target: Option<PathBuf>,

    /// File format (extension) to search for, e.g. flac
    #[arg(long = "format", value_name = "FILE FORMAT", required_unless_present = "check_ffmpeg")]
    pub format: Option<String>,

    /// Enable debug logging
    #[arg(short, long, visible_alias = "debug")]
    pub verbose: bool,

    /// Check that ffmpeg can be invoked, then exit
    #[arg(long)]
    pub check_ffmpeg: bool,

    /// Run ffmpeg through the shell as one quoted command line
    #[arg(long, conflicts_with = "no_shell")]
    pub shell: bool,

    /// Run ffmpeg directly with an argument vector (default)
    #[arg(long)]
    pub no_shell: bool,

    /// Worker pool size (capped at 15)
    #[arg(long, value_name = "POOL SIZE")]
    pub pool_size: Option<usize>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// ffmpeg executable to use instead of the one found in PATH
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Nest the mirrored tree under the base directory's name
    #[arg(long)]
    pub keep_base_name: bool,

    /// Show what would be converted without creating or converting anything
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Shell mode from the flags, falling back to the configured value.
    pub fn shell_mode(&self, configured: bool) -> bool {
        if self.shell {
            true
        } else if self.no_shell {
            false
        } else {
            configured
        }
    }
}
