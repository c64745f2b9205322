//! # alac-av
//!
//! External tool layer for converting audio files to ALAC with ffmpeg.
//!
//! This crate provides functionality for:
//! - Detecting ffmpeg (or any other CLI tool) and reading its version
//! - Building `ffmpeg -i <src> -acodec alac <dest>` invocations
//! - Running them either as an argument vector or through the shell
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use alac_av::{ExecMode, TranscodeCommand};
//!
//! let cmd = TranscodeCommand::new("ffmpeg", "in/track.flac", "out/track.m4a");
//! cmd.run(ExecMode::Argv)?;
//! # Ok::<(), alac_av::Error>(())
//! ```

mod error;
pub mod tools;
pub mod transcode;

// Re-exports
pub use error::{Error, Result};
pub use tools::{check_ffmpeg, get_tool_path, require_tool, ToolInfo};
pub use transcode::{ExecMode, TranscodeCommand, ALAC_CODEC, TARGET_EXTENSION};
