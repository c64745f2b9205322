use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of concurrent transcoder processes.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Hard ceiling on concurrent transcoder processes.
pub const MAX_POOL_SIZE: usize = 15;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub transcoder: TranscoderConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscoderConfig {
    /// Explicit ffmpeg executable; PATH is searched when unset
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Replace existing destination files (passes `-y`)
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

fn default_overwrite() -> bool {
    true
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            overwrite: default_overwrite(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Requested worker pool size, clamped to MAX_POOL_SIZE at run time
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Run the transcoder through the shell instead of as an argument vector
    #[serde(default)]
    pub shell: bool,

    /// Nest the mirror under the base directory's own name
    #[serde(default)]
    pub keep_base_name: bool,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            shell: false,
            keep_base_name: false,
        }
    }
}
