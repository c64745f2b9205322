mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./audio-to-alac.toml", "~/.config/audio-to-alac/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.dispatch.pool_size == 0 {
        anyhow::bail!("dispatch.pool_size cannot be 0");
    }

    if config.dispatch.pool_size > MAX_POOL_SIZE {
        tracing::warn!(
            "dispatch.pool_size {} exceeds the maximum, {} will be used",
            config.dispatch.pool_size,
            MAX_POOL_SIZE
        );
    }

    if let Some(ref ffmpeg) = config.transcoder.ffmpeg_path {
        if !ffmpeg.exists() {
            tracing::warn!("Configured ffmpeg path does not exist: {:?}", ffmpeg);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.dispatch.pool_size, DEFAULT_POOL_SIZE);
        assert!(!config.dispatch.shell);
        assert!(!config.dispatch.keep_base_name);
        assert!(config.transcoder.overwrite);
        assert!(config.transcoder.ffmpeg_path.is_none());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[dispatch]
pool_size = 8
shell = true
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.dispatch.pool_size, 8);
        assert!(config.dispatch.shell);
        assert!(!config.dispatch.keep_base_name);
        assert!(config.transcoder.overwrite);
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dispatch]\npool_size = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("pool_size"));
    }

    #[test]
    fn test_oversized_pool_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dispatch]\npool_size = 50\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.dispatch.pool_size, 50);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[dispatch\npool_size = ").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }

    #[test]
    fn test_missing_custom_path_is_error() {
        let result = load_config_or_default(Some(Path::new("/nonexistent/audio-to-alac.toml")));
        assert!(result.is_err());
    }
}
