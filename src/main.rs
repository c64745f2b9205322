mod cli;

use audio_to_alac::{
    config,
    mirror::{DispatchOptions, Dispatcher, PoolConfig},
    scanner,
};

use alac_av::ExecMode;
use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "audio_to_alac=debug,alac_av=debug".to_string()
        } else {
            "audio_to_alac=info,alac_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_target(false)
        .init();

    let config = config::load_config_or_default(cli.config.as_deref())?;
    let mode = ExecMode::from_shell_flag(cli.shell_mode(config.dispatch.shell));
    let ffmpeg = match cli.ffmpeg.clone() {
        Some(path) => path,
        None => resolve_ffmpeg(config.transcoder.ffmpeg_path.as_deref()),
    };

    if cli.check_ffmpeg {
        check_ffmpeg(&ffmpeg, mode);
        return Ok(());
    }

    let (Some(base), Some(target), Some(format)) = (cli.base, cli.target, cli.format) else {
        anyhow::bail!("--base, --target and --format are required");
    };
    let extension = format.trim_start_matches('.').to_string();

    let pool_size = cli.pool_size.unwrap_or(config.dispatch.pool_size);
    tracing::debug!("Running with pool size {} in {} mode", pool_size, mode);

    let records = scanner::scan_tree(&base, &extension)?;

    let dispatcher = Dispatcher::new(DispatchOptions {
        source_base: base,
        target_root: target,
        extension,
        ffmpeg,
        pool: PoolConfig {
            size: pool_size,
            mode,
        },
        overwrite: config.transcoder.overwrite,
        keep_base_name: cli.keep_base_name || config.dispatch.keep_base_name,
        dry_run: cli.dry_run,
    })?;

    dispatcher.run(&records)?;

    Ok(())
}

/// Configured path if it exists, else PATH lookup, else the bare name so that
/// each job reports the spawn failure itself.
fn resolve_ffmpeg(configured: Option<&Path>) -> PathBuf {
    match alac_av::get_tool_path("ffmpeg", configured) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("{}; conversions will likely fail", e);
            configured
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("ffmpeg"))
        }
    }
}

fn check_ffmpeg(program: &Path, mode: ExecMode) {
    let info = alac_av::check_ffmpeg(program, mode);

    if info.available {
        print!("✓ {}", info.name);
        if let Some(ref version) = info.version {
            print!(" ({})", version);
        }
        if let Some(ref path) = info.path {
            print!(" - {}", path.display());
        }
        println!();
    } else {
        println!("✗ {}", info.name);
        println!("Error running ffmpeg. Install it or pass --ffmpeg <PATH>.");
    }
}
