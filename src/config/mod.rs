mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./casmclips.toml", "~/.config/casmclips/config.toml"];

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

fn expand_paths(config: &mut Config) {
    config.settings.output_dir = expand(&config.settings.output_dir);
    config.worker.script = expand(&config.worker.script);
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let settings = &config.settings;

    if settings.clips_per_video == 0 {
        anyhow::bail!("clipsPerVideo must be at least 1");
    }

    if settings.min_clip_seconds >= settings.max_clip_seconds {
        anyhow::bail!(
            "minClipSeconds ({}) must be less than maxClipSeconds ({})",
            settings.min_clip_seconds,
            settings.max_clip_seconds
        );
    }

    if config.worker.program.as_os_str().is_empty() {
        anyhow::bail!("Worker program cannot be empty");
    }

    if !config.worker.script.exists() {
        tracing::warn!("Worker script does not exist: {:?}", config.worker.script);
    }

    Ok(())
}
