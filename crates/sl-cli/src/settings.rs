use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sl_core::{EventRecord, SyncConfig};

/// Added to the length tolerance when a data set carries any reaction or
/// privileged-type event.
pub const ADAPTIVE_LENGTH_BONUS: f64 = 0.6;

/// Resolve the config file: explicit flag first, then `SL_CONFIG`.
fn config_path(flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| std::env::var_os("SL_CONFIG").map(PathBuf::from))
}

/// Load and validate the analysis config. No file means defaults.
pub fn load_config(flag: Option<&Path>) -> Result<SyncConfig> {
    let Some(path) = config_path(flag) else {
        return Ok(SyncConfig::default());
    };
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: SyncConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Widen the length tolerance for data sets with resonant events, which
/// quantize to heavier payload edges.
pub fn adaptive_config(base: &SyncConfig, records: &[EventRecord]) -> SyncConfig {
    let resonant = records.iter().any(|r| {
        r.has_reactions() || r.kind.as_deref().is_some_and(|k| base.bias.is_privileged(k))
    });
    let mut config = base.clone();
    if resonant {
        config.classifier.length_tolerance += ADAPTIVE_LENGTH_BONUS;
    }
    config
}

pub fn render_defaults() -> Result<String> {
    toml::to_string_pretty(&SyncConfig::default()).context("failed to serialize default config")
}
