//! Optional TOML configuration for the command-line adapter.

use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use endless_defence_session::{DEFAULT_AUTOSAVE_INTERVAL, DEFAULT_RNG_SEED};
use serde::Deserialize;

pub(crate) const DEFAULT_FRAME_RATE: u32 = 60;

/// Settings read from disk; every key is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) seed: Option<u64>,
    pub(crate) autosave_interval_secs: Option<f64>,
    pub(crate) save_path: Option<PathBuf>,
    pub(crate) frame_rate: Option<u32>,
}

impl FileConfig {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if let Some(secs) = config.autosave_interval_secs {
            let _ = Duration::try_from_secs_f64(secs).with_context(|| {
                format!("autosave_interval_secs = {secs} is not a usable duration")
            })?;
        }
        ensure!(config.frame_rate != Some(0), "frame_rate must be positive");
        Ok(config)
    }

    pub(crate) fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_RNG_SEED)
    }

    pub(crate) fn autosave_interval(&self) -> Duration {
        self.autosave_interval_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(DEFAULT_AUTOSAVE_INTERVAL)
    }

    pub(crate) fn frame_rate(&self) -> u32 {
        self.frame_rate.unwrap_or(DEFAULT_FRAME_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = FileConfig::parse("").expect("parse");
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.seed(), DEFAULT_RNG_SEED);
        assert_eq!(config.autosave_interval(), Duration::from_secs(5));
        assert_eq!(config.frame_rate(), 60);
    }

    #[test]
    fn keys_override_defaults() {
        let config = FileConfig::parse(
            "seed = 9\nautosave_interval_secs = 2.5\nsave_path = \"roster.json\"\nframe_rate = 30\n",
        )
        .expect("parse");
        assert_eq!(config.seed(), 9);
        assert_eq!(config.autosave_interval(), Duration::from_millis(2_500));
        assert_eq!(config.save_path, Some(PathBuf::from("roster.json")));
        assert_eq!(config.frame_rate(), 30);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(FileConfig::parse("frame_rate = 0").is_err());
        assert!(FileConfig::parse("autosave_interval_secs = -1.0").is_err());
        assert!(FileConfig::parse("autosave_interval_secs = 1e30").is_err());
        assert!(FileConfig::parse("autosave_interval_secs = nan").is_err());
        assert!(FileConfig::parse("speed = 4").is_err());
    }
}
