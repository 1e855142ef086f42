//! Configuration loading
//!
//! Resolution order, highest priority first:
//! 1. Command-line flags (and their environment variables)
//! 2. TOML config file (`--config`, else `<config_dir>/saavn-rs/config.toml`)
//! 3. Compiled defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://saavn.dev/api/";
pub const DEFAULT_QUALITY: &str = "160kbps";

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "saavn-rs")]
#[command(about = "Terminal music player for the JioSaavn catalog")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the catalog API
    #[arg(long, env = "SAAVN_API_URL")]
    pub api_url: Option<String>,

    /// Stream quality to play, e.g. 96kbps, 160kbps, 320kbps
    #[arg(short, long)]
    pub quality: Option<String>,

    /// Initial volume (0-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub volume: Option<u8>,

    /// Song id to start playing right away
    #[arg(long)]
    pub play: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub stream_quality: String,
    pub search_limit: u32,
    pub artist_search_limit: u32,
    pub featured_count: usize,
    pub default_volume: u8,
    pub seek_step_secs: u64,
    pub progress_poll_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            stream_quality: DEFAULT_QUALITY.to_string(),
            search_limit: 30,
            artist_search_limit: 50,
            featured_count: 10,
            default_volume: 100,
            seek_step_secs: 10,
            progress_poll_ms: 50,
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Resolve the configuration for this run
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match cli.config.as_deref() {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_cli(cli);
        config.sanitize();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.api_url {
            self.api_base_url = url.clone();
        }
        if let Some(quality) = &cli.quality {
            self.stream_quality = quality.clone();
        }
        if let Some(volume) = cli.volume {
            self.default_volume = volume;
        }
    }

    fn sanitize(&mut self) {
        self.default_volume = self.default_volume.min(100);
        self.progress_poll_ms = self.progress_poll_ms.max(10);
        self.seek_step_secs = self.seek_step_secs.max(1);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("saavn-rs").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let file = write_config("stream_quality = \"320kbps\"\nsearch_limit = 20\n");
        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.stream_quality, "320kbps");
        assert_eq!(config.search_limit, 20);
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.featured_count, 10);
    }

    #[test]
    fn cli_flags_override_file() {
        let file = write_config("api_base_url = \"http://file/api\"\ndefault_volume = 40\n");
        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            api_url: Some("http://cli/api".to_string()),
            volume: Some(70),
            ..Cli::default()
        };

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.api_base_url, "http://cli/api");
        assert_eq!(config.default_volume, 70);
        assert_eq!(config.stream_quality, DEFAULT_QUALITY);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let file = write_config("default_volume = 150\nprogress_poll_ms = 0\n");
        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..Cli::default()
        };

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.default_volume, 100);
        assert_eq!(config.progress_poll_ms, 10);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Cli::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn volume_flag_is_range_checked() {
        assert!(Cli::try_parse_from(["saavn-rs", "--volume", "101"]).is_err());
        let cli = Cli::try_parse_from(["saavn-rs", "-v", "30", "--quality", "96kbps"]).unwrap();
        assert_eq!(cli.volume, Some(30));
        assert_eq!(cli.quality.as_deref(), Some("96kbps"));
    }
}
