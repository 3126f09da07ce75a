use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use shared::TimelineOptions;
use std::path::Path;
use timeline_sync::{DEFAULT_WINDOW_EXPAND_FACTOR, MS_PER_HOUR, TimelineConfig};

pub const DEFAULT_CONFIG_PATH: &str = "timeline.toml";

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub timeline: TimelineSection,
    #[serde(default)]
    pub demo: DemoSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// How long a disconnected session stays available for reconnects.
    pub session_idle_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9330,
            session_idle_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimelineSection {
    pub window_expand_factor: f64,
    pub default_window_hours: u32,
    /// 0 disables the periodic `setCurrentTime` push.
    pub current_time_interval_secs: u64,
    /// Passed to the client verbatim, so keys use the client's camelCase names.
    pub options: TimelineOptions,
}

impl Default for TimelineSection {
    fn default() -> Self {
        Self {
            window_expand_factor: DEFAULT_WINDOW_EXPAND_FACTOR,
            default_window_hours: 8,
            current_time_interval_secs: 0,
            options: TimelineOptions::default(),
        }
    }
}

impl TimelineSection {
    pub fn timeline_config(&self) -> TimelineConfig {
        TimelineConfig {
            window_expand_factor: self.window_expand_factor,
            default_window_millis: i64::from(self.default_window_hours) * MS_PER_HOUR,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DemoSection {
    pub item_count: usize,
    pub groups: Vec<String>,
    pub programs: Vec<String>,
    pub seed: u64,
}

impl Default for DemoSection {
    fn default() -> Self {
        Self {
            item_count: 50,
            groups: ["S001", "S002", "S003", "S004", "S005", "S006"]
                .map(String::from)
                .to_vec(),
            programs: [
                "All Things Considered",
                "Diane Rehm",
                "Car Talk",
                "Morning Edition",
                "Radiolab",
                "NPR News",
            ]
            .map(String::from)
            .to_vec(),
            seed: 1,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.timeline.default_window_hours > 0,
            "timeline.default_window_hours must be at least 1"
        );
        ensure!(
            self.timeline.window_expand_factor >= 0.0,
            "timeline.window_expand_factor must not be negative, got {}",
            self.timeline.window_expand_factor
        );
        if self.demo.item_count > 0 {
            ensure!(!self.demo.groups.is_empty(), "demo.groups must not be empty");
            ensure!(!self.demo.programs.is_empty(), "demo.programs must not be empty");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<ServerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: ServerConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config.validate()?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<ServerConfig> {
    if !path.exists() {
        log::info!("Config file {} not found, using defaults", path.display());
        return Ok(ServerConfig::default());
    }
    load_config(path)
}
