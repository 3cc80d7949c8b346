//! Configuration management for campus-paths

use crate::error::{PathError, Result};
use crate::parser::WireFormat;
use crate::projection::{LatLon, Projection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pathfinder server
    pub api: ApiConfig,
    /// Map projection and viewport
    pub map: MapConfig,
    /// TUI configuration
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Body format the server speaks
    pub wire_format: WireFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Campus coordinate transform
    #[serde(flatten)]
    pub projection: Projection,
    /// Viewport center when no route is shown
    pub center_lat: f64,
    pub center_lon: f64,
    /// Viewport half-width in degrees
    pub span_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Canvas marker: braille, dot, block
    pub marker: String,
    /// Print coordinate labels next to the route markers
    pub show_labels: bool,
    /// Event poll interval in milliseconds
    pub tick_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4567".to_string(),
            timeout_secs: 10,
            wire_format: WireFormat::default(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            center_lat: 47.65440627742146,
            center_lon: -122.30427826347734,
            span_deg: 0.012,
        }
    }
}

impl MapConfig {
    pub fn center(&self) -> LatLon {
        LatLon {
            lat: self.center_lat,
            lon: self.center_lon,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            marker: "braille".to_string(),
            show_labels: true,
            tick_ms: 100,
        }
    }
}

impl Config {
    /// Get default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("campus-paths")
            .join("config.toml")
    }

    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);

        let config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PathError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(PathError::Config(format!(
                "api.base_url must be an http(s) URL, got {:?}",
                self.api.base_url
            )));
        }
        if self.map.span_deg <= 0.0 {
            return Err(PathError::Config("map.span_deg must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:4567");
        assert_eq!(config.api.wire_format, WireFormat::Json);
        assert_eq!(config.map.projection, Projection::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            wire_format = "legacy"

            [map]
            lat_scale = -0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.api.wire_format, WireFormat::Legacy);
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.map.projection.lat_scale, -0.5);
        assert_eq!(config.map.projection.lon_scale, Projection::default().lon_scale);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.base_url = "http://campus.example:8080".to_string();
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.api.base_url, "http://campus.example:8080");
        assert_eq!(loaded.map.projection, config.map.projection);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"localhost:4567\"\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(PathError::Config(_))));
    }
}
