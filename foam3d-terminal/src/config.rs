//! Viewer configuration loaded from TOML

use std::path::Path;

use foam3d_core::{ProjectionMode, Vec3};
use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// A value parsed but cannot be used
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    Perspective,
    Orthographic,
}

impl From<Projection> for ProjectionMode {
    fn from(p: Projection) -> Self {
        match p {
            Projection::Perspective => ProjectionMode::Perspective,
            Projection::Orthographic => ProjectionMode::Orthographic,
        }
    }
}

/// Tube swept along a polyline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub points: Vec<[f32; 3]>,
    pub segments: usize,
    pub radius: f32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            points: vec![
                [-2.0, 0.0, 0.0],
                [-1.0, 0.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
            ],
            segments: 16,
            radius: 0.25,
        }
    }
}

impl LineConfig {
    pub fn points(&self) -> Vec<Vec3> {
        self.points.iter().copied().map(Vec3::from).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub size: f32,
    pub step: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { size: 8.0, step: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub target_fps: u32,
    /// Initial orbit radius
    pub zoom: f32,
    /// Idle orbit speed in radians per second
    pub orbit_speed: f32,
    pub projection: Projection,
    pub axes_length: f32,
    pub light_position: [f32; 3],
    pub line: LineConfig,
    pub grid: GridConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            zoom: 3.0,
            orbit_speed: 0.25,
            projection: Projection::Perspective,
            axes_length: 4.0,
            light_position: [1.0, 1.0, 1.0],
            line: LineConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        log::info!("loaded viewer config from {}", path.display());
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        if self.target_fps == 0 {
            return invalid("target_fps", "must be at least 1");
        }
        if !(self.zoom > 0.0) {
            return invalid("zoom", "must be positive");
        }
        if self.line.segments < 3 {
            return invalid("line.segments", "a tube needs at least 3 sides");
        }
        if !(self.line.radius >= 0.0) {
            return invalid("line.radius", "must not be negative");
        }
        if !(self.grid.size > 0.0 && self.grid.size.is_finite()) {
            return invalid("grid.size", "must be positive");
        }
        if !(self.grid.step > 0.0) {
            return invalid("grid.step", "must be positive");
        }
        Ok(())
    }

    pub fn light_position(&self) -> Vec3 {
        self.light_position.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ViewerConfig::from_toml("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.line.points().len(), 5);
    }

    #[test]
    fn test_partial_sections_fall_back() {
        let config = ViewerConfig::from_toml(
            r#"
            target_fps = 60
            projection = "orthographic"

            [line]
            radius = 0.5

            [grid]
            size = 4.0
            "#,
        )
        .unwrap();
        assert_eq!(config.target_fps, 60);
        assert_eq!(ProjectionMode::from(config.projection), ProjectionMode::Orthographic);
        assert_eq!(config.line.radius, 0.5);
        assert_eq!(config.line.segments, 16);
        assert_eq!(config.grid.size, 4.0);
        assert_eq!(config.grid.step, 1.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = ViewerConfig::from_toml("target_fps = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "target_fps", .. }));

        let err = ViewerConfig::from_toml("[line]\nsegments = 2").unwrap_err();
        assert!(err.to_string().contains("line.segments"));

        for size in ["0.0", "-8.0"] {
            let err = ViewerConfig::from_toml(&format!("[grid]\nsize = {}", size)).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "grid.size", .. }));
        }

        assert!(matches!(
            ViewerConfig::from_toml("zoom = \"far\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("foam3d-config-{}.toml", std::process::id()));
        let mut config = ViewerConfig::default();
        config.orbit_speed = 1.5;
        config.save_to_file(&path).unwrap();
        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.orbit_speed, 1.5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ViewerConfig::load_from_file("/nonexistent/foam3d.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
