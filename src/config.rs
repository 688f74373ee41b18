use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::recognizer::RecognizerConfig;

/// Tunables for the QuickShape controller.
///
/// The hold duration and the move/resize threshold were picked by feel; they
/// are exposed here rather than baked in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to their defaults
pub struct QuickShapeConfig {
    /// Pause, in seconds, after which the active stroke is recognized
    pub hold_duration_secs: f64,
    /// Drags shorter than this move the shape; longer drags resize it
    pub move_resize_threshold: f32,
    /// New samples needed before checking whether the stroke is still growing
    pub growth_point_step: usize,
    /// Path length added since the last check that counts as active drawing
    pub growth_min_length: f32,
    /// Strokes with fewer samples are not handed to the recognizer
    pub min_recognition_points: usize,
    pub recognizer: RecognizerConfig,
}

impl Default for QuickShapeConfig {
    fn default() -> Self {
        Self {
            hold_duration_secs: 0.5,
            move_resize_threshold: 30.0,
            growth_point_step: 15,
            growth_min_length: 10.0,
            min_recognition_points: 10,
            recognizer: RecognizerConfig::default(),
        }
    }
}

impl QuickShapeConfig {
    /// Parse a JSON config, filling unspecified fields with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hold_duration_secs.is_finite() && self.hold_duration_secs > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "hold_duration_secs",
                reason: format!("must be a positive number of seconds, got {}", self.hold_duration_secs),
            });
        }
        if !(self.move_resize_threshold.is_finite() && self.move_resize_threshold >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "move_resize_threshold",
                reason: format!("must be non-negative, got {}", self.move_resize_threshold),
            });
        }
        if self.growth_point_step == 0 {
            return Err(ConfigError::InvalidValue {
                field: "growth_point_step",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.recognizer.resample_count < 8 {
            return Err(ConfigError::InvalidValue {
                field: "recognizer.resample_count",
                reason: format!("must be at least 8, got {}", self.recognizer.resample_count),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QuickShapeConfig::default();
        assert_eq!(config.hold_duration_secs, 0.5);
        assert_eq!(config.move_resize_threshold, 30.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = QuickShapeConfig::from_json(r#"{ "move_resize_threshold": 42.0 }"#).unwrap();
        assert_eq!(config.move_resize_threshold, 42.0);
        assert_eq!(config.hold_duration_secs, 0.5);
        assert_eq!(config.recognizer, RecognizerConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = QuickShapeConfig::from_json(r#"{ "hold_duration_secs": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "hold_duration_secs", .. }));

        let err = QuickShapeConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = QuickShapeConfig::default();
        config.recognizer.line_tolerance = 0.1;
        let json = config.to_json().unwrap();
        assert_eq!(QuickShapeConfig::from_json(&json).unwrap(), config);
    }
}
