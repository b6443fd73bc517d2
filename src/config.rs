//! Tunables for the identity association engine.
//!
//! Values are validated once, when a [`ReidConfig`] is loaded or handed to
//! [`crate::ReidTracker::new`]. Per-frame processing assumes a valid config.

use crate::error::TrackError;
use crate::object::ObjectClass;
use serde::{Deserialize, Serialize};
use std::path::Path;

const WEIGHT_SUM_TOLERANCE: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReidConfig {
    /// Minimum re-identification score a lost identity must exceed.
    pub reid_threshold: f32,
    /// Maximum center distance for continuing an active identity.
    pub spatial_match_distance: f32,
    /// Distance at which position similarity drops to zero.
    pub reid_position_radius: f32,
    /// Frames a lost identity survives before it is forgotten.
    pub max_lost_frames: usize,
    pub appearance_weight: f32,
    pub position_weight: f32,
    /// Class ids that are passed through without identity tracking.
    pub ignored_classes: Vec<usize>,
}

impl Default for ReidConfig {
    fn default() -> Self {
        Self {
            reid_threshold: 0.7,
            spatial_match_distance: 30.0,
            reid_position_radius: 100.0,
            max_lost_frames: 60,
            appearance_weight: 0.7,
            position_weight: 0.3,
            ignored_classes: vec![0],
        }
    }
}

impl ReidConfig {
    pub fn with_reid_threshold(self, reid_threshold: f32) -> Self {
        Self {
            reid_threshold,
            ..self
        }
    }

    pub fn with_spatial_match_distance(self, spatial_match_distance: f32) -> Self {
        Self {
            spatial_match_distance,
            ..self
        }
    }

    pub fn with_reid_position_radius(self, reid_position_radius: f32) -> Self {
        Self {
            reid_position_radius,
            ..self
        }
    }

    pub fn with_max_lost_frames(self, max_lost_frames: usize) -> Self {
        Self {
            max_lost_frames,
            ..self
        }
    }

    /// Set the appearance/position weights of the re-identification score.
    ///
    /// # Arguments
    /// * `appearance_weight` - Weight for cosine similarity (default: 0.7)
    /// * `position_weight` - Weight for position similarity (default: 0.3)
    pub fn with_weights(self, appearance_weight: f32, position_weight: f32) -> Self {
        Self {
            appearance_weight,
            position_weight,
            ..self
        }
    }

    pub fn with_ignored_classes(self, ignored_classes: Vec<usize>) -> Self {
        Self {
            ignored_classes,
            ..self
        }
    }

    /// Whether detections of this class take part in identity tracking.
    pub fn is_tracked(&self, class: ObjectClass) -> bool {
        match class {
            ObjectClass::Classified(id) => !self.ignored_classes.contains(&id),
            ObjectClass::Unclassified => true,
        }
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        non_negative("reid_threshold", self.reid_threshold)?;
        non_negative("spatial_match_distance", self.spatial_match_distance)?;
        non_negative("appearance_weight", self.appearance_weight)?;
        non_negative("position_weight", self.position_weight)?;

        if !(self.reid_position_radius.is_finite() && self.reid_position_radius > 0.0) {
            return Err(TrackError::InvalidConfig(format!(
                "reid_position_radius must be positive, got {}",
                self.reid_position_radius
            )));
        }

        let sum = self.appearance_weight + self.position_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(TrackError::InvalidConfig(format!(
                "appearance_weight + position_weight must be 1, got {}",
                sum
            )));
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, TrackError> {
        let config: ReidConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TrackError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), TrackError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TrackError::InvalidConfig(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ReidConfig::default();

        assert!((config.reid_threshold - 0.7).abs() < 1e-6);
        assert!((config.spatial_match_distance - 30.0).abs() < 1e-6);
        assert!((config.reid_position_radius - 100.0).abs() < 1e-6);
        assert_eq!(config.max_lost_frames, 60);
        assert!((config.appearance_weight - 0.7).abs() < 1e-6);
        assert!((config.position_weight - 0.3).abs() < 1e-6);
        assert_eq!(config.ignored_classes, vec![0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders_preserve_other_settings() {
        let config = ReidConfig::default()
            .with_reid_threshold(0.8)
            .with_max_lost_frames(10)
            .with_weights(0.5, 0.5);

        assert!((config.reid_threshold - 0.8).abs() < 1e-6);
        assert_eq!(config.max_lost_frames, 10);
        assert!((config.appearance_weight - 0.5).abs() < 1e-6);
        assert!((config.spatial_match_distance - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let config = ReidConfig::default().with_reid_threshold(-0.1);
        assert!(matches!(
            config.validate(),
            Err(TrackError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_zero_radius() {
        let config = ReidConfig::default().with_reid_position_radius(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_nan_distance() {
        let config = ReidConfig::default().with_spatial_match_distance(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_weights_not_summing_to_one() {
        let config = ReidConfig::default().with_weights(0.7, 0.7);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_tracked() {
        let config = ReidConfig::default().with_ignored_classes(vec![0, 3]);

        assert!(!config.is_tracked(ObjectClass::Classified(0)));
        assert!(!config.is_tracked(ObjectClass::Classified(3)));
        assert!(config.is_tracked(ObjectClass::Classified(2)));
        assert!(config.is_tracked(ObjectClass::Unclassified));
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config =
            ReidConfig::from_json_str(r#"{"reid_threshold": 0.75, "max_lost_frames": 30}"#)
                .unwrap();

        assert!((config.reid_threshold - 0.75).abs() < 1e-6);
        assert_eq!(config.max_lost_frames, 30);
        assert!((config.reid_position_radius - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        let result = ReidConfig::from_json_str(r#"{"position_weight": 0.9}"#);
        assert!(matches!(result, Err(TrackError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_malformed() {
        let result = ReidConfig::from_json_str("{ reid_threshold: ");
        assert!(matches!(result, Err(TrackError::ConfigParse(_))));
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = ReidConfig::from_json_file("does/not/exist.json");
        assert!(matches!(result, Err(TrackError::Io(_))));
    }
}
