//! Session settings
//!
//! Supplied by the host as JSON (or left at defaults). Read once when a
//! session starts; changing them mid-session takes effect on the next restart.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::CameraMode;

/// Largest tree/boulder population a session will generate
pub const MAX_POPULATION: u32 = 2000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// World seed (terrain, populations, hazard rolls)
    pub seed: u64,
    /// Length of a full day/night cycle in seconds
    pub day_duration_secs: f32,
    pub tree_count: u32,
    pub boulder_count: u32,
    /// Radius of the playable island
    pub world_radius: f32,
    /// Player max health at session start
    pub starting_health: f32,
    /// Emit sound cues to the host
    pub sound_enabled: bool,
    pub default_camera: CameraMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0xBEA7_E12D,
            day_duration_secs: DEFAULT_DAY_DURATION_SECS,
            tree_count: DEFAULT_TREE_COUNT,
            boulder_count: DEFAULT_BOULDER_COUNT,
            world_radius: DEFAULT_WORLD_RADIUS,
            starting_health: DEFAULT_MAX_HEALTH,
            sound_enabled: true,
            default_camera: CameraMode::ThirdPerson,
        }
    }
}

impl Settings {
    /// Parse and validate host-provided JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.day_duration_secs.is_finite() && self.day_duration_secs > 0.0) {
            return Err(SettingsError::Invalid {
                field: "day_duration_secs",
                reason: "must be a positive number of seconds",
            });
        }
        if !(self.world_radius.is_finite() && self.world_radius > SPAWN_CLEARING_RADIUS) {
            return Err(SettingsError::Invalid {
                field: "world_radius",
                reason: "must be larger than the spawn clearing",
            });
        }
        if !(self.starting_health.is_finite() && self.starting_health > 0.0) {
            return Err(SettingsError::Invalid {
                field: "starting_health",
                reason: "must be positive",
            });
        }
        if self.tree_count > MAX_POPULATION {
            return Err(SettingsError::Invalid {
                field: "tree_count",
                reason: "too many trees",
            });
        }
        if self.boulder_count > MAX_POPULATION {
            return Err(SettingsError::Invalid {
                field: "boulder_count",
                reason: "too many boulders",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let settings = Settings::from_json(r#"{"seed": 9, "tree_count": 3}"#).unwrap();
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.tree_count, 3);
        assert_eq!(settings.boulder_count, DEFAULT_BOULDER_COUNT);
    }

    #[test]
    fn rejects_non_positive_day() {
        let err = Settings::from_json(r#"{"day_duration_secs": 0.0}"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "day_duration_secs",
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Settings::from_json("{seed:"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn round_trips_camera_mode() {
        let settings = Settings {
            default_camera: CameraMode::TopDown,
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}
