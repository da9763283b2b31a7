//! Configuration management for the gesture control application

use crate::{
    constants::{
        DEFAULT_JPEG_QUALITY, DEFAULT_PROVIDER_TIMEOUT_MS, DEFAULT_SUBSCRIBER_CAPACITY,
        PITCH_THRESHOLD_DEG, TILT_THRESHOLD_DEG,
    },
    head_pose::HeadPoseClassifier,
    landmarks::DEFAULT_ACCEPTED_COUNTS,
    video::FrameEncoder,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gesture detection configuration
    pub detection: DetectionConfig,

    /// Landmark provider configuration
    pub provider: ProviderConfig,

    /// Forwarded video configuration
    pub video: VideoConfig,

    /// Event delivery configuration
    pub events: EventConfig,
}

/// Gesture detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Head direction hysteresis band in degrees (0 disables it)
    pub hysteresis_deg: f64,
}

/// Landmark provider parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Deadline for one landmark call in milliseconds (0 disables it)
    pub timeout_ms: u64,

    /// Landmark counts accepted from the provider
    pub accepted_landmark_counts: Vec<usize>,
}

/// Forwarded video parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Mirror frames horizontally before forwarding
    pub mirror: bool,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

/// Event delivery parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Events buffered per subscriber before new ones are dropped
    pub subscriber_capacity: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { hysteresis_deg: 0.0 }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
            accepted_landmark_counts: DEFAULT_ACCEPTED_COUNTS.to_vec(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            mirror: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the head pose classifier from configuration
    pub fn create_classifier(&self) -> Result<HeadPoseClassifier> {
        HeadPoseClassifier::new(self.detection.hysteresis_deg)
            .map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Create the frame encoder from configuration
    #[must_use]
    pub fn create_encoder(&self) -> FrameEncoder {
        FrameEncoder::new(self.video.mirror, self.video.jpeg_quality)
    }

    /// Landmark provider deadline, if enabled
    #[must_use]
    pub fn provider_timeout(&self) -> Option<Duration> {
        (self.provider.timeout_ms > 0).then(|| Duration::from_millis(self.provider.timeout_ms))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let max_hysteresis = PITCH_THRESHOLD_DEG.min(TILT_THRESHOLD_DEG);
        if !(0.0..max_hysteresis).contains(&self.detection.hysteresis_deg) {
            return Err(Error::ConfigError(format!(
                "Hysteresis must be at least 0 and below {} degrees",
                max_hysteresis
            )));
        }

        if self.provider.accepted_landmark_counts.is_empty() {
            return Err(Error::ConfigError(
                "At least one accepted landmark count is required".to_string(),
            ));
        }
        if self.provider.accepted_landmark_counts.iter().any(|&count| count < 468) {
            return Err(Error::ConfigError(
                "Accepted landmark counts must cover the full face mesh (at least 468)".to_string(),
            ));
        }

        if !(1..=100).contains(&self.video.jpeg_quality) {
            return Err(Error::ConfigError(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        if self.events.subscriber_capacity == 0 {
            return Err(Error::ConfigError(
                "Subscriber capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Face Gesture Control Configuration

# Gesture detection
detection:
  # Degrees a held head direction may fall back past its threshold
  # before it is released (0 = switch exactly at the threshold)
  hysteresis_deg: 0.0

# Landmark provider
provider:
  timeout_ms: 200
  accepted_landmark_counts: [468, 478]

# Forwarded video
video:
  mirror: true
  jpeg_quality: 80

# Event delivery
events:
  subscriber_capacity: 64
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_matches_defaults() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_yaml("detection:\n  hysteresis_deg: 1.5\n").unwrap();
        assert_eq!(config.detection.hysteresis_deg, 1.5);
        assert_eq!(config.video, VideoConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.detection.hysteresis_deg = 6.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.video.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.provider.accepted_landmark_counts = vec![100];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.events.subscriber_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = Config::default();
        config.detection.hysteresis_deg = 2.0;
        config.to_file(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_provider_timeout() {
        let mut config = Config::default();
        assert_eq!(config.provider_timeout(), Some(Duration::from_millis(200)));
        config.provider.timeout_ms = 0;
        assert_eq!(config.provider_timeout(), None);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(Config::from_yaml("detection: ["), Err(Error::ConfigError(_))));
    }
}
