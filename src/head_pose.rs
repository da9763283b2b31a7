//! Head direction classification.
//!
//! Each frame's pose angles are classified in a fixed priority order (pitch
//! before tilt). The result always replaces the persisted direction and an
//! event is produced only when it differs from the previous value.
//!
//! Without hysteresis, angles hovering around a threshold flip the direction
//! on every frame. A non-zero `hysteresis` keeps the current direction until
//! its angle falls back past `threshold - hysteresis`, while entering a new
//! direction still needs the full threshold.

use crate::{
    constants::{PITCH_THRESHOLD_DEG, TILT_THRESHOLD_DEG},
    events::GestureEvent,
    geometry::HeadPose,
    Error, Result,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete head direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HeadDirection {
    /// Facing the camera
    #[default]
    Center,
    /// Chin raised
    Up,
    /// Chin lowered
    Down,
    /// Head tilted to the left
    Left,
    /// Head tilted to the right
    Right,
}

impl fmt::Display for HeadDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Center => "Center",
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Left => "Left",
            Self::Right => "Right",
        };
        f.write_str(name)
    }
}

/// Classifies head pose angles into a [`HeadDirection`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPoseClassifier {
    pitch_threshold: f64,
    tilt_threshold: f64,
    hysteresis: f64,
}

impl Default for HeadPoseClassifier {
    fn default() -> Self {
        Self {
            pitch_threshold: PITCH_THRESHOLD_DEG,
            tilt_threshold: TILT_THRESHOLD_DEG,
            hysteresis: 0.0,
        }
    }
}

impl HeadPoseClassifier {
    /// Create a classifier with the given hysteresis band in degrees
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 <= hysteresis < threshold` for both angles
    pub fn new(hysteresis: f64) -> Result<Self> {
        let max = PITCH_THRESHOLD_DEG.min(TILT_THRESHOLD_DEG);
        if !hysteresis.is_finite() || !(0.0..max).contains(&hysteresis) {
            return Err(Error::InvalidInput(format!(
                "Hysteresis must be in [0, {max}) degrees, got {hysteresis}"
            )));
        }
        Ok(Self {
            hysteresis,
            ..Self::default()
        })
    }

    /// Hysteresis band in degrees
    #[must_use]
    pub fn hysteresis(&self) -> f64 {
        self.hysteresis
    }

    fn threshold_for(
        &self,
        direction: HeadDirection,
        previous: HeadDirection,
        threshold: f64,
    ) -> f64 {
        if direction == previous {
            threshold - self.hysteresis
        } else {
            threshold
        }
    }

    /// Classify pose angles, given the direction persisted from the last frame
    #[must_use]
    pub fn classify(&self, pose: &HeadPose, previous: HeadDirection) -> HeadDirection {
        use HeadDirection::{Center, Down, Left, Right, Up};

        if pose.pitch > self.threshold_for(Up, previous, self.pitch_threshold) {
            return Up;
        }
        if pose.pitch < -self.threshold_for(Down, previous, self.pitch_threshold) {
            return Down;
        }

        match pose.tilt {
            Some(tilt) if tilt > self.threshold_for(Right, previous, self.tilt_threshold) => Right,
            Some(tilt) if tilt < -self.threshold_for(Left, previous, self.tilt_threshold) => Left,
            _ => Center,
        }
    }

    /// Classify and persist the new direction, returning an event on change
    pub fn step(&self, last: &mut HeadDirection, pose: &HeadPose) -> Option<GestureEvent> {
        let direction = self.classify(pose, *last);
        let previous = std::mem::replace(last, direction);
        if direction == previous {
            return None;
        }

        debug!(
            "Head direction {} -> {} (pitch {:.1}, tilt {:?})",
            previous, direction, pose.pitch, pose.tilt
        );
        Some(GestureEvent::HeadDirectionChanged { direction })
    }
}
