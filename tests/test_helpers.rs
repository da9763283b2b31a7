//! Helper functions and utilities for tests
#![allow(dead_code)]

use face_gesture_control::{
    constants::{CHIN, LEFT_EYE, RIGHT_EYE},
    landmarks::LandmarkFrame,
    source::{Frame, FrameSource, LandmarkProvider},
    Error, Result,
};
use std::collections::VecDeque;

/// Averaged EAR of clearly open eyes
pub const OPEN_EAR: f64 = 0.3;

/// Averaged EAR of clearly closed eyes
pub const CLOSED_EAR: f64 = 0.1;

/// Horizontal eye width used by the synthetic face
const EYE_WIDTH: f64 = 0.1;

/// Vertical distance from the eye midpoint down to the chin
const CHIN_DROP: f64 = 0.4;

/// Build face mesh points whose geometry yields the requested EAR (both eyes)
/// and head pose angles in degrees
pub fn face_points(ear: f64, pitch_deg: f64, tilt_deg: f64) -> Vec<[f64; 3]> {
    let mut points = vec![[0.5, 0.5, 0.0]; 468];
    let lid = ear * EYE_WIDTH / 2.0;

    // outer corners at 0.3 and 0.7 put the eye midpoint at (0.5, 0.4, 0.0)
    for (eye, outer, dir) in [(LEFT_EYE, 0.3, 1.0), (RIGHT_EYE, 0.7, -1.0)] {
        points[eye[0]] = [outer, 0.4, 0.0];
        points[eye[3]] = [outer + dir * EYE_WIDTH, 0.4, 0.0];
        points[eye[1]] = [outer + dir * 0.03, 0.4 - lid, 0.0];
        points[eye[5]] = [outer + dir * 0.03, 0.4 + lid, 0.0];
        points[eye[2]] = [outer + dir * 0.07, 0.4 - lid, 0.0];
        points[eye[4]] = [outer + dir * 0.07, 0.4 + lid, 0.0];
    }

    points[CHIN] = [
        0.5 + CHIN_DROP * tilt_deg.to_radians().tan(),
        0.4 + CHIN_DROP,
        CHIN_DROP * pitch_deg.to_radians().tan(),
    ];
    points
}

/// Validated landmark frame for the requested EAR and pose
pub fn face(ear: f64, pitch_deg: f64, tilt_deg: f64) -> LandmarkFrame {
    LandmarkFrame::new(face_points(ear, pitch_deg, tilt_deg)).expect("synthetic face is valid")
}

/// Open-eyed face looking straight ahead
pub fn neutral_face() -> LandmarkFrame {
    face(OPEN_EAR, 0.0, 0.0)
}

/// Landmark provider that replays a fixed script, then reports no face
pub struct ScriptedProvider {
    script: VecDeque<Result<Option<LandmarkFrame>>>,
}

impl ScriptedProvider {
    pub fn new(frames: Vec<Option<LandmarkFrame>>) -> Self {
        Self {
            script: frames.into_iter().map(Ok).collect(),
        }
    }

    /// Script that fails with malformed landmarks after the given frames
    pub fn failing_after(frames: Vec<Option<LandmarkFrame>>) -> Self {
        let mut provider = Self::new(frames);
        provider
            .script
            .push_back(Err(Error::InvalidLandmarks("expected 468 points, got 3".to_string())));
        provider
    }
}

impl LandmarkProvider for ScriptedProvider {
    fn detect(&mut self, _frame: &Frame) -> Result<Option<LandmarkFrame>> {
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

/// Frame source that yields some frames and then fails to read
pub struct FailingSource {
    remaining: usize,
}

impl FailingSource {
    pub fn new(frames_before_failure: usize) -> Self {
        Self {
            remaining: frames_before_failure,
        }
    }
}

impl FrameSource for FailingSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.remaining == 0 {
            return Err(Error::FrameSource("camera disconnected".to_string()));
        }
        self.remaining -= 1;
        Ok(Some(Frame::new(4, 4)))
    }
}
