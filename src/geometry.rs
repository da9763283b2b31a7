//! Landmark geometry: eye aspect ratio and head pose angles.
//!
//! All functions here are pure. They read a [`LandmarkFrame`] and return scalar
//! metrics without keeping any state between frames.

use crate::{
    constants::{
        CHIN, EPSILON, LEFT_EYE, LEFT_EYE_OUTER, PITCH_THRESHOLD_DEG, RIGHT_EYE, RIGHT_EYE_OUTER,
    },
    landmarks::LandmarkFrame,
    Error, Result,
};

/// Head pose angles in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    /// Forward/backward nod, positive when the chin moves away from the camera
    pub pitch: f64,
    /// Sideways tilt; only evaluated when the pitch is within the pitch threshold
    pub tilt: Option<f64>,
}

/// Per-frame metrics derived from landmark geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    /// Left eye aspect ratio
    pub left_ear: f64,
    /// Right eye aspect ratio
    pub right_ear: f64,
    /// Mean of both eye aspect ratios
    pub ear: f64,
    /// Head pose angles
    pub pose: HeadPose,
}

/// Eye aspect ratio for a six point eye contour `p1..p6`:
/// `(|p2 - p6| + |p3 - p5|) / (2 |p1 - p4|)`
///
/// # Errors
///
/// Returns [`Error::InvalidLandmarks`] if an index is missing, the eye
/// corners coincide or the coordinates are too large to measure
pub fn eye_aspect_ratio(frame: &LandmarkFrame, eye: [usize; 6]) -> Result<f64> {
    let [p1, p2, p3, p4, p5, p6] = [
        frame.get(eye[0])?,
        frame.get(eye[1])?,
        frame.get(eye[2])?,
        frame.get(eye[3])?,
        frame.get(eye[4])?,
        frame.get(eye[5])?,
    ];

    let vertical_a = p2.distance(&p6);
    let vertical_b = p3.distance(&p5);
    let horizontal = p1.distance(&p4);

    if horizontal < EPSILON {
        return Err(Error::InvalidLandmarks(format!(
            "degenerate eye contour: corners {} and {} coincide",
            p1.index, p4.index
        )));
    }

    let ear = (vertical_a + vertical_b) / (2.0 * horizontal);
    if !horizontal.is_finite() || !ear.is_finite() {
        return Err(Error::InvalidLandmarks(format!(
            "eye contour {}..{} overflows",
            p1.index, p6.index
        )));
    }

    Ok(ear)
}

/// Left, right and averaged eye aspect ratio
///
/// # Errors
///
/// Propagates [`eye_aspect_ratio`] errors for either eye
pub fn average_ear(frame: &LandmarkFrame) -> Result<(f64, f64, f64)> {
    let left = eye_aspect_ratio(frame, LEFT_EYE)?;
    let right = eye_aspect_ratio(frame, RIGHT_EYE)?;
    Ok((left, right, (left + right) / 2.0))
}

/// Head pose from the vector between the outer eye midpoint and the chin.
///
/// `pitch = atan2(dz, dy)`; `tilt = atan2(dx, dy)` is computed only when
/// `|pitch| <= PITCH_THRESHOLD_DEG`.
///
/// # Errors
///
/// Returns [`Error::InvalidLandmarks`] if a required landmark is missing or
/// the chin vector is not finite
pub fn head_pose(frame: &LandmarkFrame) -> Result<HeadPose> {
    let chin = frame.get(CHIN)?;
    let left_outer = frame.get(LEFT_EYE_OUTER)?;
    let right_outer = frame.get(RIGHT_EYE_OUTER)?;

    let (mid_x, mid_y, mid_z) = left_outer.midpoint(&right_outer);
    let dx = chin.x - mid_x;
    let dy = chin.y - mid_y;
    let dz = chin.z - mid_z;
    if !(dx.is_finite() && dy.is_finite() && dz.is_finite()) {
        return Err(Error::InvalidLandmarks("chin vector overflows".to_string()));
    }

    let pitch = dz.atan2(dy).to_degrees();
    let tilt = (pitch.abs() <= PITCH_THRESHOLD_DEG).then(|| dx.atan2(dy).to_degrees());

    Ok(HeadPose { pitch, tilt })
}

/// Run every geometry measurement for one frame
///
/// # Errors
///
/// Returns [`Error::InvalidLandmarks`] for missing landmarks or degenerate
/// geometry
pub fn extract(frame: &LandmarkFrame) -> Result<FrameMetrics> {
    let (left_ear, right_ear, ear) = average_ear(frame)?;
    let pose = head_pose(frame)?;
    Ok(FrameMetrics {
        left_ear,
        right_ear,
        ear,
        pose,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame with a symmetric open-eye contour and the chin straight below the eyes
    fn face(eye_height: f64, chin: [f64; 3]) -> LandmarkFrame {
        let mut points = vec![[0.5, 0.5, 0.0]; 468];
        // outer corners sit at 0.3 and 0.7 so the eye midpoint is x = 0.5
        for (eye, outer, dir) in [(LEFT_EYE, 0.3, 1.0), (RIGHT_EYE, 0.7, -1.0)] {
            points[eye[0]] = [outer, 0.4, 0.0];
            points[eye[3]] = [outer + dir * 0.1, 0.4, 0.0];
            points[eye[1]] = [outer + dir * 0.03, 0.4 - eye_height / 2.0, 0.0];
            points[eye[5]] = [outer + dir * 0.03, 0.4 + eye_height / 2.0, 0.0];
            points[eye[2]] = [outer + dir * 0.07, 0.4 - eye_height / 2.0, 0.0];
            points[eye[4]] = [outer + dir * 0.07, 0.4 + eye_height / 2.0, 0.0];
        }
        points[CHIN] = chin;
        LandmarkFrame::new(points).unwrap()
    }

    #[test]
    fn test_eye_aspect_ratio() {
        // vertical distances 0.03 each, horizontal 0.1 => 0.06 / 0.2 = 0.3
        let frame = face(0.03, [0.5, 0.8, 0.0]);
        let ear = eye_aspect_ratio(&frame, LEFT_EYE).unwrap();
        assert!((ear - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_average_ear_per_eye() {
        let mut points = face(0.03, [0.5, 0.8, 0.0]).points().to_vec();
        // close the right eye only
        for i in [1, 2] {
            points[RIGHT_EYE[i]][1] = 0.4;
        }
        for i in [4, 5] {
            points[RIGHT_EYE[i]][1] = 0.4;
        }
        let frame = LandmarkFrame::new(points).unwrap();
        let (left, right, avg) = average_ear(&frame).unwrap();
        assert!((left - 0.3).abs() < 1e-9);
        assert!(right.abs() < 1e-9);
        assert!((avg - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_eye() {
        let mut points = face(0.03, [0.5, 0.8, 0.0]).points().to_vec();
        points[LEFT_EYE[3]] = points[LEFT_EYE[0]];
        let frame = LandmarkFrame::new(points).unwrap();
        assert!(matches!(
            eye_aspect_ratio(&frame, LEFT_EYE),
            Err(Error::InvalidLandmarks(_))
        ));
    }

    #[test]
    fn test_overflowing_eye_corners() {
        let mut points = face(0.03, [0.5, 0.8, 0.0]).points().to_vec();
        points[LEFT_EYE[0]][0] = -1e308;
        points[LEFT_EYE[3]][0] = 1e308;
        let frame = LandmarkFrame::new(points).unwrap();
        assert!(matches!(
            eye_aspect_ratio(&frame, LEFT_EYE),
            Err(Error::InvalidLandmarks(_))
        ));
    }

    #[test]
    fn test_overflowing_eye_contour() {
        let mut points = face(0.03, [0.5, 0.8, 0.0]).points().to_vec();
        for (i, &index) in LEFT_EYE.iter().enumerate() {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            points[index] = [sign * 1e308, -sign * 1e308, 0.0];
        }
        let frame = LandmarkFrame::new(points).unwrap();
        assert!(matches!(
            eye_aspect_ratio(&frame, LEFT_EYE),
            Err(Error::InvalidLandmarks(_))
        ));
    }

    #[test]
    fn test_overflowing_chin_vector() {
        let mut points = face(0.03, [0.5, 0.8, 0.0]).points().to_vec();
        // the eye midpoint overflows even though every coordinate is finite
        points[LEFT_EYE_OUTER][1] = 1e308;
        points[RIGHT_EYE_OUTER][1] = 1e308;
        let frame = LandmarkFrame::new(points).unwrap();
        assert!(matches!(head_pose(&frame), Err(Error::InvalidLandmarks(_))));
    }

    #[test]
    fn test_head_pose_level() {
        // eye midpoint (0.5, 0.4, 0.0), chin straight below
        let pose = head_pose(&face(0.03, [0.5, 0.8, 0.0])).unwrap();
        assert!(pose.pitch.abs() < 1e-9);
        assert!(pose.tilt.unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_head_pose_pitch_skips_tilt() {
        // dz = dy => 45 degrees
        let pose = head_pose(&face(0.03, [0.6, 0.8, 0.4])).unwrap();
        assert!((pose.pitch - 45.0).abs() < 1e-9);
        assert!(pose.tilt.is_none());
    }

    #[test]
    fn test_head_pose_tilt() {
        // dx = dy => 45 degrees to the right
        let pose = head_pose(&face(0.03, [0.9, 0.8, 0.0])).unwrap();
        assert!((pose.tilt.unwrap() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_pitch_inside_threshold_evaluates_tilt() {
        let dz = 0.4 * (PITCH_THRESHOLD_DEG - 1e-6).to_radians().tan();
        let pose = head_pose(&face(0.03, [0.5, 0.8, dz])).unwrap();
        assert!(pose.tilt.is_some());
    }

    #[test]
    fn test_extract() {
        let metrics = extract(&face(0.03, [0.5, 0.8, 0.0])).unwrap();
        assert!((metrics.ear - 0.3).abs() < 1e-9);
        assert!((metrics.left_ear - metrics.right_ear).abs() < 1e-9);
    }
}
