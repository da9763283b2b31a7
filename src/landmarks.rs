//! Face landmark types.
//!
//! A [`LandmarkFrame`] holds the face mesh points for at most one face in one
//! input frame. Frames are validated on construction so that geometry code can
//! index into them without out-of-range access.

use crate::{
    constants::{NUM_FACE_MESH_LANDMARKS, NUM_REFINED_FACE_MESH_LANDMARKS},
    Error, Result,
};

/// Landmark counts accepted by [`LandmarkFrame::new`]
pub const DEFAULT_ACCEPTED_COUNTS: [usize; 2] =
    [NUM_FACE_MESH_LANDMARKS, NUM_REFINED_FACE_MESH_LANDMARKS];

/// A single 3D face landmark in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    /// Canonical face mesh index
    pub index: usize,
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate (grows downwards)
    pub y: f64,
    /// Depth relative to the face center
    pub z: f64,
}

impl Landmark {
    /// Euclidean distance in 3D
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Component-wise midpoint `(x, y, z)` of two landmarks
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> (f64, f64, f64) {
        (
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }
}

/// Ordered landmarks for one detected face
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: Vec<[f64; 3]>,
}

impl LandmarkFrame {
    /// Build a frame from raw `[x, y, z]` points, accepting the standard face
    /// mesh sizes (468, or 478 with iris refinement)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLandmarks`] if the point count is not accepted or
    /// any coordinate is not finite
    pub fn new(points: Vec<[f64; 3]>) -> Result<Self> {
        Self::with_accepted_counts(points, &DEFAULT_ACCEPTED_COUNTS)
    }

    /// Build a frame from raw points, accepting only the given point counts
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLandmarks`] if the point count is not in
    /// `accepted` or any coordinate is not finite
    pub fn with_accepted_counts(points: Vec<[f64; 3]>, accepted: &[usize]) -> Result<Self> {
        if !accepted.contains(&points.len()) {
            return Err(Error::InvalidLandmarks(format!(
                "expected one of {accepted:?} points, got {}",
                points.len()
            )));
        }

        if let Some((index, point)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| p.iter().any(|c| !c.is_finite()))
        {
            return Err(Error::InvalidLandmarks(format!(
                "non-finite coordinate at landmark {index}: {point:?}"
            )));
        }

        Ok(Self { points })
    }

    /// Number of landmarks in the frame
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the frame holds no landmarks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Look up a landmark by canonical index
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLandmarks`] if the index is missing
    pub fn get(&self, index: usize) -> Result<Landmark> {
        let [x, y, z] = *self.points.get(index).ok_or_else(|| {
            Error::InvalidLandmarks(format!(
                "landmark {index} missing from frame of {} points",
                self.points.len()
            ))
        })?;
        Ok(Landmark { index, x, y, z })
    }

    /// Iterate over all landmarks in index order
    pub fn iter(&self) -> impl Iterator<Item = Landmark> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(|(index, &[x, y, z])| Landmark { index, x, y, z })
    }

    /// Borrow the raw points
    #[must_use]
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }
}
