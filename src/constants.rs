//! Constants used throughout the application

/// Number of landmarks produced by the face mesh model
pub const NUM_FACE_MESH_LANDMARKS: usize = 468;

/// Number of landmarks when iris refinement is enabled
pub const NUM_REFINED_FACE_MESH_LANDMARKS: usize = 478;

/// Averaged eye aspect ratio below which the eyes count as closed
pub const BLINK_THRESHOLD: f64 = 0.21;

/// Consecutive closed frames required before a reopening counts as a blink
pub const CONSEC_FRAMES: u32 = 2;

/// Pitch angle (degrees) beyond which the head counts as looking up or down
pub const PITCH_THRESHOLD_DEG: f64 = 5.0;

/// Tilt angle (degrees) beyond which the head counts as tilted left or right
pub const TILT_THRESHOLD_DEG: f64 = 5.0;

/// Left eye contour, ordered p1..p6 (outer corner, top pair, inner corner, bottom pair)
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Right eye contour, ordered p1..p6
pub const RIGHT_EYE: [usize; 6] = [263, 387, 385, 362, 380, 373];

/// Outer corner of the left eye
pub const LEFT_EYE_OUTER: usize = 33;

/// Outer corner of the right eye
pub const RIGHT_EYE_OUTER: usize = 263;

/// Chin tip
pub const CHIN: usize = 152;

/// Default JPEG quality for forwarded frames
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Default bounded queue length per event subscriber
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

/// Default landmark provider deadline in milliseconds
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 200;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-12;
