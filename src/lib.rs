//! Gesture detection from face landmark streams for hands-free control.
//!
//! This library turns per-frame face mesh landmarks into discrete gesture events:
//! - Blinks, from the eye aspect ratio (EAR) debounced over consecutive frames
//! - Head direction changes (Center, Up, Down, Left, Right), from the
//!   chin-to-eye vector
//!
//! The processing pipeline for each frame is:
//! 1. Landmark lookup through a [`source::LandmarkProvider`] (absent when no face is visible)
//! 2. Geometry extraction: per-eye EAR and head pose angles
//! 3. Blink debouncing and head direction classification against persisted state
//! 4. Dispatch of produced events, then forwarding of the mirrored frame
//!
//! # Examples
//!
//! ## Detection Only
//!
//! ```
//! use face_gesture_control::{
//!     constants::{CHIN, LEFT_EYE, RIGHT_EYE},
//!     events::GestureEvent,
//!     head_pose::HeadDirection,
//!     landmarks::LandmarkFrame,
//!     pipeline::GesturePipeline,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Open eyes (EAR 0.3) with the chin straight below the outer eye corners
//! let mut points = vec![[0.5, 0.5, 0.0]; 468];
//! for (eye, outer, dir) in [(LEFT_EYE, 0.3, 1.0), (RIGHT_EYE, 0.7, -1.0)] {
//!     let [p1, p2, p3, p4, p5, p6] = eye;
//!     points[p1] = [outer, 0.4, 0.0];
//!     points[p4] = [outer + dir * 0.1, 0.4, 0.0];
//!     points[p2] = [outer + dir * 0.03, 0.385, 0.0];
//!     points[p6] = [outer + dir * 0.03, 0.415, 0.0];
//!     points[p3] = [outer + dir * 0.07, 0.385, 0.0];
//!     points[p5] = [outer + dir * 0.07, 0.415, 0.0];
//! }
//! points[CHIN] = [0.5, 0.8, 0.0];
//!
//! let mut pipeline = GesturePipeline::default();
//! assert!(pipeline.process(Some(&LandmarkFrame::new(points.clone())?))?.is_empty());
//!
//! // Chin swings to the right
//! points[CHIN] = [0.7, 0.8, 0.0];
//! let events = pipeline.process(Some(&LandmarkFrame::new(points)?))?;
//! assert_eq!(
//!     events,
//!     vec![GestureEvent::HeadDirectionChanged {
//!         direction: HeadDirection::Right
//!     }]
//! );
//!
//! // No face this frame: state is kept, nothing is emitted
//! assert!(pipeline.process(None)?.is_empty());
//!
//! // Degenerate geometry (here every point coincides) is rejected
//! let flat = LandmarkFrame::new(vec![[0.0, 0.0, 0.0]; 468])?;
//! assert!(pipeline.process(Some(&flat)).is_err());
//! # Ok(())
//! # }
//! ```
//!
//! ## Subscribing to Events
//!
//! ```
//! use face_gesture_control::events::{EventEmitter, GestureEvent};
//!
//! let emitter = EventEmitter::new(16);
//! let subscription = emitter.subscribe();
//!
//! emitter.emit(&GestureEvent::Blink { count: 1 });
//! assert_eq!(subscription.try_recv(), Some(GestureEvent::Blink { count: 1 }));
//! ```
//!
//! ## Complete Session
//!
//! ```no_run
//! use face_gesture_control::{
//!     events::EventEmitter,
//!     source::{ImageSequenceSource, RecordedLandmarks},
//!     pipeline::Session,
//!     video::DirectorySink,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ImageSequenceSource::new("frames")?;
//! let landmarks = RecordedLandmarks::from_path("landmarks.jsonl")?;
//! let emitter = EventEmitter::default();
//! let subscription = emitter.subscribe();
//!
//! let mut session = Session::new(source, landmarks, emitter, DirectorySink::new("out")?);
//! let summary = session.run()?;
//! println!("{} frames, {} events", summary.frames, summary.events);
//!
//! for event in subscription.drain() {
//!     println!("{}", event.to_json()?);
//! }
//! # Ok(())
//! # }
//! ```

/// Eye aspect ratio and head pose geometry
pub mod geometry;

/// Face landmark types and validation
pub mod landmarks;

/// Blink debounce state machine
pub mod blink_detector;

/// Head direction classification
pub mod head_pose;

/// Gesture events and subscriber broadcast
pub mod events;

/// Frame sources and landmark providers
pub mod source;

/// Frame encoding and video sinks
pub mod video;

/// Per-frame pipeline and session loop
pub mod pipeline;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
