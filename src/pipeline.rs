//! Frame-by-frame gesture pipeline.
//!
//! [`GesturePipeline`] owns the persistent gesture state and turns one
//! optional landmark frame into zero or more events. [`Session`] drives it
//! over a frame source: fetch landmarks, detect, dispatch events, forward the
//! encoded frame, then move on to the next frame.

use crate::{
    blink_detector::{BlinkDetector, BlinkState},
    events::{EventDispatcher, GestureEvent},
    geometry,
    head_pose::{HeadDirection, HeadPoseClassifier},
    landmarks::LandmarkFrame,
    source::{FrameSource, LandmarkProvider},
    video::{FrameEncoder, VideoSink},
    Result,
};
use log::{debug, info, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Instant;

/// Persistent state carried from frame to frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureState {
    /// Blink debounce counters
    pub blink: BlinkState,
    /// Last classified head direction
    pub head_direction: HeadDirection,
}

/// Detection half of the pipeline, with no I/O
#[derive(Debug, Clone, Default)]
pub struct GesturePipeline {
    blink_detector: BlinkDetector,
    classifier: HeadPoseClassifier,
    state: GestureState,
}

impl GesturePipeline {
    /// Create a pipeline with the given head pose classifier
    #[must_use]
    pub fn new(classifier: HeadPoseClassifier) -> Self {
        Self {
            classifier,
            ..Self::default()
        }
    }

    /// Resume from previously captured state
    #[must_use]
    pub fn with_state(mut self, state: GestureState) -> Self {
        self.state = state;
        self
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Process one frame's landmarks.
    ///
    /// `None` (no face) leaves the state untouched and yields no events. A
    /// closure in progress when the face is lost keeps its frame count.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidLandmarks`] for malformed landmarks; the
    /// state is not modified in that case
    pub fn process(&mut self, landmarks: Option<&LandmarkFrame>) -> Result<Vec<GestureEvent>> {
        let Some(frame) = landmarks else {
            return Ok(Vec::new());
        };

        let metrics = geometry::extract(frame)?;
        debug!(
            "EAR {:.3} (L {:.3} R {:.3}) pitch {:.1} tilt {:?}",
            metrics.ear, metrics.left_ear, metrics.right_ear, metrics.pose.pitch, metrics.pose.tilt
        );

        let blink = self.blink_detector.step(&mut self.state.blink, metrics.ear);
        let turn = self.classifier.step(&mut self.state.head_direction, &metrics.pose);
        Ok(blink.into_iter().chain(turn).collect())
    }
}

/// Cooperative stop flag, polled by a [`Session`] between frames
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Create an unset signal
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the session to stop after the current frame
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The frame source ran out of frames
    Exhausted,
    /// The frame source failed to read a frame
    SourceFailed(String),
    /// A stop was requested
    Stopped,
}

/// Totals for a finished session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// Frames pulled from the source and forwarded
    pub frames: u64,
    /// Frames in which a face was found
    pub faces: u64,
    /// Events dispatched
    pub events: u64,
    /// Final gesture state
    pub state: GestureState,
    /// Why the loop ended
    pub end: SessionEnd,
    /// Average processing rate in frames per second
    pub fps: f64,
}

/// One run of the frame loop over a frame source
pub struct Session<S, P, D, V> {
    source: S,
    provider: P,
    dispatcher: D,
    sink: V,
    encoder: FrameEncoder,
    pipeline: GesturePipeline,
    stop: StopSignal,
}

impl<S, P, D, V> Session<S, P, D, V>
where
    S: FrameSource,
    P: LandmarkProvider,
    D: EventDispatcher,
    V: VideoSink,
{
    /// Assemble a session from its collaborators
    pub fn new(source: S, provider: P, dispatcher: D, sink: V) -> Self {
        Self {
            source,
            provider,
            dispatcher,
            sink,
            encoder: FrameEncoder::default(),
            pipeline: GesturePipeline::default(),
            stop: StopSignal::new(),
        }
    }

    /// Use a specific frame encoder
    #[must_use]
    pub fn with_encoder(mut self, encoder: FrameEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Use a specific detection pipeline
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: GesturePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Use an externally owned stop signal
    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Handle for stopping this session from another thread
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Take back the dispatcher and sink once the session is over
    pub fn into_parts(self) -> (D, V) {
        (self.dispatcher, self.sink)
    }

    /// Run until the source is exhausted, fails, or a stop is requested.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed landmarks, landmark provider failures,
    /// encoding failures and video sink failures. Frame read failures end the
    /// session with [`SessionEnd::SourceFailed`] instead.
    pub fn run(&mut self) -> Result<SessionSummary> {
        info!("Starting gesture session");
        let start_time = Instant::now();
        let mut frames = 0u64;
        let mut faces = 0u64;
        let mut events = 0u64;

        let end = loop {
            if self.stop.is_stopped() {
                info!("Stop requested");
                break SessionEnd::Stopped;
            }

            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("Frame source exhausted");
                    break SessionEnd::Exhausted;
                }
                Err(e) => {
                    warn!("Failed to read frame: {}", e);
                    break SessionEnd::SourceFailed(e.to_string());
                }
            };

            let landmarks = self.provider.detect(&frame)?;
            if landmarks.is_some() {
                faces += 1;
            }

            let produced = self.pipeline.process(landmarks.as_ref())?;
            if !produced.is_empty() {
                for event in &produced {
                    info!("Gesture: {:?}", event);
                }
                self.dispatcher.dispatch(&produced);
                events += produced.len() as u64;
            }

            let bytes = self.encoder.encode(&frame)?;
            self.sink.send_frame(&bytes)?;
            frames += 1;
        };

        let elapsed = start_time.elapsed().as_secs_f64();
        let fps = if elapsed > 0.0 { frames as f64 / elapsed } else { 0.0 };
        let summary = SessionSummary {
            frames,
            faces,
            events,
            state: *self.pipeline.state(),
            end,
            fps,
        };
        info!(
            "Session ended ({:?}): {} frames, {} with a face, {} events, {:.1} FPS",
            summary.end, summary.frames, summary.faces, summary.events, summary.fps
        );
        Ok(summary)
    }
}
