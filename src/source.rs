//! Frame sources and landmark providers.
//!
//! Both are external collaborators of the gesture pipeline. The traits here
//! describe what the pipeline consumes; the implementations cover file-backed
//! replay and bounding a slow landmark model with a deadline.

use crate::{
    landmarks::{LandmarkFrame, DEFAULT_ACCEPTED_COUNTS},
    Error, Result,
};
use image::RgbImage;
use log::{debug, info, warn};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

/// A raw video frame
pub type Frame = RgbImage;

/// Produces frames until exhausted
pub trait FrameSource {
    /// Next frame, `Ok(None)` once the source is exhausted
    ///
    /// # Errors
    ///
    /// Returns an error if the frame could not be read
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame()
    }
}

/// Finds face landmarks in a frame
pub trait LandmarkProvider {
    /// Landmarks of at most one face, `Ok(None)` when no face is visible
    ///
    /// # Errors
    ///
    /// Returns an error if the provider failed or produced malformed output
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkFrame>>;
}

impl<P: LandmarkProvider + ?Sized> LandmarkProvider for Box<P> {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkFrame>> {
        (**self).detect(frame)
    }
}

/// Reads image files from a directory in file name order
pub struct ImageSequenceSource {
    paths: std::vec::IntoIter<PathBuf>,
}

impl ImageSequenceSource {
    /// Supported image file extensions
    pub const EXTENSIONS: [&'static str; 3] = ["png", "jpg", "jpeg"];

    /// Collect image files from `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| Self::EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            })
            .collect();
        paths.sort();

        info!("Found {} frames in {}", paths.len(), dir.as_ref().display());
        Ok(Self {
            paths: paths.into_iter(),
        })
    }

    /// Frames not yet read
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.paths.next() else {
            return Ok(None);
        };
        debug!("Reading frame {}", path.display());
        let image = image::open(&path)
            .map_err(|e| Error::FrameSource(format!("{}: {e}", path.display())))?;
        Ok(Some(image.to_rgb8()))
    }
}

/// Yields a fixed number of black frames, for landmark replay without video
pub struct BlankFrameSource {
    remaining: usize,
    width: u32,
    height: u32,
}

impl BlankFrameSource {
    /// Create a source of `count` frames of the given size
    #[must_use]
    pub fn new(count: usize, width: u32, height: u32) -> Self {
        Self {
            remaining: count,
            width,
            height,
        }
    }
}

impl FrameSource for BlankFrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(RgbImage::new(self.width, self.height)))
    }
}

/// Replays landmarks recorded as JSON lines.
///
/// Each line is either `null` (no face) or an array of `[x, y, z]` points.
/// Points are validated when replayed, so a malformed entry fails the frame
/// it belongs to. Frames past the end of the recording report no face.
pub struct RecordedLandmarks {
    entries: std::vec::IntoIter<Option<Vec<[f64; 3]>>>,
    accepted_counts: Vec<usize>,
}

impl RecordedLandmarks {
    /// Load a recording from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not valid JSON
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = fs::File::open(path.as_ref())?;
        let recording = Self::from_reader(BufReader::new(file))?;
        info!("Loaded {} recorded frames from {}", recording.len(), path.as_ref().display());
        Ok(recording)
    }

    /// Load a recording from any buffered reader
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or a line is not valid JSON
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: Option<Vec<[f64; 3]>> = serde_json::from_str(&line)
                .map_err(|e| {
                    Error::InvalidLandmarks(format!("recording line {}: {e}", number + 1))
                })?;
            entries.push(entry);
        }
        Ok(Self {
            entries: entries.into_iter(),
            accepted_counts: DEFAULT_ACCEPTED_COUNTS.to_vec(),
        })
    }

    /// Restrict the landmark counts accepted on replay
    #[must_use]
    pub fn with_accepted_counts(mut self, counts: Vec<usize>) -> Self {
        self.accepted_counts = counts;
        self
    }

    /// Recorded frames not yet replayed
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the recording is used up
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

impl LandmarkProvider for RecordedLandmarks {
    fn detect(&mut self, _frame: &Frame) -> Result<Option<LandmarkFrame>> {
        match self.entries.next().flatten() {
            Some(points) => {
                LandmarkFrame::with_accepted_counts(points, &self.accepted_counts).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Runs a provider on a worker thread and reports "no face" when a call
/// exceeds its deadline.
///
/// While a timed-out call is still running, later frames are reported as
/// "no face" without being submitted; its late result is discarded.
pub struct TimeoutLandmarkProvider {
    requests: Option<Sender<Frame>>,
    responses: Receiver<Result<Option<LandmarkFrame>>>,
    timeout: Duration,
    pending: bool,
    timeouts: u64,
    worker: Option<thread::JoinHandle<()>>,
}

impl TimeoutLandmarkProvider {
    /// Move `provider` onto a worker thread with the given per-call deadline
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned
    pub fn new<P>(mut provider: P, timeout: Duration) -> Result<Self>
    where
        P: LandmarkProvider + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<Frame>();
        let (response_tx, response_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("landmark-provider".to_string())
            .spawn(move || {
                for frame in request_rx {
                    if response_tx.send(provider.detect(&frame)).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            timeout,
            pending: false,
            timeouts: 0,
            worker: Some(worker),
        })
    }

    /// Calls that missed their deadline so far
    #[must_use]
    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }

    fn worker_gone() -> Error {
        Error::LandmarkProvider("landmark worker thread stopped".to_string())
    }
}

impl LandmarkProvider for TimeoutLandmarkProvider {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkFrame>> {
        if self.pending {
            match self.responses.try_recv() {
                Ok(_stale) => {
                    debug!("Discarding late landmark result");
                    self.pending = false;
                }
                Err(mpsc::TryRecvError::Empty) => return Ok(None),
                Err(mpsc::TryRecvError::Disconnected) => return Err(Self::worker_gone()),
            }
        }

        let requests = self.requests.as_ref().ok_or_else(Self::worker_gone)?;
        requests.send(frame.clone()).map_err(|_| Self::worker_gone())?;

        match self.responses.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                self.pending = true;
                self.timeouts += 1;
                warn!(
                    "Landmark provider exceeded {:?}, treating frame as no face ({} timeouts)",
                    self.timeout, self.timeouts
                );
                Ok(None)
            }
            Err(RecvTimeoutError::Disconnected) => Err(Self::worker_gone()),
        }
    }
}

impl Drop for TimeoutLandmarkProvider {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if !self.pending && worker.join().is_err() {
                warn!("Landmark worker thread panicked");
            }
        }
    }
}
