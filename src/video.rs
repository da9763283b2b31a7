//! Downstream video: frame encoding and sinks.
//!
//! Every input frame is forwarded, whether or not a face was found in it.

use crate::{constants::DEFAULT_JPEG_QUALITY, source::Frame, Error, Result};
use image::{codecs::jpeg::JpegEncoder, imageops, ColorType};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Receives encoded frames
pub trait VideoSink {
    /// Accept one encoded frame
    ///
    /// # Errors
    ///
    /// Returns an error if the frame could not be delivered
    fn send_frame(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<V: VideoSink + ?Sized> VideoSink for Box<V> {
    fn send_frame(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send_frame(bytes)
    }
}

/// Discards every frame
#[derive(Debug, Default)]
pub struct NullSink {
    frames: u64,
}

impl NullSink {
    /// Frames received so far
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl VideoSink for NullSink {
    fn send_frame(&mut self, _bytes: &[u8]) -> Result<()> {
        self.frames += 1;
        Ok(())
    }
}

/// Keeps encoded frames in memory
impl VideoSink for Vec<Vec<u8>> {
    fn send_frame(&mut self, bytes: &[u8]) -> Result<()> {
        self.push(bytes.to_vec());
        Ok(())
    }
}

/// Writes numbered JPEG files into a directory
pub struct DirectorySink {
    dir: PathBuf,
    next_index: u64,
}

impl DirectorySink {
    /// Create the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            next_index: 0,
        })
    }
}

impl VideoSink for DirectorySink {
    fn send_frame(&mut self, bytes: &[u8]) -> Result<()> {
        let path = self.dir.join(format!("frame_{:06}.jpg", self.next_index));
        fs::write(&path, bytes).map_err(|e| Error::VideoSink(format!("{}: {e}", path.display())))?;
        debug!("Wrote {}", path.display());
        self.next_index += 1;
        Ok(())
    }
}

/// Turns frames into the bytes sent downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEncoder {
    mirror: bool,
    quality: u8,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self {
            mirror: true,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl FrameEncoder {
    /// Create an encoder; `quality` is clamped to `1..=100`
    #[must_use]
    pub fn new(mirror: bool, quality: u8) -> Self {
        Self {
            mirror,
            quality: quality.clamp(1, 100),
        }
    }

    /// Mirror the frame horizontally if enabled
    #[must_use]
    pub fn prepare(&self, frame: &Frame) -> Frame {
        if self.mirror {
            imageops::flip_horizontal(frame)
        } else {
            frame.clone()
        }
    }

    /// Mirror (if enabled) and JPEG-encode a frame
    ///
    /// # Errors
    ///
    /// Returns an error if JPEG encoding fails
    pub fn encode(&self, frame: &Frame) -> Result<Vec<u8>> {
        let prepared = self.prepare(frame);
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.quality).encode(
            prepared.as_raw(),
            prepared.width(),
            prepared.height(),
            ColorType::Rgb8,
        )?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn marked_frame() -> Frame {
        let mut frame = Frame::new(4, 2);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        frame
    }

    #[test]
    fn test_mirror_flips_horizontally() {
        let mirrored = FrameEncoder::new(true, 80).prepare(&marked_frame());
        assert_eq!(*mirrored.get_pixel(3, 0), Rgb([255, 0, 0]));
        assert_eq!(*mirrored.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_no_mirror_keeps_frame() {
        let frame = marked_frame();
        assert_eq!(FrameEncoder::new(false, 80).prepare(&frame), frame);
    }

    #[test]
    fn test_encode_produces_jpeg() {
        let bytes = FrameEncoder::default().encode(&Frame::new(8, 8)).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(FrameEncoder::new(true, 0), FrameEncoder::new(true, 1));
    }

    #[test]
    fn test_directory_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("out")).unwrap();
        sink.send_frame(&[1, 2, 3]).unwrap();
        sink.send_frame(&[4]).unwrap();
        assert_eq!(fs::read(dir.path().join("out/frame_000001.jpg")).unwrap(), vec![4]);
    }
}
