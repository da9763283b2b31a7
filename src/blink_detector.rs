//! Blink detection by debouncing the averaged eye aspect ratio.
//!
//! A closure has to last at least `consec_frames` frames to count, and it is
//! counted once, on the first open frame after it. The counter state lives in
//! [`BlinkState`], owned by the caller.

use crate::{
    constants::{BLINK_THRESHOLD, CONSEC_FRAMES},
    events::GestureEvent,
};
use log::debug;

/// Persistent blink counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlinkState {
    /// Frames the eyes have been closed in a row
    pub consecutive_closed: u32,
    /// Blinks counted so far
    pub total_blinks: u64,
}

/// Eye aspect ratio debounce state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkDetector {
    threshold: f64,
    consec_frames: u32,
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self {
            threshold: BLINK_THRESHOLD,
            consec_frames: CONSEC_FRAMES,
        }
    }
}

impl BlinkDetector {
    /// Whether an averaged EAR counts as closed eyes
    #[must_use]
    pub fn is_closed(&self, ear: f64) -> bool {
        ear < self.threshold
    }

    /// Advance the state machine by one frame's averaged EAR
    pub fn step(&self, state: &mut BlinkState, ear: f64) -> Option<GestureEvent> {
        if self.is_closed(ear) {
            state.consecutive_closed = state.consecutive_closed.saturating_add(1);
            return None;
        }

        let closed_for = std::mem::take(&mut state.consecutive_closed);
        if closed_for < self.consec_frames {
            return None;
        }

        state.total_blinks += 1;
        debug!("Blink {} after {} closed frames", state.total_blinks, closed_for);
        Some(GestureEvent::Blink {
            count: state.total_blinks,
        })
    }
}
