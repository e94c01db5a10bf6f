//! Frame reassembly: buffers out-of-order frames and releases them strictly in
//! sequence order.
//!
//! Frames below the cursor are stale and dropped on sight. Gaps are not
//! waited on: the lowest buffered sequence at or above the cursor is always
//! releasable.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::types::{Frame, MAX_PENDING_FRAMES};

/// Why a frame could not be buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// More than the allowed number of frames are waiting. The session can
    /// no longer keep up and must be torn down.
    #[error("frame backlog overflow: {pending} frames pending (limit {limit})")]
    BacklogOverflow { pending: usize, limit: usize },
}

#[derive(Debug, Clone)]
pub struct FrameReassembler {
    pending: BTreeMap<u64, Frame>,
    next_expected: Option<u64>,
    limit: usize,
}

impl Default for FrameReassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReassembler {
    pub fn new() -> Self {
        Self::with_limit(MAX_PENDING_FRAMES)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            pending: BTreeMap::new(),
            next_expected: None,
            limit,
        }
    }

    /// Buffer a frame.
    ///
    /// The very first frame seeds the cursor. A frame whose sequence is
    /// already buffered is a duplicate and is dropped.
    pub fn submit(&mut self, frame: Frame) -> Result<(), SubmitError> {
        if self.next_expected.is_none() {
            self.next_expected = Some(frame.seq);
        }

        if self.pending.contains_key(&frame.seq) {
            debug!(seq = frame.seq, "dropping duplicate frame");
        } else {
            self.pending.insert(frame.seq, frame);
        }

        if self.pending.len() > self.limit {
            return Err(SubmitError::BacklogOverflow {
                pending: self.pending.len(),
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Release the lowest buffered frame with `seq >= expected`.
    ///
    /// Everything below `expected` is discarded as superseded.
    pub fn take_next_ready(&mut self, expected: u64) -> Option<Frame> {
        let keep = self.pending.split_off(&expected);
        let stale = std::mem::replace(&mut self.pending, keep);
        if !stale.is_empty() {
            debug!(count = stale.len(), expected, "discarding stale frames");
        }
        self.pending.pop_first().map(|(_, frame)| frame)
    }

    /// Release the next frame at or after the internal cursor, advancing the
    /// cursor past it.
    pub fn pop_ready(&mut self) -> Option<Frame> {
        let expected = self.next_expected?;
        let frame = self.take_next_ready(expected)?;
        self.next_expected = Some(frame.seq + 1);
        Some(frame)
    }

    /// Whether `pop_ready` would return a frame.
    pub fn has_ready(&self) -> bool {
        match self.next_expected {
            Some(expected) => self.pending.range(expected..).next().is_some(),
            None => false,
        }
    }

    pub fn next_expected(&self) -> Option<u64> {
        self.next_expected
    }

    /// Number of buffered frames (including stale ones not yet discarded).
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(seq: u64) -> Frame {
        Frame {
            seq,
            view_x: 0,
            view_y: 0,
            view_width: 1,
            view_height: 1,
            deltas: Vec::new(),
            creatures: Vec::new(),
            full_redraw: false,
            game_ticks: None,
        }
    }

    #[test]
    fn releases_in_sequence_from_expected() {
        let mut r = FrameReassembler::new();
        for seq in [7, 5, 6, 9] {
            r.submit(frame(seq)).unwrap();
        }
        assert_eq!(r.take_next_ready(5).map(|f| f.seq), Some(5));
        assert_eq!(r.take_next_ready(6).map(|f| f.seq), Some(6));
        assert_eq!(r.take_next_ready(7).map(|f| f.seq), Some(7));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn stale_frames_are_discarded() {
        let mut r = FrameReassembler::new();
        for seq in [1, 2, 10] {
            r.submit(frame(seq)).unwrap();
        }
        assert_eq!(r.take_next_ready(5).map(|f| f.seq), Some(10));
        assert!(r.is_empty());
    }

    #[test]
    fn first_submit_seeds_cursor() {
        let mut r = FrameReassembler::new();
        r.submit(frame(42)).unwrap();
        assert_eq!(r.next_expected(), Some(42));
        r.submit(frame(41)).unwrap();
        assert_eq!(r.pop_ready().map(|f| f.seq), Some(42));
        assert_eq!(r.next_expected(), Some(43));
        // 41 was below the cursor and is gone.
        assert!(r.pop_ready().is_none());
        assert!(r.is_empty());
    }

    #[test]
    fn duplicates_keep_the_first_copy() {
        let mut r = FrameReassembler::new();
        let mut original = frame(3);
        original.full_redraw = true;
        r.submit(original).unwrap();
        r.submit(frame(3)).unwrap();
        assert_eq!(r.len(), 1);
        assert!(r.pop_ready().unwrap().full_redraw);
    }

    #[test]
    fn gaps_do_not_block() {
        let mut r = FrameReassembler::new();
        r.submit(frame(1)).unwrap();
        r.submit(frame(4)).unwrap();
        assert_eq!(r.pop_ready().map(|f| f.seq), Some(1));
        assert!(r.has_ready());
        assert_eq!(r.pop_ready().map(|f| f.seq), Some(4));
        assert!(!r.has_ready());
    }

    #[test]
    fn overflow_is_reported_past_the_limit() {
        let mut r = FrameReassembler::with_limit(3);
        for seq in 0..3 {
            r.submit(frame(seq)).unwrap();
        }
        let err = r.submit(frame(3)).unwrap_err();
        assert_eq!(
            err,
            SubmitError::BacklogOverflow {
                pending: 4,
                limit: 3
            }
        );
    }
}
