// src/frame_slot.rs

use crate::types::Frame;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Single-slot frame buffer between the capture thread and the control loop.
///
/// The capture thread publishes unconditionally; an unconsumed frame is
/// overwritten and counted as dropped. The control loop always operates on
/// the freshest frame, never a backlog.
pub struct FrameSlot {
    slot: Mutex<Option<Frame>>,
    dropped: AtomicU64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            dropped: AtomicU64::new(0),
        }
    }

    /// Publish a frame, overwriting any unconsumed one.
    pub fn publish(&self, frame: Frame) {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        *slot = Some(frame);
    }

    /// Take the latest frame, leaving the slot empty.
    pub fn take(&self) -> Option<Frame> {
        self.slot.lock().take()
    }

    pub fn frames_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
