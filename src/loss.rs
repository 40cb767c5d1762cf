// src/loss.rs

use crate::types::{ControlOutput, LossConfig};
use std::collections::VecDeque;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossState {
    Tracking,
    BriefLoss,
    Searching,
    Lost,
}

impl LossState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tracking => "TRACKING",
            Self::BriefLoss => "BRIEF_LOSS",
            Self::Searching => "SEARCHING",
            Self::Lost => "LOST",
        }
    }
}

/// What the controller should do on a tick without a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossAction {
    /// Keep executing the previous command (single-frame detector noise).
    HoldPrevious,
    /// Emit a gentle search nudge.
    Command(ControlOutput),
    /// Full stop and reset of all controller state.
    FullStop,
}

/// Tracks detection continuity over a rolling window and decides how to react
/// to gaps. Escalation: brief hold, then wait/search, then full stop.
pub struct LossTracker {
    config: LossConfig,
    history: VecDeque<bool>,
    frames_since_detection: u32,
    state: LossState,
}

impl LossTracker {
    pub fn new(config: LossConfig) -> Self {
        let capacity = config.history_len;
        Self {
            config,
            history: VecDeque::with_capacity(capacity),
            frames_since_detection: 0,
            state: LossState::Tracking,
        }
    }

    pub fn state(&self) -> LossState {
        self.state
    }

    /// Record a tick with a detection present.
    pub fn record_detection(&mut self) {
        self.push(true);
        if self.state != LossState::Tracking {
            info!("🎯 Target reacquired after {} frames", self.frames_since_detection);
        }
        self.frames_since_detection = 0;
        self.state = LossState::Tracking;
    }

    /// Record a tick without a detection and decide the reaction.
    /// `last_center` and `frame_width` steer the search nudge toward the side
    /// the target was last seen on.
    pub fn record_miss(
        &mut self,
        last_center: Option<(f32, f32)>,
        frame_width: f32,
    ) -> LossAction {
        self.push(false);
        self.frames_since_detection += 1;

        if self.frames_since_detection > self.config.max_frames_without_detection {
            if self.state != LossState::Lost {
                warn!(
                    "❌ Target lost after {} frames without detection",
                    self.frames_since_detection
                );
            }
            self.state = LossState::Lost;
            return LossAction::FullStop;
        }

        if self.frames_since_detection <= self.config.grace_frames {
            self.state = LossState::BriefLoss;
            return LossAction::HoldPrevious;
        }

        if self.detection_rate() < self.config.search_rate_threshold {
            self.state = LossState::Searching;
            return LossAction::Command(self.search_command(last_center, frame_width));
        }

        // Spotty but not gone: stop and wait rather than wander.
        self.state = LossState::BriefLoss;
        LossAction::Command(ControlOutput::stop())
    }

    pub fn detection_rate(&self) -> f32 {
        if self.history.is_empty() {
            return 1.0;
        }
        let hits = self.history.iter().filter(|&&d| d).count();
        hits as f32 / self.history.len() as f32
    }

    fn search_command(&self, last_center: Option<(f32, f32)>, frame_width: f32) -> ControlOutput {
        if let Some((x, _)) = last_center {
            let offset = x - frame_width / 2.0;
            if offset.abs() > self.config.search_offset_px {
                let turn = if offset > 0.0 {
                    self.config.search_turn_speed
                } else {
                    -self.config.search_turn_speed
                };
                return ControlOutput { forward: 0, turn };
            }
        }
        // Last seen near center (or never seen): spinning would be a guess.
        ControlOutput::stop()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.frames_since_detection = 0;
        self.state = LossState::Tracking;
    }

    fn push(&mut self, detected: bool) {
        if self.history.len() == self.config.history_len {
            self.history.pop_front();
        }
        self.history.push_back(detected);
    }
}
