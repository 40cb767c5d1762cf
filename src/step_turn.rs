// src/step_turn.rs

use crate::types::StepTurnConfig;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Idle,
    Stepping,
    Pausing,
}

/// Converts a continuous turn request into discrete step/pause cycles so the
/// camera gets still frames between rotations. Direction changes always pass
/// through a pause; the platform never reverses rotation mid-step.
pub struct StepTurner {
    config: StepTurnConfig,
    phase: StepPhase,
    direction: i32,
    phase_start_ms: f64,
}

impl StepTurner {
    pub fn new(config: StepTurnConfig) -> Self {
        Self {
            config,
            phase: StepPhase::Idle,
            direction: 0,
            phase_start_ms: 0.0,
        }
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// One tick of the discretizer. `requested_turn` is the smoothly-scaled
    /// turn command; `horizontal_error` gates whether stepping is warranted
    /// at all. Passthrough when disabled.
    pub fn update(&mut self, requested_turn: i32, horizontal_error: f32, now_ms: f64) -> i32 {
        if !self.config.enabled {
            return requested_turn;
        }

        let wanted_direction = requested_turn.signum();
        let turn_needed = wanted_direction != 0
            && horizontal_error.abs() >= self.config.turn_need_threshold_px;

        match self.phase {
            StepPhase::Idle => {
                if turn_needed {
                    self.start_step(wanted_direction, now_ms);
                    self.direction * self.config.step_speed
                } else {
                    0
                }
            }
            StepPhase::Stepping => {
                let elapsed = now_ms - self.phase_start_ms;
                if elapsed >= self.config.step_duration_ms {
                    debug!("↩️ Step done, pausing");
                    self.phase = StepPhase::Pausing;
                    self.phase_start_ms = now_ms;
                    0
                } else {
                    // Direction holds for the whole step even if the request
                    // flips mid-step.
                    self.direction * self.config.step_speed
                }
            }
            StepPhase::Pausing => {
                let elapsed = now_ms - self.phase_start_ms;
                if elapsed < self.config.pause_duration_ms {
                    0
                } else if turn_needed {
                    self.start_step(wanted_direction, now_ms);
                    self.direction * self.config.step_speed
                } else {
                    self.phase = StepPhase::Idle;
                    self.direction = 0;
                    0
                }
            }
        }
    }

    fn start_step(&mut self, direction: i32, now_ms: f64) {
        debug!(
            "↪️ Step turn {} for {}ms",
            if direction > 0 { "right" } else { "left" },
            self.config.step_duration_ms
        );
        self.phase = StepPhase::Stepping;
        self.direction = direction;
        self.phase_start_ms = now_ms;
    }

    pub fn reset(&mut self) {
        self.phase = StepPhase::Idle;
        self.direction = 0;
        self.phase_start_ms = 0.0;
    }
}
