// src/pid.rs

use crate::types::PidGains;

/// Discrete PID over per-tick samples. Ticks are treated as uniform, so no
/// dt enters the integral or derivative terms.
pub struct Pid {
    gains: PidGains,
    integral: f32,
    prev_error: Option<f32>,
}

impl Pid {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            prev_error: None,
        }
    }

    /// One controller step. The derivative is 0 on the first sample after a
    /// reset, so a reacquired target never gets a kick from stale state.
    pub fn update(&mut self, error: f32) -> f32 {
        self.integral = (self.integral + error)
            .clamp(-self.gains.integral_limit, self.gains.integral_limit);

        let derivative = match self.prev_error {
            Some(prev) => error - prev,
            None => 0.0,
        };
        self.prev_error = Some(error);

        self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }
}
