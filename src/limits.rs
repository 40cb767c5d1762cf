// src/limits.rs

use crate::types::{SpeedConfig, TrackingConfig};

pub struct Limiter {
    tracking: TrackingConfig,
    speeds: SpeedConfig,
}

impl Limiter {
    pub fn new(tracking: TrackingConfig, speeds: SpeedConfig) -> Self {
        Self { tracking, speeds }
    }

    /// Zero the turn command inside the horizontal deadzone. The edge band
    /// uses a wider deadzone so the controller stops fighting small errors
    /// while the target is being recentered.
    pub fn apply_turn_deadzone(&self, turn: f32, horizontal_error: f32, at_edge: bool) -> f32 {
        let deadzone = if at_edge {
            self.tracking.x_deadzone_edge_px
        } else {
            self.tracking.x_deadzone_px
        };
        if horizontal_error.abs() < deadzone {
            0.0
        } else {
            turn
        }
    }

    /// Zero the forward command when the distance error is within tolerance.
    /// The deadzone value is in px or cm depending on the active mode; the
    /// caller supplies the matching pair.
    pub fn apply_forward_deadzone(&self, forward: f32, distance_error: f32, deadzone: f32) -> f32 {
        if distance_error.abs() < deadzone {
            0.0
        } else {
            forward
        }
    }

    pub fn distance_deadzone_px(&self) -> f32 {
        self.tracking.distance_deadzone_px
    }

    pub fn clamp_forward(&self, forward: f32) -> i32 {
        (forward.round() as i32).clamp(-self.speeds.max_forward, self.speeds.max_forward)
    }

    pub fn clamp_turn(&self, turn: f32) -> i32 {
        (turn.round() as i32).clamp(-self.speeds.max_turn, self.speeds.max_turn)
    }

    /// Bump a nonzero command up to the actuation floor, preserving sign.
    /// Applied after smoothing so the command that reaches the motors is
    /// never too weak to overcome static friction.
    pub fn enforce_min_actuation(&self, value: i32) -> i32 {
        if value == 0 || value.abs() >= self.speeds.min_actuation {
            value
        } else {
            self.speeds.min_actuation * value.signum()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    fn limiter() -> Limiter {
        let config = test_config();
        Limiter::new(config.tracking, config.speeds)
    }

    #[test]
    fn test_turn_deadzone_zeroes_small_errors() {
        let l = limiter();
        assert_eq!(l.apply_turn_deadzone(12.0, 39.9, false), 0.0);
        assert_eq!(l.apply_turn_deadzone(12.0, 40.0, false), 12.0);
        assert_eq!(l.apply_turn_deadzone(-12.0, -39.9, false), 0.0);
    }

    #[test]
    fn test_edge_deadzone_is_wider() {
        let l = limiter();
        assert_eq!(l.apply_turn_deadzone(12.0, 50.0, false), 12.0);
        assert_eq!(l.apply_turn_deadzone(12.0, 50.0, true), 0.0);
        assert_eq!(l.apply_turn_deadzone(12.0, 55.0, true), 12.0);
    }

    #[test]
    fn test_forward_deadzone() {
        let l = limiter();
        assert_eq!(l.apply_forward_deadzone(20.0, 15.0, 20.0), 0.0);
        assert_eq!(l.apply_forward_deadzone(20.0, 25.0, 20.0), 20.0);
    }

    #[test]
    fn test_clamping_to_configured_maxima() {
        let l = limiter();
        assert_eq!(l.clamp_forward(200.0), 50);
        assert_eq!(l.clamp_forward(-200.0), -50);
        assert_eq!(l.clamp_turn(99.0), 35);
        assert_eq!(l.clamp_turn(-99.0), -35);
        assert_eq!(l.clamp_forward(12.4), 12);
    }

    #[test]
    fn test_min_actuation_preserves_sign_and_zero() {
        let l = limiter();
        assert_eq!(l.enforce_min_actuation(0), 0);
        assert_eq!(l.enforce_min_actuation(3), 8);
        assert_eq!(l.enforce_min_actuation(-3), -8);
        assert_eq!(l.enforce_min_actuation(8), 8);
        assert_eq!(l.enforce_min_actuation(20), 20);
    }
}
