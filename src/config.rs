// src/config.rs

use crate::types::{Config, PidGains};
use anyhow::{bail, Context, Result};
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config: Config = serde_yaml::from_str(&contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects invalid configurations at construction time. Nothing is
    /// silently clamped into a plausible-looking value.
    pub fn validate(&self) -> Result<()> {
        if self.tracking.target_height_pct <= 0.0 || self.tracking.target_height_pct >= 1.0 {
            bail!(
                "target_height_pct must be in (0, 1), got {}",
                self.tracking.target_height_pct
            );
        }
        if self.tracking.continuity_radius_px <= 0.0 {
            bail!("continuity_radius_px must be positive");
        }
        if self.tracking.edge_threshold_px < 0.0
            || self.tracking.x_deadzone_px < 0.0
            || self.tracking.x_deadzone_edge_px < 0.0
            || self.tracking.distance_deadzone_px < 0.0
        {
            bail!("thresholds and deadzones must be non-negative");
        }

        validate_gains("pid.turn", &self.pid.turn)?;
        validate_gains("pid.distance", &self.pid.distance)?;

        if self.speeds.max_forward <= 0 || self.speeds.max_forward > 100 {
            bail!("max_forward must be in 1..=100, got {}", self.speeds.max_forward);
        }
        if self.speeds.max_turn <= 0 || self.speeds.max_turn > 100 {
            bail!("max_turn must be in 1..=100, got {}", self.speeds.max_turn);
        }
        if self.speeds.min_actuation < 0 || self.speeds.min_actuation > self.speeds.max_forward {
            bail!("min_actuation must be in 0..=max_forward");
        }

        if self.step_turn.step_duration_ms <= 0.0 || self.step_turn.pause_duration_ms <= 0.0 {
            bail!("step/pause durations must be positive");
        }
        if self.step_turn.step_speed <= 0 || self.step_turn.step_speed > self.speeds.max_turn {
            bail!("step_speed must be in 1..=max_turn");
        }
        if self.step_turn.turn_need_threshold_px < 0.0 {
            bail!("turn_need_threshold_px must be non-negative");
        }

        if self.loss.history_len == 0 {
            bail!("loss.history_len must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.loss.search_rate_threshold) {
            bail!("search_rate_threshold must be in [0, 1]");
        }
        if self.loss.max_frames_without_detection <= self.loss.grace_frames {
            bail!("max_frames_without_detection must exceed grace_frames");
        }
        if self.loss.search_turn_speed <= 0 || self.loss.search_turn_speed > self.speeds.max_turn {
            bail!("search_turn_speed must be in 1..=max_turn");
        }

        let weight_sum = self.fusion.vision_weight + self.fusion.ultrasonic_weight;
        if (weight_sum - 1.0).abs() > 1e-3 {
            bail!("fusion weights must sum to 1.0, got {}", weight_sum);
        }
        if self.fusion.vision_weight < 0.0 || self.fusion.ultrasonic_weight < 0.0 {
            bail!("fusion weights must be non-negative");
        }
        if self.fusion.target_distance_cm <= 0.0
            || self.fusion.tolerance_cm < 0.0
            || self.fusion.min_safe_distance_cm < 0.0
        {
            bail!("fusion distances must be positive");
        }

        if !(2..=5).contains(&self.smoothing.history_len) {
            bail!("smoothing.history_len must be in 2..=5, got {}", self.smoothing.history_len);
        }
        if !(0.0..=1.0).contains(&self.smoothing.alpha) || !(0.0..=1.0).contains(&self.smoothing.alpha_edge)
        {
            bail!("smoothing alphas must be in [0, 1]");
        }
        if self.smoothing.max_change_per_tick <= 0 {
            bail!("max_change_per_tick must be positive");
        }

        Ok(())
    }
}

fn validate_gains(name: &str, gains: &PidGains) -> Result<()> {
    for (label, v) in [("kp", gains.kp), ("ki", gains.ki), ("kd", gains.kd)] {
        if !v.is_finite() || v < 0.0 {
            bail!("{}.{} must be a non-negative finite number, got {}", name, label, v);
        }
    }
    if !gains.integral_limit.is_finite() || gains.integral_limit <= 0.0 {
        bail!("{}.integral_limit must be positive", name);
    }
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use crate::types::*;

    pub fn test_config() -> Config {
        Config {
            tracking: TrackingConfig {
                target_height_pct: 0.25,
                continuity_radius_px: 120.0,
                edge_threshold_px: 80.0,
                x_deadzone_px: 40.0,
                x_deadzone_edge_px: 55.0,
                distance_deadzone_px: 20.0,
            },
            pid: PidConfig {
                turn: PidGains { kp: 0.25, ki: 0.01, kd: 0.08, integral_limit: 100.0 },
                distance: PidGains { kp: 0.20, ki: 0.005, kd: 0.05, integral_limit: 100.0 },
            },
            speeds: SpeedConfig { max_forward: 50, max_turn: 35, min_actuation: 8 },
            step_turn: StepTurnConfig {
                enabled: true,
                turn_need_threshold_px: 60.0,
                step_speed: 14,
                step_duration_ms: 400.0,
                pause_duration_ms: 250.0,
            },
            loss: LossConfig {
                history_len: 5,
                grace_frames: 3,
                search_rate_threshold: 0.25,
                max_frames_without_detection: 8,
                search_offset_px: 80.0,
                search_turn_speed: 15,
            },
            fusion: FusionConfig {
                enabled: true,
                vision_weight: 0.6,
                ultrasonic_weight: 0.4,
                target_distance_cm: 80.0,
                tolerance_cm: 15.0,
                min_safe_distance_cm: 30.0,
                cm_to_speed_scale: 2.0,
            },
            smoothing: SmoothingConfig {
                history_len: 5,
                alpha: 0.7,
                alpha_edge: 0.85,
                max_change_per_tick: 10,
            },
            logging: LoggingConfig { level: "info".to_string() },
        }
    }

    #[test]
    fn test_valid_config_accepted() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_max_speed() {
        let mut config = test_config();
        config.speeds.max_forward = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.speeds.max_turn = 120;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_fusion_weights() {
        let mut config = test_config();
        config.fusion.vision_weight = 0.6;
        config.fusion.ultrasonic_weight = 0.6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_gain() {
        let mut config = test_config();
        config.pid.turn.kp = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_target_height_pct() {
        let mut config = test_config();
        config.tracking.target_height_pct = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_grace_exceeding_max_loss() {
        let mut config = test_config();
        config.loss.grace_frames = 10;
        config.loss.max_frames_without_detection = 8;
        assert!(config.validate().is_err());
    }
}
