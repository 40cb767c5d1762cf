// src/fusion.rs

use crate::types::{FusionConfig, TrackingMode};
use tracing::warn;

/// Fused distance picture for one tick.
#[derive(Debug, Clone, Copy)]
pub struct DistanceEstimate {
    pub vision_cm: f32,
    pub ultrasonic_cm: Option<f32>,
    pub fused_cm: f32,
    pub target_cm: f32,
    pub tolerance_cm: f32,
}

impl DistanceEstimate {
    /// Signed error in cm. Positive = too far, matching the pixel convention.
    pub fn error_cm(&self) -> f32 {
        self.fused_cm - self.target_cm
    }
}

/// Blends the monocular height-based estimate with ultrasonic ranging.
/// Falls back to vision-only when the sensor goes quiet.
pub struct DistanceFuser {
    config: FusionConfig,
    fallback_warned: bool,
}

impl DistanceFuser {
    pub fn new(config: FusionConfig) -> Self {
        Self {
            config,
            fallback_warned: false,
        }
    }

    pub fn fuse(&mut self, bbox_height: f32, ultrasonic_cm: Option<f32>) -> DistanceEstimate {
        let vision_cm = vision_distance_cm(bbox_height);

        let fused_cm = match ultrasonic_cm {
            Some(us) => {
                self.fallback_warned = false;
                self.config.vision_weight * vision_cm + self.config.ultrasonic_weight * us
            }
            None => {
                if !self.fallback_warned {
                    warn!("📏 No ultrasonic reading, falling back to vision-only distance");
                    self.fallback_warned = true;
                }
                vision_cm
            }
        };

        DistanceEstimate {
            vision_cm,
            ultrasonic_cm,
            fused_cm,
            target_cm: self.config.target_distance_cm,
            tolerance_cm: self.config.tolerance_cm,
        }
    }

    pub fn mode(&self, ultrasonic_cm: Option<f32>) -> TrackingMode {
        if self.config.enabled && ultrasonic_cm.is_some() {
            TrackingMode::SensorFusion
        } else {
            TrackingMode::VisionOnly
        }
    }

    /// True when the range reading demands the hard forward stop.
    pub fn too_close(&self, ultrasonic_cm: Option<f32>) -> bool {
        matches!(ultrasonic_cm, Some(d) if d < self.config.min_safe_distance_cm)
    }
}

/// Monocular distance from bbox height, calibrated stepwise against a
/// person-sized target.
fn vision_distance_cm(bbox_height: f32) -> f32 {
    if bbox_height > 200.0 {
        60.0
    } else if bbox_height > 150.0 {
        80.0
    } else if bbox_height > 100.0 {
        120.0
    } else if bbox_height > 60.0 {
        160.0
    } else {
        200.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    fn fuser() -> DistanceFuser {
        DistanceFuser::new(test_config().fusion)
    }

    #[test]
    fn test_vision_calibration_table() {
        assert_eq!(vision_distance_cm(250.0), 60.0);
        assert_eq!(vision_distance_cm(180.0), 80.0);
        assert_eq!(vision_distance_cm(120.0), 120.0);
        assert_eq!(vision_distance_cm(80.0), 160.0);
        assert_eq!(vision_distance_cm(40.0), 200.0);
    }

    #[test]
    fn test_weighted_fusion() {
        // vision 120 cm (h in 100..150), ultrasonic 80 cm:
        // 0.6 * 120 + 0.4 * 80 = 104.
        let est = fuser().fuse(120.0, Some(80.0));
        assert!((est.fused_cm - 104.0).abs() < 1e-5);
        assert_eq!(est.vision_cm, 120.0);
    }

    #[test]
    fn test_vision_only_fallback() {
        let est = fuser().fuse(120.0, None);
        assert_eq!(est.fused_cm, 120.0);
        assert_eq!(est.ultrasonic_cm, None);
    }

    #[test]
    fn test_mode_reflects_sensor_presence() {
        let f = fuser();
        assert_eq!(f.mode(Some(90.0)), TrackingMode::SensorFusion);
        assert_eq!(f.mode(None), TrackingMode::VisionOnly);
    }

    #[test]
    fn test_too_close_threshold() {
        let f = fuser();
        assert!(f.too_close(Some(29.9)));
        assert!(!f.too_close(Some(30.0)));
        assert!(!f.too_close(None));
    }

    #[test]
    fn test_error_sign_convention() {
        // Fused 104 cm against an 80 cm setpoint: positive, too far, and
        // outside the 15 cm tolerance band.
        let est = fuser().fuse(120.0, Some(80.0));
        assert!(est.error_cm() > 0.0);
        assert!(est.error_cm().abs() > est.tolerance_cm);
    }
}
