// src/estimator.rs

use crate::types::{Detection, TrackingConfig};

/// Pixel-space tracking errors for one tick.
#[derive(Debug, Clone, Copy)]
pub struct TrackingError {
    /// Signed horizontal offset from frame center. Positive = target right.
    pub horizontal_px: f32,
    /// Desired bbox height minus observed height. Positive = target too far.
    pub distance_px: f32,
    pub at_edge: bool,
    /// |horizontal| normalized by the half frame width, in [0, 1].
    pub center_factor: f32,
    pub center: (f32, f32),
    pub bbox_height: f32,
}

pub struct ErrorEstimator {
    config: TrackingConfig,
}

impl ErrorEstimator {
    pub fn new(config: TrackingConfig) -> Self {
        Self { config }
    }

    pub fn estimate(
        &self,
        detection: &Detection,
        frame_width: f32,
        frame_height: f32,
    ) -> TrackingError {
        let center = detection.center();
        let horizontal_px = center.0 - frame_width / 2.0;

        let desired_height = self.config.target_height_pct * frame_height;
        let distance_px = desired_height - detection.bbox.h;

        let at_edge = center.0 < self.config.edge_threshold_px
            || center.0 > frame_width - self.config.edge_threshold_px;

        let center_factor = (horizontal_px.abs() / (frame_width / 2.0)).clamp(0.0, 1.0);

        TrackingError {
            horizontal_px,
            distance_px,
            at_edge,
            center_factor,
            center,
            bbox_height: detection.bbox.h,
        }
    }
}
