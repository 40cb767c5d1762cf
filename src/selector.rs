// src/selector.rs

use crate::types::{Detection, TrackingConfig};

// ==================== SCORING WEIGHTS ====================
const WEIGHT_CLOSENESS: f32 = 0.4;
const WEIGHT_AREA: f32 = 0.4;
const WEIGHT_CONFIDENCE: f32 = 0.2;
const CLOSENESS_FALLOFF_PX: f32 = 100.0;
const DEFAULT_CONFIDENCE: f32 = 1.0;

/// Picks which detection to follow when the detector returns several.
///
/// Continuity wins over attractiveness: if any candidate is within the
/// continuity radius of the previously tracked center, the nearest such
/// candidate is kept even when a larger or closer target appears.
pub struct TargetSelector {
    config: TrackingConfig,
}

impl TargetSelector {
    pub fn new(config: TrackingConfig) -> Self {
        Self { config }
    }

    pub fn select(
        &self,
        detections: &[Detection],
        last_center: Option<(f32, f32)>,
        frame_width: f32,
        frame_height: f32,
    ) -> Option<Detection> {
        match detections {
            [] => None,
            [single] => Some(*single),
            many => {
                if let Some(last) = last_center {
                    if let Some(continued) = self.nearest_within_radius(many, last) {
                        return Some(continued);
                    }
                }
                Some(self.best_scored(many, last_center, frame_width, frame_height))
            }
        }
    }

    fn nearest_within_radius(
        &self,
        detections: &[Detection],
        last: (f32, f32),
    ) -> Option<Detection> {
        let mut best: Option<(f32, Detection)> = None;
        for det in detections {
            let d = distance(det.center(), last);
            if d <= self.config.continuity_radius_px {
                match best {
                    Some((best_d, _)) if d >= best_d => {}
                    _ => best = Some((d, *det)),
                }
            }
        }
        best.map(|(_, det)| det)
    }

    fn best_scored(
        &self,
        detections: &[Detection],
        last_center: Option<(f32, f32)>,
        frame_width: f32,
        frame_height: f32,
    ) -> Detection {
        let frame_center = (frame_width / 2.0, frame_height / 2.0);
        let anchor = last_center.unwrap_or(frame_center);
        let frame_area = frame_width * frame_height;

        let mut best = detections[0];
        let mut best_score = self.score(&best, anchor, frame_area);
        // Strict greater-than keeps the earliest candidate on ties.
        for det in &detections[1..] {
            let score = self.score(det, anchor, frame_area);
            if score > best_score {
                best = *det;
                best_score = score;
            }
        }
        best
    }

    fn score(&self, det: &Detection, anchor: (f32, f32), frame_area: f32) -> f32 {
        let closeness = 1.0 / (1.0 + distance(det.center(), anchor) / CLOSENESS_FALLOFF_PX);
        let area = (det.bbox.area() / frame_area).clamp(0.0, 1.0);
        let confidence = det.confidence.unwrap_or(DEFAULT_CONFIDENCE);

        WEIGHT_CLOSENESS * closeness + WEIGHT_AREA * area + WEIGHT_CONFIDENCE * confidence
    }
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use crate::types::Detection;

    fn selector() -> TargetSelector {
        TargetSelector::new(test_config().tracking)
    }

    #[test]
    fn test_empty_input_selects_nothing() {
        assert!(selector().select(&[], None, 640.0, 480.0).is_none());
    }

    #[test]
    fn test_single_detection_always_selected() {
        let det = Detection::new(10.0, 10.0, 50.0, 100.0, None);
        let picked = selector().select(&[det], None, 640.0, 480.0).unwrap();
        assert_eq!(picked, det);
    }

    #[test]
    fn test_continuity_beats_bigger_target() {
        // Previously tracked near (100, 200). A much larger detection far away
        // must not steal the track while a candidate stays within the radius.
        let near_last = Detection::new(80.0, 150.0, 40.0, 90.0, Some(0.5));
        let big_far = Detection::new(500.0, 100.0, 120.0, 260.0, Some(0.95));

        let picked = selector()
            .select(&[big_far, near_last], Some((100.0, 200.0)), 640.0, 480.0)
            .unwrap();
        assert_eq!(picked, near_last);
    }

    #[test]
    fn test_weighted_score_when_continuity_broken() {
        // Last center too far from everything: bigger and more confident wins.
        let small = Detection::new(10.0, 10.0, 20.0, 40.0, Some(0.3));
        let large = Detection::new(30.0, 30.0, 100.0, 220.0, Some(0.9));

        let picked = selector()
            .select(&[small, large], Some((600.0, 460.0)), 640.0, 480.0)
            .unwrap();
        assert_eq!(picked, large);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let first = Detection::new(100.0, 100.0, 50.0, 100.0, Some(0.8));
        let twin = Detection::new(100.0, 100.0, 50.0, 100.0, Some(0.8));

        let picked = selector().select(&[first, twin], None, 640.0, 480.0).unwrap();
        assert_eq!(picked, first);
    }

    #[test]
    fn test_missing_confidence_defaults_high() {
        // A scoreless detector should not be penalized against a scored one.
        let unscored = Detection::new(300.0, 200.0, 60.0, 120.0, None);
        let low_scored = Detection::new(300.0, 200.0, 60.0, 120.0, Some(0.2));

        let picked = selector()
            .select(&[low_scored, unscored], None, 640.0, 480.0)
            .unwrap();
        assert_eq!(picked, unscored);
    }
}
