// src/scaler.rs

// ==================== CENTERING BANDS ====================
// Scaling is graded by how far off-center the target sits. Centering takes
// priority over approach: a target near the frame edge gets turn authority
// boosted and forward speed cut, so it is recentered before being chased.
const EDGE_TURN_SCALE: f32 = 1.5;
const EDGE_FORWARD_SCALE: f32 = 0.1;

const FAR_OFF_CENTER: f32 = 0.5;
const FAR_TURN_SCALE: f32 = 1.1;
const FAR_FORWARD_SCALE: f32 = 0.1;

const MID_OFF_CENTER: f32 = 0.3;
const MID_TURN_SCALE: f32 = 1.0;
const MID_FORWARD_SCALE: f32 = 0.4;

const NEAR_TURN_SCALE: f32 = 0.6;
const NEAR_FORWARD_SCALE: f32 = 1.0;

/// (forward_scale, turn_scale) multipliers applied to the raw PID outputs.
pub fn output_scales(center_factor: f32, at_edge: bool) -> (f32, f32) {
    if at_edge {
        (EDGE_FORWARD_SCALE, EDGE_TURN_SCALE)
    } else if center_factor > FAR_OFF_CENTER {
        (FAR_FORWARD_SCALE, FAR_TURN_SCALE)
    } else if center_factor >= MID_OFF_CENTER {
        (MID_FORWARD_SCALE, MID_TURN_SCALE)
    } else {
        (NEAR_FORWARD_SCALE, NEAR_TURN_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_dominates_center_factor() {
        // Even a nearly centered target at the edge band gets edge scaling.
        assert_eq!(output_scales(0.1, true), (0.1, 1.5));
    }

    #[test]
    fn test_bands_by_center_factor() {
        assert_eq!(output_scales(0.8, false), (0.1, 1.1));
        assert_eq!(output_scales(0.4, false), (0.4, 1.0));
        assert_eq!(output_scales(0.1, false), (1.0, 0.6));
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(output_scales(0.5, false), (0.4, 1.0));
        assert_eq!(output_scales(0.3, false), (0.4, 1.0));
    }

    #[test]
    fn test_centered_target_favors_forward() {
        let (forward, turn) = output_scales(0.0, false);
        assert!(forward > turn);
    }
}
