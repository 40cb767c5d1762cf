// src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub pid: PidConfig,
    pub speeds: SpeedConfig,
    pub step_turn: StepTurnConfig,
    pub loss: LossConfig,
    pub fusion: FusionConfig,
    pub smoothing: SmoothingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Desired target height as a fraction of the frame height.
    pub target_height_pct: f32,
    pub continuity_radius_px: f32,
    pub edge_threshold_px: f32,
    pub x_deadzone_px: f32,
    pub x_deadzone_edge_px: f32,
    pub distance_deadzone_px: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidConfig {
    pub turn: PidGains,
    pub distance: PidGains,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub integral_limit: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedConfig {
    pub max_forward: i32,
    pub max_turn: i32,
    /// Minimum magnitude a nonzero command is bumped to (motor static friction).
    pub min_actuation: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTurnConfig {
    pub enabled: bool,
    pub turn_need_threshold_px: f32,
    pub step_speed: i32,
    pub step_duration_ms: f64,
    pub pause_duration_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossConfig {
    pub history_len: usize,
    pub grace_frames: u32,
    pub search_rate_threshold: f32,
    pub max_frames_without_detection: u32,
    pub search_offset_px: f32,
    pub search_turn_speed: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    pub enabled: bool,
    pub vision_weight: f32,
    pub ultrasonic_weight: f32,
    pub target_distance_cm: f32,
    pub tolerance_cm: f32,
    pub min_safe_distance_cm: f32,
    /// Converts a cm distance error into a speed-scale error for the PID.
    pub cm_to_speed_scale: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    pub history_len: usize,
    pub alpha: f32,
    pub alpha_edge: f32,
    pub max_change_per_tick: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// One captured camera frame. The control loop consumes frames; it never owns
/// the capture pipeline that produces them.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }
}

/// Normalized detection record. Every detector variant (with or without a
/// confidence score) is converted to this shape at the boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: Option<f32>,
}

impl Detection {
    pub fn new(x: f32, y: f32, w: f32, h: f32, confidence: Option<f32>) -> Self {
        Self {
            bbox: BoundingBox { x, y, w, h },
            confidence: confidence.map(|c| c.clamp(0.0, 1.0)),
        }
    }

    pub fn center(&self) -> (f32, f32) {
        self.bbox.center()
    }
}

/// Final motor command for one tick. Positive forward approaches the target,
/// positive turn rotates toward increasing x (right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlOutput {
    pub forward: i32,
    pub turn: i32,
}

impl ControlOutput {
    pub fn stop() -> Self {
        Self { forward: 0, turn: 0 }
    }

    pub fn clamped(self) -> Self {
        Self {
            forward: self.forward.clamp(-100, 100),
            turn: self.turn.clamp(-100, 100),
        }
    }

    pub fn is_stop(&self) -> bool {
        self.forward == 0 && self.turn == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackingMode {
    SensorFusion,
    VisionOnly,
}

impl TrackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SensorFusion => "sensor_fusion",
            Self::VisionOnly => "vision_only",
        }
    }
}

/// Snapshot of the controller state for telemetry. Produced under a brief
/// lock once per tick; never mutated outside the control loop.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingStatus {
    pub tracking: bool,
    pub last_target_center: Option<(f32, f32)>,
    pub target_center: (f32, f32),
    pub frame_size: (u32, u32),
    pub mode: &'static str,
    pub state: &'static str,
    pub frames_dropped: u64,
}

impl TrackingStatus {
    pub fn idle() -> Self {
        Self {
            tracking: false,
            last_target_center: None,
            target_center: (0.0, 0.0),
            frame_size: (0, 0),
            mode: TrackingMode::VisionOnly.as_str(),
            state: "IDLE",
            frames_dropped: 0,
        }
    }
}
