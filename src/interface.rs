// src/interface.rs

use crate::types::{Detection, Frame};
use anyhow::Result;
use tracing::info;

/// Produces target detections for one frame. Implementations own the whole
/// perception stack; the controller only sees normalized records.
pub trait Detector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;
}

/// Low-level drive interface. Commands are differential: forward in
/// [-100, 100], turn in [-100, 100] (positive = right).
pub trait MotorActuator: Send {
    fn move_with_turn(&mut self, forward: i32, turn: i32) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

/// Ultrasonic (or equivalent) ranging. Returns a smoothed reading in cm,
/// or None when no echo is available.
pub trait RangeSensor: Send {
    fn smoothed_distance_cm(&mut self) -> Option<f32>;
}

/// Bench actuator: logs every command instead of driving hardware.
pub struct SimulatedMotor {
    last_command: (i32, i32),
}

impl SimulatedMotor {
    pub fn new() -> Self {
        info!("🔧 Motor in simulation mode, commands will be logged only");
        Self { last_command: (0, 0) }
    }
}

impl MotorActuator for SimulatedMotor {
    fn move_with_turn(&mut self, forward: i32, turn: i32) -> Result<()> {
        if (forward, turn) != self.last_command {
            info!("🚗 [SIM] forward={} turn={}", forward, turn);
        }
        self.last_command = (forward, turn);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.last_command != (0, 0) {
            info!("🛑 [SIM] stop");
        }
        self.last_command = (0, 0);
        Ok(())
    }
}
