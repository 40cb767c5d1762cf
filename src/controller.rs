// src/controller.rs

use crate::estimator::ErrorEstimator;
use crate::frame_slot::FrameSlot;
use crate::fusion::DistanceFuser;
use crate::interface::{Detector, MotorActuator, RangeSensor};
use crate::limits::Limiter;
use crate::loss::{LossAction, LossTracker};
use crate::pid::Pid;
use crate::selector::TargetSelector;
use crate::smoother::MovementSmoother;
use crate::step_turn::{StepPhase, StepTurner};
use crate::types::{Config, ControlOutput, Frame, TrackingStatus};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const IDLE_POLL: Duration = Duration::from_millis(5);

/// Closed-loop target follower. Consumes the freshest frame each tick, runs
/// the selection/estimation/control pipeline and issues exactly one actuator
/// command per tick.
pub struct TrackingController {
    config: Config,
    detector: Box<dyn Detector>,
    actuator: Box<dyn MotorActuator>,
    range_sensor: Option<Box<dyn RangeSensor>>,

    selector: TargetSelector,
    estimator: ErrorEstimator,
    turn_pid: Pid,
    distance_pid: Pid,
    fuser: DistanceFuser,
    limiter: Limiter,
    stepper: StepTurner,
    loss: LossTracker,
    smoother: MovementSmoother,

    last_command: ControlOutput,
    last_center: Option<(f32, f32)>,
    tracking: bool,

    frame_slot: Arc<FrameSlot>,
    cancel: Arc<AtomicBool>,
    status: Arc<Mutex<TrackingStatus>>,
}

impl TrackingController {
    pub fn new(
        config: Config,
        detector: Box<dyn Detector>,
        actuator: Box<dyn MotorActuator>,
        range_sensor: Option<Box<dyn RangeSensor>>,
        frame_slot: Arc<FrameSlot>,
    ) -> Self {
        Self {
            selector: TargetSelector::new(config.tracking.clone()),
            estimator: ErrorEstimator::new(config.tracking.clone()),
            turn_pid: Pid::new(config.pid.turn),
            distance_pid: Pid::new(config.pid.distance),
            fuser: DistanceFuser::new(config.fusion.clone()),
            limiter: Limiter::new(config.tracking.clone(), config.speeds.clone()),
            stepper: StepTurner::new(config.step_turn.clone()),
            loss: LossTracker::new(config.loss.clone()),
            smoother: MovementSmoother::new(config.smoothing.clone()),
            config,
            detector,
            actuator,
            range_sensor,
            last_command: ControlOutput::stop(),
            last_center: None,
            tracking: false,
            frame_slot,
            cancel: Arc::new(AtomicBool::new(false)),
            status: Arc::new(Mutex::new(TrackingStatus::idle())),
        }
    }

    /// Handle for requesting cancellation from another thread.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Shared telemetry snapshot, refreshed once per tick.
    pub fn status_handle(&self) -> Arc<Mutex<TrackingStatus>> {
        Arc::clone(&self.status)
    }

    /// Drive the control loop until cancelled. Always leaves the motors
    /// stopped, even when a tick fails.
    pub fn run(&mut self) -> Result<()> {
        info!("▶️ Tracking started");
        self.tracking = true;

        let result = loop {
            if self.cancel.load(Ordering::Relaxed) {
                info!("⏹️ Cancellation requested");
                break Ok(());
            }
            match self.frame_slot.take() {
                Some(frame) => {
                    if let Err(e) = self.tick(&frame) {
                        break Err(e);
                    }
                }
                None => std::thread::sleep(IDLE_POLL),
            }
        };

        self.stop()?;
        result
    }

    /// One control tick over a frame. Returns the command that reached the
    /// actuator.
    pub fn tick(&mut self, frame: &Frame) -> Result<ControlOutput> {
        let detections = match self.detector.detect(frame) {
            Ok(d) => d,
            Err(e) => {
                warn!("⚠️ Detector error, treating frame as empty: {:#}", e);
                Vec::new()
            }
        };

        let (fw, fh) = (frame.width as f32, frame.height as f32);
        let target = self.selector.select(&detections, self.last_center, fw, fh);

        // One sensor sample per tick; fusion, the safety floor and the status
        // snapshot all see the same reading.
        let ultrasonic = self.range_sensor.as_mut().and_then(|s| s.smoothed_distance_cm());

        let command = match target {
            Some(det) => {
                self.loss.record_detection();
                self.track_tick(&det, fw, fh, frame.timestamp_ms, ultrasonic)
            }
            None => match self.loss.record_miss(self.last_center, fw) {
                LossAction::HoldPrevious => self.last_command,
                LossAction::Command(cmd) => cmd,
                LossAction::FullStop => {
                    self.reset_motion_state();
                    ControlOutput::stop()
                }
            },
        };

        let command = self.apply_safety_floor(command, ultrasonic);
        self.emit(command)?;
        self.last_command = command;
        self.update_status(frame, target.map(|d| d.center()), ultrasonic);
        Ok(command)
    }

    /// Control pipeline for a tick with a selected target.
    fn track_tick(
        &mut self,
        det: &crate::types::Detection,
        frame_width: f32,
        frame_height: f32,
        now_ms: f64,
        ultrasonic: Option<f32>,
    ) -> ControlOutput {
        let err = self.estimator.estimate(det, frame_width, frame_height);
        self.last_center = Some(err.center);

        // Distance error in cm when a range reading is available, px otherwise.
        let (distance_error, distance_deadzone) = if self.config.fusion.enabled {
            let est = self.fuser.fuse(err.bbox_height, ultrasonic);
            debug!(
                "📏 distance vision={:.0}cm fused={:.0}cm target={:.0}cm",
                est.vision_cm, est.fused_cm, est.target_cm
            );
            if ultrasonic.is_some() {
                (
                    est.error_cm() * self.config.fusion.cm_to_speed_scale,
                    est.tolerance_cm * self.config.fusion.cm_to_speed_scale,
                )
            } else {
                (err.distance_px, self.limiter.distance_deadzone_px())
            }
        } else {
            (err.distance_px, self.limiter.distance_deadzone_px())
        };

        let raw_turn = self.turn_pid.update(err.horizontal_px);
        let raw_forward = self.distance_pid.update(distance_error);

        let (forward_scale, turn_scale) = crate::scaler::output_scales(err.center_factor, err.at_edge);
        let turn = self
            .limiter
            .apply_turn_deadzone(raw_turn * turn_scale, err.horizontal_px, err.at_edge);
        let forward = self
            .limiter
            .apply_forward_deadzone(raw_forward * forward_scale, distance_error, distance_deadzone);

        let turn = self.limiter.clamp_turn(turn);
        let forward = self.limiter.clamp_forward(forward);

        let turn = self.stepper.update(turn, err.horizontal_px, now_ms);

        let smoothed = self
            .smoother
            .smooth(ControlOutput { forward, turn }, err.at_edge);

        // No actuation bump on the turn axis mid-pause: the smoothed residue
        // must taper to 0 so the platform actually holds still between steps.
        let turn = if self.stepper.phase() == StepPhase::Pausing {
            smoothed.turn
        } else {
            self.limiter.enforce_min_actuation(smoothed.turn)
        };

        ControlOutput {
            forward: self.limiter.enforce_min_actuation(smoothed.forward),
            turn,
        }
    }

    /// Hard range floor. Applied after every other stage so no amount of
    /// smoothing or actuation bumping can push the platform closer than the
    /// safe distance.
    fn apply_safety_floor(&self, command: ControlOutput, reading: Option<f32>) -> ControlOutput {
        if self.fuser.too_close(reading) && command.forward > 0 {
            warn!("🛑 Range below safety floor, forward motion blocked");
            ControlOutput { forward: 0, turn: command.turn }
        } else {
            command
        }
    }

    /// The single actuator call of the tick. A fault gets one stop attempt
    /// before propagating; tracking is disabled either way.
    fn emit(&mut self, command: ControlOutput) -> Result<()> {
        let command = command.clamped();
        if let Err(e) = self.actuator.move_with_turn(command.forward, command.turn) {
            self.tracking = false;
            if let Err(stop_err) = self.actuator.stop() {
                warn!("⚠️ Stop after actuator fault also failed: {:#}", stop_err);
            }
            return Err(e).context("Actuator fault, tracking halted");
        }
        Ok(())
    }

    /// Idempotent full stop: zero command, complete internal reset.
    pub fn stop(&mut self) -> Result<()> {
        self.actuator.stop().context("Failed to stop motors")?;
        self.reset_motion_state();
        self.loss.reset();
        self.last_center = None;
        self.tracking = false;
        *self.status.lock() = TrackingStatus::idle();
        Ok(())
    }

    fn reset_motion_state(&mut self) {
        self.turn_pid.reset();
        self.distance_pid.reset();
        self.smoother.clear();
        self.stepper.reset();
        self.last_command = ControlOutput::stop();
    }

    fn update_status(
        &mut self,
        frame: &Frame,
        target_center: Option<(f32, f32)>,
        ultrasonic: Option<f32>,
    ) {
        let mode = self.fuser.mode(ultrasonic);

        let mut status = self.status.lock();
        status.tracking = target_center.is_some();
        status.last_target_center = self.last_center;
        status.target_center = target_center.unwrap_or((0.0, 0.0));
        status.frame_size = (frame.width, frame.height);
        status.mode = mode.as_str();
        status.state = self.loss.state().as_str();
        status.frames_dropped = self.frame_slot.frames_dropped();
    }
}
