// src/main.rs

mod config;
mod controller;
mod estimator;
mod frame_slot;
mod fusion;
mod interface;
mod limits;
mod loss;
mod pid;
mod scaler;
mod selector;
mod smoother;
mod step_turn;
mod types;

use crate::controller::TrackingController;
use crate::frame_slot::FrameSlot;
use crate::interface::{Detector, RangeSensor, SimulatedMotor};
use crate::types::{Config, Detection, Frame};
use anyhow::{Context, Result};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_FRAMES: u32 = 300;
const FRAME_INTERVAL_MS: u64 = 33;
const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

/// Bench detector: a single target sweeping from the right edge toward the
/// frame center while growing, as if the platform were catching up.
struct SweepDetector;

impl Detector for SweepDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        let t = (frame.timestamp_ms / 1000.0) as f32;

        // Simulated detector dropout between seconds 4 and 5.
        if (4.0..5.0).contains(&t) {
            return Ok(Vec::new());
        }

        let center_x = 560.0 - 240.0 * (t / 10.0).min(1.0);
        let height = 60.0 + 60.0 * (t / 10.0).min(1.0);
        let width = height * 0.4;
        Ok(vec![Detection::new(
            center_x - width / 2.0,
            240.0 - height / 2.0,
            width,
            height,
            Some(0.9),
        )])
    }
}

/// Bench range sensor: starts far and closes in on the target distance.
struct SimulatedRange {
    distance_cm: f32,
}

impl RangeSensor for SimulatedRange {
    fn smoothed_distance_cm(&mut self) -> Option<f32> {
        if self.distance_cm > 80.0 {
            self.distance_cm -= 0.4;
        }
        Some(self.distance_cm)
    }
}

fn main() -> Result<()> {
    let config = Config::load("config.yaml").context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    info!("🤖 Target follower starting (simulated bench run)");

    let frame_slot = Arc::new(FrameSlot::new());
    let mut controller = TrackingController::new(
        config,
        Box::new(SweepDetector),
        Box::new(SimulatedMotor::new()),
        Some(Box::new(SimulatedRange { distance_cm: 180.0 })),
        Arc::clone(&frame_slot),
    );

    let cancel = controller.cancel_handle();
    let status = controller.status_handle();

    // Capture thread: publishes synthetic frames at ~30 fps, then cancels.
    let capture = std::thread::spawn({
        let frame_slot = Arc::clone(&frame_slot);
        let cancel = Arc::clone(&cancel);
        move || {
            for i in 0..DEMO_FRAMES {
                frame_slot.publish(Frame {
                    data: Vec::new(),
                    width: FRAME_WIDTH,
                    height: FRAME_HEIGHT,
                    timestamp_ms: (i as u64 * FRAME_INTERVAL_MS) as f64,
                });
                if i % 30 == 0 {
                    if let Ok(line) = serde_json::to_string(&*status.lock()) {
                        info!("📊 {}", line);
                    }
                }
                std::thread::sleep(Duration::from_millis(FRAME_INTERVAL_MS));
            }
            cancel.store(true, Ordering::Relaxed);
        }
    });

    controller.run()?;
    let _ = capture.join();

    info!(
        "✅ Bench run complete, {} frames dropped",
        frame_slot.frames_dropped()
    );
    Ok(())
}
