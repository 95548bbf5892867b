//! Example usage of the Sigmatrack library
//!
//! Runs the tracker over a scripted turning-target pass, with the two sensor
//! families alternating noiseless readings.

use nalgebra::SVector;
use sigmatrack::prelude::*;

/// Ground truth trajectory: constant speed on a constant-rate turn.
struct Trajectory {
    px0: f64,
    py0: f64,
    speed: f64,
    yaw0: f64,
    yaw_rate: f64,
}

impl Trajectory {
    /// State [px, py, v, yaw, yaw rate] at time `t` seconds.
    fn state_at(&self, t: f64) -> [f64; 5] {
        let yaw = self.yaw0 + self.yaw_rate * t;
        let ratio = self.speed / self.yaw_rate;
        [
            self.px0 + ratio * (yaw.sin() - self.yaw0.sin()),
            self.py0 + ratio * (self.yaw0.cos() - yaw.cos()),
            self.speed,
            yaw,
            self.yaw_rate,
        ]
    }

    /// Evaluation vector [px, py, vx, vy] at time `t` seconds.
    fn position_velocity_at(&self, t: f64) -> SVector<f64, 4> {
        let [px, py, v, yaw, _] = self.state_at(t);
        nalgebra::vector![px, py, v * yaw.cos(), v * yaw.sin()]
    }
}

/// Even steps report Cartesian position, odd steps the polar triple.
fn reading_for(step: usize, timestamp_us: u64, truth: &[f64; 5]) -> MeasurementPackage<f64> {
    let [px, py, v, yaw, _] = *truth;
    if step % 2 == 0 {
        MeasurementPackage::position(timestamp_us, px, py)
    } else {
        let range = px.hypot(py);
        let bearing = py.atan2(px);
        let range_rate = (px * v * yaw.cos() + py * v * yaw.sin()) / range;
        MeasurementPackage::range_bearing_rate(timestamp_us, range, bearing, range_rate)
    }
}

fn main() -> sigmatrack::Result<()> {
    println!("Sigmatrack: Single-Target UKF Tracking");
    println!("======================================\n");

    let mut tracker = Tracker::new(TrackerConfig::default())?;

    let trajectory = Trajectory {
        px0: 2.0,
        py0: 1.0,
        speed: 2.0,
        yaw0: 0.3,
        yaw_rate: 0.4, // turning left through the whole pass
    };

    let mut estimations = Vec::new();
    let mut ground_truth = Vec::new();
    let mut nis_position = Vec::new();
    let mut nis_range_bearing = Vec::new();

    for step in 0..20 {
        let timestamp_us = step as u64 * 100_000;
        let t = timestamp_us as f64 / 1_000_000.0;
        let truth = trajectory.state_at(t);

        let package = reading_for(step, timestamp_us, &truth);
        let Some(estimate) = tracker.process(&package)? else {
            continue;
        };

        println!(
            "t={:.1}s {:?}: pos=({:.2}, {:.2}), v={:.2}, yaw={:.2}",
            t,
            package.reading.kind(),
            estimate.state.mean.index(0),
            estimate.state.mean.index(1),
            estimate.state.speed(),
            estimate.state.heading(),
        );

        match (package.reading.kind(), estimate.nis) {
            (SensorKind::Position, Some(nis)) => nis_position.push(nis),
            (SensorKind::RangeBearingRate, Some(nis)) => nis_range_bearing.push(nis),
            _ => {}
        }

        estimations.push(position_velocity(&estimate.state.mean));
        ground_truth.push(trajectory.position_velocity_at(t));
    }

    let error = rmse(&estimations, &ground_truth)?;
    println!(
        "\nRMSE [px, py, vx, vy]: [{:.3}, {:.3}, {:.3}, {:.3}]",
        error[0], error[1], error[2], error[3]
    );

    println!(
        "NIS above the 95% threshold: position {:.0}%, range/bearing {:.0}%",
        100.0 * fraction_above(&nis_position, CHI_SQUARE_95_2DOF),
        100.0 * fraction_above(&nis_range_bearing, CHI_SQUARE_95_3DOF)
    );

    println!("\nTracking complete!");
    Ok(())
}
