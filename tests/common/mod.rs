//! Common test helpers for tracker integration tests

#![allow(dead_code)]

use sigmatrack::filters::tracker::{Tracker, TrackerConfig};
use sigmatrack::types::measurement::MeasurementPackage;

/// Routes library log output to the test harness when RUST_LOG is set.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Tracker with the reference tuning.
pub fn default_tracker() -> Tracker<f64> {
    Tracker::new(TrackerConfig::default()).expect("default configuration is valid")
}

/// Ground truth target on a constant turn rate and velocity course.
#[derive(Debug, Clone, Copy)]
pub struct TruthTarget {
    pub px: f64,
    pub py: f64,
    pub speed: f64,
    pub yaw: f64,
    pub yaw_rate: f64,
}

impl TruthTarget {
    /// Advances the target by `dt` seconds along its course.
    pub fn step(&mut self, dt: f64) {
        if self.yaw_rate.abs() > 1e-9 {
            let ratio = self.speed / self.yaw_rate;
            let yaw_end = self.yaw + self.yaw_rate * dt;
            self.px += ratio * (yaw_end.sin() - self.yaw.sin());
            self.py += ratio * (self.yaw.cos() - yaw_end.cos());
            self.yaw = yaw_end;
        } else {
            self.px += self.speed * dt * self.yaw.cos();
            self.py += self.speed * dt * self.yaw.sin();
        }
    }

    pub fn vx(&self) -> f64 {
        self.speed * self.yaw.cos()
    }

    pub fn vy(&self) -> f64 {
        self.speed * self.yaw.sin()
    }

    /// Noiseless position reading of the target.
    pub fn position_package(&self, timestamp_us: u64) -> MeasurementPackage<f64> {
        MeasurementPackage::position(timestamp_us, self.px, self.py)
    }

    /// Noiseless polar reading of the target. The target must not sit on
    /// the sensor origin.
    pub fn polar_package(&self, timestamp_us: u64) -> MeasurementPackage<f64> {
        let range = self.px.hypot(self.py);
        let bearing = self.py.atan2(self.px);
        let range_rate = (self.px * self.vx() + self.py * self.vy()) / range;
        MeasurementPackage::range_bearing_rate(timestamp_us, range, bearing, range_rate)
    }
}
