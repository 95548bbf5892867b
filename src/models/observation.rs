//! Observation (sensor) models
//!
//! Describes how sensor readings relate to the tracked CTRV state. The
//! unscented update needs no Jacobians: each model only projects a state
//! into its observation space and reports a fixed noise covariance.

use nalgebra::RealField;
use num_traits::Float;

use super::motion::STATE_DIM;
use crate::types::spaces::{Measurement, MeasurementCovariance, StateVector};
use crate::{Result, TrackError};

/// Ranges at or below this value (meters) make the range-rate quotient
/// ill-conditioned; the model reports a range-rate of exactly zero instead.
pub const RANGE_FLOOR: f64 = 0.001;

/// Trait for sensor models used by the unscented measurement update.
///
/// Describes the measurement process z = h(x) + v where v is zero-mean
/// Gaussian noise with a fixed covariance R. The projection h is applied
/// to every predicted sigma point.
pub trait SensorModel<T: RealField, const M: usize> {
    /// Projects a state into this sensor's observation space.
    fn project(&self, state: &StateVector<T, STATE_DIM>) -> Measurement<T, M>;

    /// Returns the measurement noise covariance.
    fn noise_covariance(&self) -> MeasurementCovariance<T, M>;

    /// Index of the observation component that wraps on the circle, if any.
    ///
    /// Residuals in that component are renormalized to (-pi, pi] before any
    /// weighted sum.
    fn angular_component(&self) -> Option<usize> {
        None
    }
}

// ============================================================================
// Position Sensor
// ============================================================================

/// Direct 2D position sensor (lidar-like).
///
/// Observes [px, py] from the CTRV state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSensor2D<T: RealField> {
    /// X position noise standard deviation
    pub std_x: T,
    /// Y position noise standard deviation
    pub std_y: T,
}

impl<T: RealField + Float + Copy> PositionSensor2D<T> {
    /// Creates a new position sensor.
    ///
    /// # Errors
    /// Returns [`TrackError::InvalidParameter`] if either deviation is not
    /// strictly positive.
    pub fn new(std_x: T, std_y: T) -> Result<Self> {
        if !(std_x > T::zero()) {
            return Err(TrackError::InvalidParameter("std_x must be positive"));
        }
        if !(std_y > T::zero()) {
            return Err(TrackError::InvalidParameter("std_y must be positive"));
        }
        Ok(Self { std_x, std_y })
    }
}

impl<T: RealField + Float + Copy> SensorModel<T, 2> for PositionSensor2D<T> {
    fn project(&self, state: &StateVector<T, STATE_DIM>) -> Measurement<T, 2> {
        Measurement::from_array([*state.index(0), *state.index(1)])
    }

    fn noise_covariance(&self) -> MeasurementCovariance<T, 2> {
        MeasurementCovariance::from_diagonal(&nalgebra::vector![
            self.std_x * self.std_x,
            self.std_y * self.std_y
        ])
    }
}

// ============================================================================
// Range-Bearing-Rate Sensor
// ============================================================================

/// Polar range/bearing/range-rate sensor (radar-like) at the origin.
///
/// Observes [range, bearing, range rate] from the CTRV state:
/// - range = sqrt(px^2 + py^2)
/// - bearing = atan2(py, px)
/// - range rate = (px·vx + py·vy) / range, with vx = v·cos(yaw) and
///   vy = v·sin(yaw)
///
/// At ranges at or below [`RANGE_FLOOR`] the range-rate quotient is replaced
/// by zero, so a target crossing the sensor origin never produces a
/// non-finite reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBearingRateSensor<T: RealField> {
    /// Range noise standard deviation (meters)
    pub std_range: T,
    /// Bearing noise standard deviation (radians)
    pub std_bearing: T,
    /// Range-rate noise standard deviation (meters per second)
    pub std_range_rate: T,
}

impl<T: RealField + Float + Copy> RangeBearingRateSensor<T> {
    /// Creates a new range/bearing/range-rate sensor.
    ///
    /// # Errors
    /// Returns [`TrackError::InvalidParameter`] if any deviation is not
    /// strictly positive.
    pub fn new(std_range: T, std_bearing: T, std_range_rate: T) -> Result<Self> {
        if !(std_range > T::zero()) {
            return Err(TrackError::InvalidParameter("std_range must be positive"));
        }
        if !(std_bearing > T::zero()) {
            return Err(TrackError::InvalidParameter("std_bearing must be positive"));
        }
        if !(std_range_rate > T::zero()) {
            return Err(TrackError::InvalidParameter(
                "std_range_rate must be positive",
            ));
        }
        Ok(Self {
            std_range,
            std_bearing,
            std_range_rate,
        })
    }
}

impl<T: RealField + Float + Copy> SensorModel<T, 3> for RangeBearingRateSensor<T> {
    fn project(&self, state: &StateVector<T, STATE_DIM>) -> Measurement<T, 3> {
        let px = *state.index(0);
        let py = *state.index(1);
        let v = *state.index(2);
        let yaw = *state.index(3);

        let vx = v * Float::cos(yaw);
        let vy = v * Float::sin(yaw);

        let range = Float::sqrt(px * px + py * py);
        let bearing = Float::atan2(py, px);
        let range_rate = if range > T::from_f64(RANGE_FLOOR).unwrap() {
            (px * vx + py * vy) / range
        } else {
            T::zero()
        };

        Measurement::from_array([range, bearing, range_rate])
    }

    fn noise_covariance(&self) -> MeasurementCovariance<T, 3> {
        MeasurementCovariance::from_diagonal(&nalgebra::vector![
            self.std_range * self.std_range,
            self.std_bearing * self.std_bearing,
            self.std_range_rate * self.std_range_rate
        ])
    }

    fn angular_component(&self) -> Option<usize> {
        Some(1)
    }
}
