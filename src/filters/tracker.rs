//! Measurement-driven tracking controller
//!
//! The [`Tracker`] owns the filter, the sensor models, and the current track.
//! It consumes timestamped [`MeasurementPackage`] values in arrival order:
//! the first reading from an enabled sensor seeds the track, every later one
//! runs a predict/update cycle over the elapsed time. A cycle that fails
//! leaves the track exactly as it was, so the caller can drop the offending
//! reading and continue with the next.
//!
//! # Example
//!
//! ```
//! use sigmatrack::filters::tracker::{Tracker, TrackerConfig};
//! use sigmatrack::types::measurement::MeasurementPackage;
//!
//! let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
//!
//! let first = tracker
//!     .process(&MeasurementPackage::position(0, 1.0_f64, 1.0))
//!     .unwrap()
//!     .unwrap();
//! assert!(first.nis.is_none());
//!
//! let second = tracker
//!     .process(&MeasurementPackage::position(50_000, 1.05, 1.02))
//!     .unwrap()
//!     .unwrap();
//! assert!(second.nis.is_some());
//! ```

use log::{debug, trace, warn};
use nalgebra::RealField;
use num_traits::Float;

use crate::filters::ukf::{UkfState, UnscentedKalmanFilter};
use crate::models::{CtrvModel, PositionSensor2D, RangeBearingRateSensor};
use crate::types::measurement::{MeasurementPackage, SensorKind, SensorReading};
use crate::types::spaces::{Measurement, StateVector};
use crate::Result;

/// Microseconds per second, for timestamp deltas.
const MICROS_PER_SECOND: f64 = 1_000_000.0;

// ============================================================================
// Configuration
// ============================================================================

/// Noise parameters and sensor switches for a [`Tracker`].
///
/// The defaults carry the reference tuning: process noise sized for a target
/// that maneuvers at vehicle-like rates, observation noise at the values the
/// supported sensors are specified with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig<T: RealField> {
    /// Process noise, longitudinal acceleration standard deviation in m/s^2
    pub std_accel: T,
    /// Process noise, yaw acceleration standard deviation in rad/s^2
    pub std_yaw_accel: T,
    /// Position sensor x standard deviation in m
    pub std_pos_x: T,
    /// Position sensor y standard deviation in m
    pub std_pos_y: T,
    /// Range standard deviation in m
    pub std_range: T,
    /// Bearing standard deviation in rad
    pub std_bearing: T,
    /// Range rate standard deviation in m/s
    pub std_range_rate: T,
    /// Process readings from the position sensor
    pub use_position: bool,
    /// Process readings from the range/bearing/range-rate sensor
    pub use_range_bearing: bool,
}

impl<T: RealField + Float + Copy> Default for TrackerConfig<T> {
    fn default() -> Self {
        Self {
            std_accel: T::from_f64(0.8).unwrap(),
            std_yaw_accel: T::from_f64(0.6).unwrap(),
            std_pos_x: T::from_f64(0.15).unwrap(),
            std_pos_y: T::from_f64(0.15).unwrap(),
            std_range: T::from_f64(0.3).unwrap(),
            std_bearing: T::from_f64(0.03).unwrap(),
            std_range_rate: T::from_f64(0.3).unwrap(),
            use_position: true,
            use_range_bearing: true,
        }
    }
}

// ============================================================================
// Estimates
// ============================================================================

/// State estimate emitted after a reading was absorbed.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate<T: RealField> {
    /// Timestamp of the reading that produced this estimate, in microseconds
    pub timestamp_us: u64,
    /// Belief after the reading was absorbed
    pub state: UkfState<T>,
    /// Normalized innovation squared of the reading.
    ///
    /// `None` for the reading that seeded the track, since no prediction
    /// exists to compare it against.
    pub nis: Option<T>,
}

/// The current track: a belief pinned to the time it is valid for.
#[derive(Debug, Clone)]
struct Track<T: RealField> {
    state: UkfState<T>,
    timestamp_us: u64,
}

// ============================================================================
// Tracker
// ============================================================================

/// Single-target tracker fusing position and range/bearing/range-rate
/// readings through one Unscented Kalman Filter.
#[derive(Debug, Clone)]
pub struct Tracker<T: RealField> {
    filter: UnscentedKalmanFilter<T>,
    position_sensor: PositionSensor2D<T>,
    range_sensor: RangeBearingRateSensor<T>,
    use_position: bool,
    use_range_bearing: bool,
    track: Option<Track<T>>,
    last_nis_position: Option<T>,
    last_nis_range_bearing: Option<T>,
}

impl<T: RealField + Float + Copy> Tracker<T> {
    /// Creates a tracker from a configuration.
    ///
    /// # Errors
    /// Returns [`crate::TrackError::InvalidParameter`] if any noise standard
    /// deviation is not strictly positive.
    pub fn new(config: TrackerConfig<T>) -> Result<Self> {
        let motion = CtrvModel::new(config.std_accel, config.std_yaw_accel)?;
        let position_sensor = PositionSensor2D::new(config.std_pos_x, config.std_pos_y)?;
        let range_sensor = RangeBearingRateSensor::new(
            config.std_range,
            config.std_bearing,
            config.std_range_rate,
        )?;

        Ok(Self {
            filter: UnscentedKalmanFilter::new(motion),
            position_sensor,
            range_sensor,
            use_position: config.use_position,
            use_range_bearing: config.use_range_bearing,
            track: None,
            last_nis_position: None,
            last_nis_range_bearing: None,
        })
    }

    /// Absorbs one reading and returns the resulting estimate.
    ///
    /// Readings from a disabled sensor return `Ok(None)` without touching the
    /// track, not even its timestamp. The first enabled reading seeds the
    /// track from the observed position and returns an estimate with no NIS.
    /// Every later reading runs a full predict/update cycle; on failure the
    /// reading is dropped, the error is returned, and the track stays at its
    /// pre-cycle belief and timestamp.
    ///
    /// # Errors
    /// Returns [`crate::TrackError::NotPositiveDefinite`] or
    /// [`crate::TrackError::SingularMatrix`] when the cycle's linear algebra
    /// breaks down.
    ///
    /// # Panics
    /// Panics if the reading is older than the one the track was last
    /// updated from.
    pub fn process(&mut self, package: &MeasurementPackage<T>) -> Result<Option<Estimate<T>>> {
        let enabled = match package.reading.kind() {
            SensorKind::Position => self.use_position,
            SensorKind::RangeBearingRate => self.use_range_bearing,
        };
        if !enabled {
            trace!(
                "ignoring {:?} reading at {} us, sensor disabled",
                package.reading.kind(),
                package.timestamp_us
            );
            return Ok(None);
        }

        let Some(track) = self.track.as_ref() else {
            return Ok(Some(self.initialize(package)));
        };

        assert!(
            package.timestamp_us >= track.timestamp_us,
            "measurement timestamps must be non-decreasing"
        );
        let elapsed = package.timestamp_us - track.timestamp_us;
        let dt = T::from_u64(elapsed).unwrap() / T::from_f64(MICROS_PER_SECOND).unwrap();
        let previous = track.state.clone();

        let cycle = self
            .filter
            .predict(&previous, dt)
            .and_then(|predicted| match package.reading {
                SensorReading::Position { x, y } => self.filter.update(
                    &predicted,
                    &self.position_sensor,
                    &Measurement::from_array([x, y]),
                ),
                SensorReading::RangeBearingRate {
                    range,
                    bearing,
                    range_rate,
                } => self.filter.update(
                    &predicted,
                    &self.range_sensor,
                    &Measurement::from_array([range, bearing, range_rate]),
                ),
            });
        let correction = match cycle {
            Ok(correction) => correction,
            Err(error) => {
                warn!(
                    "dropping {:?} reading at {} us: {}",
                    package.reading.kind(),
                    package.timestamp_us,
                    error
                );
                return Err(error);
            }
        };

        trace!(
            "cycle at {} us: dt {:?} s, nis {:?}",
            package.timestamp_us,
            dt,
            correction.nis
        );

        self.track = Some(Track {
            state: correction.state.clone(),
            timestamp_us: package.timestamp_us,
        });
        match package.reading.kind() {
            SensorKind::Position => self.last_nis_position = Some(correction.nis),
            SensorKind::RangeBearingRate => self.last_nis_range_bearing = Some(correction.nis),
        }

        Ok(Some(Estimate {
            timestamp_us: package.timestamp_us,
            state: correction.state,
            nis: Some(correction.nis),
        }))
    }

    /// Seeds the track from the first enabled reading.
    ///
    /// Both sensor families pin down the position only, so speed, heading and
    /// yaw rate start at one with identity covariance. A polar reading is
    /// converted through its range and bearing; its range rate constrains a
    /// single velocity component and is not used for the seed.
    fn initialize(&mut self, package: &MeasurementPackage<T>) -> Estimate<T> {
        let one = T::one();
        let mean = match package.reading {
            SensorReading::Position { x, y } => StateVector::from_array([x, y, one, one, one]),
            SensorReading::RangeBearingRate { range, bearing, .. } => StateVector::from_array([
                range * Float::cos(bearing),
                range * Float::sin(bearing),
                one,
                one,
                one,
            ]),
        };
        let state = UkfState::with_identity_covariance(mean);

        debug!(
            "track initialized from {:?} reading at {} us",
            package.reading.kind(),
            package.timestamp_us
        );

        self.track = Some(Track {
            state: state.clone(),
            timestamp_us: package.timestamp_us,
        });

        Estimate {
            timestamp_us: package.timestamp_us,
            state,
            nis: None,
        }
    }

    /// Whether a track has been seeded.
    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.track.is_some()
    }

    /// The current belief, if a track exists.
    #[inline]
    pub fn state(&self) -> Option<&UkfState<T>> {
        self.track.as_ref().map(|track| &track.state)
    }

    /// NIS of the most recent position reading absorbed into the track.
    #[inline]
    pub fn last_nis_position(&self) -> Option<T> {
        self.last_nis_position
    }

    /// NIS of the most recent range/bearing/range-rate reading absorbed into
    /// the track.
    #[inline]
    pub fn last_nis_range_bearing(&self) -> Option<T> {
        self.last_nis_range_bearing
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrackError;

    fn default_tracker() -> Tracker<f64> {
        Tracker::new(TrackerConfig::default()).unwrap()
    }

    #[test]
    fn test_first_position_reading_seeds_track() {
        let mut tracker = default_tracker();
        assert!(!tracker.is_tracking());

        let estimate = tracker
            .process(&MeasurementPackage::position(0, 3.0, -2.0))
            .unwrap()
            .unwrap();

        assert!(tracker.is_tracking());
        assert!(estimate.nis.is_none());
        assert!((estimate.state.mean.index(0) - 3.0).abs() < 1e-12);
        assert!((estimate.state.mean.index(1) + 2.0).abs() < 1e-12);
        assert!((estimate.state.speed() - 1.0).abs() < 1e-12);
        // Identity covariance over five state components
        assert!((estimate.state.uncertainty() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_polar_reading_seeds_position_only() {
        let mut tracker = default_tracker();

        let estimate = tracker
            .process(&MeasurementPackage::range_bearing_rate(
                0,
                2.0,
                std::f64::consts::FRAC_PI_2,
                -3.0,
            ))
            .unwrap()
            .unwrap();

        // The seed is [r cos(phi), r sin(phi)]; the range rate reading does
        // not enter it
        assert!(estimate.state.mean.index(0).abs() < 1e-12);
        assert!((estimate.state.mean.index(1) - 2.0).abs() < 1e-12);
        assert!((estimate.state.speed() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_sensor_reading_is_ignored() {
        let mut tracker = Tracker::new(TrackerConfig {
            use_position: false,
            ..TrackerConfig::default()
        })
        .unwrap();

        let skipped = tracker
            .process(&MeasurementPackage::position(0, 1.0, 1.0))
            .unwrap();

        assert!(skipped.is_none());
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_nis_recorded_per_sensor() {
        let mut tracker = default_tracker();

        tracker
            .process(&MeasurementPackage::position(0, 1.0, 1.0))
            .unwrap();
        assert!(tracker.last_nis_position().is_none());

        tracker
            .process(&MeasurementPackage::position(50_000, 1.05, 1.02))
            .unwrap();
        assert!(tracker.last_nis_position().is_some());
        assert!(tracker.last_nis_range_bearing().is_none());

        tracker
            .process(&MeasurementPackage::range_bearing_rate(
                100_000, 1.5, 0.78, 1.0,
            ))
            .unwrap();
        assert!(tracker.last_nis_range_bearing().is_some());
    }

    #[test]
    fn test_estimate_matches_tracker_state() {
        let mut tracker = default_tracker();

        tracker
            .process(&MeasurementPackage::position(0, 1.0, 1.0))
            .unwrap();
        let estimate = tracker
            .process(&MeasurementPackage::position(100_000, 1.1, 1.05))
            .unwrap()
            .unwrap();

        let state = tracker.state().unwrap();
        assert_eq!(state, &estimate.state);
        assert_eq!(estimate.timestamp_us, 100_000);
    }

    #[test]
    fn test_rejects_non_positive_noise() {
        let config = TrackerConfig {
            std_accel: 0.0,
            ..TrackerConfig::default()
        };

        assert_eq!(
            Tracker::new(config).unwrap_err(),
            TrackError::InvalidParameter("std_accel must be positive")
        );
    }

    #[test]
    fn test_failed_cycle_leaves_track_unchanged() {
        use crate::types::spaces::StateCovariance;
        use nalgebra::SMatrix;

        let mut tracker = default_tracker();
        tracker
            .process(&MeasurementPackage::position(0, 1.0, 1.0))
            .unwrap();

        // Force the augmented-covariance factorization in the next prediction
        // to fail by zeroing the stored covariance.
        let track = tracker.track.as_mut().unwrap();
        track.state =
            UkfState::new(track.state.mean, StateCovariance::from_matrix(SMatrix::zeros()));
        let before = tracker.track.clone().unwrap();

        let error = tracker
            .process(&MeasurementPackage::position(50_000, 1.1, 1.05))
            .unwrap_err();

        assert!(matches!(error, TrackError::NotPositiveDefinite(_)));
        let after = tracker.track.as_ref().unwrap();
        assert_eq!(after.state, before.state);
        assert_eq!(after.timestamp_us, before.timestamp_us);
        assert!(tracker.last_nis_position().is_none());
        assert!(tracker.last_nis_range_bearing().is_none());
    }

    #[test]
    #[should_panic(expected = "non-decreasing")]
    fn test_rejects_timestamp_regression() {
        let mut tracker = default_tracker();
        tracker
            .process(&MeasurementPackage::position(100, 1.0, 1.0))
            .unwrap();
        let _ = tracker.process(&MeasurementPackage::position(50, 1.0, 1.0));
    }
}
