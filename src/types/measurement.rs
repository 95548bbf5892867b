//! Timestamped sensor readings
//!
//! A [`MeasurementPackage`] is the unit of input to the tracker: one reading
//! from one sensor, stamped with the microsecond time it was taken. The two
//! supported sensor families report either Cartesian position or polar
//! range/bearing/range-rate.
//!
//! ```
//! use sigmatrack::types::measurement::{MeasurementPackage, SensorKind};
//!
//! let package = MeasurementPackage::position(1_000_000, 3.0_f64, -1.5);
//! assert_eq!(package.reading.kind(), SensorKind::Position);
//! ```

// ============================================================================
// Sensor Readings
// ============================================================================

/// One raw sensor observation.
///
/// Readings are immutable values produced by the ingestion layer; the tracker
/// dispatches on the variant to select the matching observation model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading<T> {
    /// Direct 2D position fix, in meters.
    Position {
        /// Observed x position
        x: T,
        /// Observed y position
        y: T,
    },
    /// Polar observation from a range-rate capable sensor.
    RangeBearingRate {
        /// Radial distance to the target, in meters
        range: T,
        /// Bearing from the sensor x axis, in radians
        bearing: T,
        /// Radial velocity, in meters per second
        range_rate: T,
    },
}

/// Identifies the sensor family a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Cartesian position sensor
    Position,
    /// Polar range/bearing/range-rate sensor
    RangeBearingRate,
}

impl<T> SensorReading<T> {
    /// Returns the sensor family this reading belongs to.
    #[inline]
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorReading::Position { .. } => SensorKind::Position,
            SensorReading::RangeBearingRate { .. } => SensorKind::RangeBearingRate,
        }
    }
}

// ============================================================================
// Measurement Package
// ============================================================================

/// A sensor reading paired with its acquisition timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementPackage<T> {
    /// Acquisition time in microseconds since an arbitrary epoch
    pub timestamp_us: u64,
    /// The observation itself
    pub reading: SensorReading<T>,
}

impl<T> MeasurementPackage<T> {
    /// Creates a package holding a position reading.
    #[inline]
    pub fn position(timestamp_us: u64, x: T, y: T) -> Self {
        Self {
            timestamp_us,
            reading: SensorReading::Position { x, y },
        }
    }

    /// Creates a package holding a range/bearing/range-rate reading.
    #[inline]
    pub fn range_bearing_rate(timestamp_us: u64, range: T, bearing: T, range_rate: T) -> Self {
        Self {
            timestamp_us,
            reading: SensorReading::RangeBearingRate {
                range,
                bearing,
                range_rate,
            },
        }
    }
}
