//! Motion model for target dynamics
//!
//! The constant turn rate and velocity (CTRV) model describes a target that
//! moves along circular arcs: speed and yaw rate stay constant while heading
//! advances. Process noise enters through two acceleration terms, one
//! longitudinal and one angular, carried as extra components of the
//! noise-augmented state rather than as an additive covariance.

use nalgebra::{RealField, SVector};
use num_traits::Float;

use crate::{Result, TrackError};

/// Dimension of the CTRV state vector [px, py, v, yaw, yaw rate].
pub const STATE_DIM: usize = 5;

/// Dimension of the noise-augmented state used for sigma point generation.
///
/// Appends the longitudinal acceleration and yaw acceleration noise terms
/// to the CTRV state.
pub const AUG_DIM: usize = STATE_DIM + 2;

/// Yaw rates with magnitude at or below this value (rad/s) are treated as
/// driving in a straight line. The arc closed form divides by the yaw rate
/// and becomes ill-conditioned near zero.
pub const YAW_RATE_FLOOR: f64 = 0.001;

// ============================================================================
// CTRV Model
// ============================================================================

/// Constant turn rate and velocity motion model.
///
/// State: [px, py, v, yaw, yaw rate]
///
/// The deterministic dynamics over a step of length dt are:
/// - px' = px + (v/ψ̇)·(sin(ψ + ψ̇·dt) - sin ψ)   when turning
/// - py' = py + (v/ψ̇)·(cos ψ - cos(ψ + ψ̇·dt))
/// - px' = px + v·cos(ψ)·dt, py' = py + v·sin(ψ)·dt   when |ψ̇| is at the floor
/// - v' = v, ψ' = ψ + ψ̇·dt, ψ̇' = ψ̇
///
/// The noise components of an augmented point are integrated on top:
/// second order in dt on position, first order on speed, heading, and
/// yaw rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CtrvModel<T: RealField> {
    /// Longitudinal acceleration noise standard deviation (m/s^2)
    pub std_accel: T,
    /// Yaw acceleration noise standard deviation (rad/s^2)
    pub std_yaw_accel: T,
}

impl<T: RealField + Float + Copy> CtrvModel<T> {
    /// Creates a new CTRV model.
    ///
    /// # Arguments
    /// - `std_accel`: longitudinal acceleration noise standard deviation (must be > 0)
    /// - `std_yaw_accel`: yaw acceleration noise standard deviation (must be > 0)
    ///
    /// # Errors
    /// Returns [`TrackError::InvalidParameter`] if either deviation is not
    /// strictly positive.
    pub fn new(std_accel: T, std_yaw_accel: T) -> Result<Self> {
        if !(std_accel > T::zero()) {
            return Err(TrackError::InvalidParameter("std_accel must be positive"));
        }
        if !(std_yaw_accel > T::zero()) {
            return Err(TrackError::InvalidParameter(
                "std_yaw_accel must be positive",
            ));
        }
        Ok(Self {
            std_accel,
            std_yaw_accel,
        })
    }

    /// Variance of the longitudinal acceleration noise.
    #[inline]
    pub fn accel_variance(&self) -> T {
        self.std_accel * self.std_accel
    }

    /// Variance of the yaw acceleration noise.
    #[inline]
    pub fn yaw_accel_variance(&self) -> T {
        self.std_yaw_accel * self.std_yaw_accel
    }

    /// Propagates one augmented point through the CTRV dynamics.
    ///
    /// The first [`STATE_DIM`] components are the state, the remaining two
    /// the sampled acceleration noise. Returns the propagated state.
    ///
    /// # Panics
    /// Panics if `dt < 0`.
    pub fn propagate(&self, point: &SVector<T, AUG_DIM>, dt: T) -> SVector<T, STATE_DIM> {
        assert!(dt >= T::zero(), "Time step dt must be non-negative");

        let px = point[0];
        let py = point[1];
        let v = point[2];
        let yaw = point[3];
        let yawd = point[4];
        let nu_accel = point[5];
        let nu_yaw_accel = point[6];

        let floor = T::from_f64(YAW_RATE_FLOOR).unwrap();
        let half = T::from_f64(0.5).unwrap();
        let dt_sq = dt * dt;

        let yaw_end = yaw + yawd * dt;
        let (mut px_p, mut py_p) = if Float::abs(yawd) > floor {
            // Arc closed form, valid away from the zero turn rate singularity
            let ratio = v / yawd;
            (
                px + ratio * (Float::sin(yaw_end) - Float::sin(yaw)),
                py + ratio * (Float::cos(yaw) - Float::cos(yaw_end)),
            )
        } else {
            (
                px + v * dt * Float::cos(yaw),
                py + v * dt * Float::sin(yaw),
            )
        };

        let mut v_p = v;
        let mut yaw_p = yaw_end;
        let mut yawd_p = yawd;

        // Noise integration
        px_p += half * nu_accel * dt_sq * Float::cos(yaw);
        py_p += half * nu_accel * dt_sq * Float::sin(yaw);
        v_p += nu_accel * dt;
        yaw_p += half * nu_yaw_accel * dt_sq;
        yawd_p += nu_yaw_accel * dt;

        SVector::from([px_p, py_p, v_p, yaw_p, yawd_p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noiseless(state: [f64; STATE_DIM]) -> SVector<f64, AUG_DIM> {
        SVector::from([state[0], state[1], state[2], state[3], state[4], 0.0, 0.0])
    }

    #[test]
    fn test_rejects_non_positive_deviations() {
        assert_eq!(
            CtrvModel::new(0.0_f64, 0.6),
            Err(TrackError::InvalidParameter("std_accel must be positive"))
        );
        assert_eq!(
            CtrvModel::new(0.8_f64, -0.1),
            Err(TrackError::InvalidParameter(
                "std_yaw_accel must be positive"
            ))
        );
        assert!(CtrvModel::new(0.8_f64, 0.6).is_ok());
    }

    #[test]
    fn test_straight_line_is_exact() {
        let model = CtrvModel::new(0.8_f64, 0.6).unwrap();
        let yaw = 0.4_f64;
        let state = noiseless([2.0, -1.0, 3.0, yaw, 0.0]);

        let predicted = model.propagate(&state, 0.5);

        assert!((predicted[0] - (2.0 + 3.0 * 0.5 * yaw.cos())).abs() < 1e-12);
        assert!((predicted[1] - (-1.0 + 3.0 * 0.5 * yaw.sin())).abs() < 1e-12);
        assert!((predicted[2] - 3.0).abs() < 1e-12);
        assert!((predicted[3] - yaw).abs() < 1e-12);
        assert!(predicted[4].abs() < 1e-12);
    }

    #[test]
    fn test_quarter_turn_follows_circle() {
        use std::f64::consts::FRAC_PI_2;

        let model = CtrvModel::new(0.8_f64, 0.6).unwrap();
        // Heading east at 10 m/s, turning left at pi/2 rad/s
        let state = noiseless([0.0, 0.0, 10.0, 0.0, FRAC_PI_2]);

        let predicted = model.propagate(&state, 1.0);

        // Turn radius r = v / yaw rate; after a quarter turn the target sits
        // at (r, r) heading north
        let r = 10.0 / FRAC_PI_2;
        assert!((predicted[0] - r).abs() < 1e-9, "px: {}", predicted[0]);
        assert!((predicted[1] - r).abs() < 1e-9, "py: {}", predicted[1]);
        assert!((predicted[2] - 10.0).abs() < 1e-12);
        assert!((predicted[3] - FRAC_PI_2).abs() < 1e-12);
        assert!((predicted[4] - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_yaw_rate_at_floor_uses_straight_line() {
        let model = CtrvModel::new(0.8_f64, 0.6).unwrap();
        let state = noiseless([0.0, 0.0, 4.0, 0.0, YAW_RATE_FLOOR]);

        let predicted = model.propagate(&state, 1.0);

        // At the floor exactly the straight line branch applies
        assert!((predicted[0] - 4.0).abs() < 1e-12);
        assert!(predicted[1].abs() < 1e-12);
        // Heading still advances by the (tiny) yaw rate
        assert!((predicted[3] - YAW_RATE_FLOOR).abs() < 1e-15);
    }

    #[test]
    fn test_noise_terms_integrate() {
        let model = CtrvModel::new(0.8_f64, 0.6).unwrap();
        let dt = 0.1_f64;
        let point = SVector::from([0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 1.0]);

        let predicted = model.propagate(&point, dt);

        assert!((predicted[0] - 0.5 * 2.0 * dt * dt).abs() < 1e-12);
        assert!(predicted[1].abs() < 1e-12);
        assert!((predicted[2] - 2.0 * dt).abs() < 1e-12);
        assert!((predicted[3] - 0.5 * 1.0 * dt * dt).abs() < 1e-12);
        assert!((predicted[4] - 1.0 * dt).abs() < 1e-12);
    }

    #[test]
    fn test_zero_dt_is_identity_without_noise() {
        let model = CtrvModel::new(0.8_f64, 0.6).unwrap();
        let state = noiseless([1.0, 2.0, 3.0, 0.7, 0.2]);

        let predicted = model.propagate(&state, 0.0);

        for i in 0..STATE_DIM {
            assert!((predicted[i] - state[i]).abs() < 1e-15, "component {}", i);
        }
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn test_negative_dt_panics() {
        let model = CtrvModel::new(0.8_f64, 0.6).unwrap();
        let state = noiseless([0.0, 0.0, 1.0, 0.0, 0.0]);
        let _ = model.propagate(&state, -0.1);
    }
}
