//! Unscented Kalman Filter for CTRV single-target tracking
//!
//! The UKF propagates mean and covariance through the nonlinear motion and
//! observation functions by carrying sigma points through them, so no
//! Jacobian computation is required. Prediction and update are pure
//! functions over belief values; callers decide when a result becomes the
//! new belief, which keeps a failed cycle from leaving a half-written state
//! behind.
//!
//! # Type Safety
//!
//! The filter uses phantom types and const generics to ensure:
//! - State vectors cannot be mixed with measurements
//! - Dimension mismatches are caught at compile time
//!
//! # Example
//!
//! ```
//! use sigmatrack::filters::ukf::{UkfState, UnscentedKalmanFilter};
//! use sigmatrack::models::{CtrvModel, PositionSensor2D};
//! use sigmatrack::types::spaces::{Measurement, StateVector};
//!
//! let motion = CtrvModel::new(0.8_f64, 0.6).unwrap();
//! let filter = UnscentedKalmanFilter::new(motion);
//! let sensor = PositionSensor2D::new(0.15, 0.15).unwrap();
//!
//! let state = UkfState::with_identity_covariance(
//!     StateVector::from_array([1.0, 1.0, 1.0, 1.0, 1.0]),
//! );
//!
//! let predicted = filter.predict(&state, 0.05).unwrap();
//! let corrected = filter
//!     .update(&predicted, &sensor, &Measurement::from_array([1.1, 1.05]))
//!     .unwrap();
//! assert!(corrected.nis >= 0.0);
//! ```

use nalgebra::{RealField, SMatrix, SVector};
use num_traits::Float;

use crate::filters::sigma::{
    AugmentedSigmaPoints, PredictedSigmaPoints, SigmaWeights, SIGMA_COUNT,
};
use crate::models::{CtrvModel, SensorModel, STATE_DIM};
use crate::types::spaces::{
    ComputeInnovation, Measurement, StateCovariance, StateVector,
};
use crate::utils::normalize_angle;
use crate::{Result, TrackError};

// ============================================================================
// Belief
// ============================================================================

/// State estimate of the tracked target.
///
/// Contains the mean and covariance of the CTRV state. Values of this type
/// are immutable snapshots: prediction and update return new beliefs rather
/// than mutating the old one.
#[derive(Debug, Clone, PartialEq)]
pub struct UkfState<T: RealField> {
    /// State estimate mean [px, py, v, yaw, yaw rate]
    pub mean: StateVector<T, STATE_DIM>,
    /// State estimate covariance
    pub covariance: StateCovariance<T, STATE_DIM>,
}

impl<T: RealField + Copy> UkfState<T> {
    /// Creates a new belief.
    #[inline]
    pub fn new(mean: StateVector<T, STATE_DIM>, covariance: StateCovariance<T, STATE_DIM>) -> Self {
        Self { mean, covariance }
    }

    /// Creates a belief with identity covariance.
    #[inline]
    pub fn with_identity_covariance(mean: StateVector<T, STATE_DIM>) -> Self {
        Self {
            mean,
            covariance: StateCovariance::identity(),
        }
    }

    /// Returns the trace of the covariance matrix (sum of variances).
    #[inline]
    pub fn uncertainty(&self) -> T {
        self.covariance.trace()
    }

    /// Estimated position [px, py].
    #[inline]
    pub fn position(&self) -> [T; 2] {
        [*self.mean.index(0), *self.mean.index(1)]
    }

    /// Estimated speed along the heading.
    #[inline]
    pub fn speed(&self) -> T {
        *self.mean.index(2)
    }

    /// Estimated heading in radians. Stored unnormalized; only residuals
    /// are wrapped.
    #[inline]
    pub fn heading(&self) -> T {
        *self.mean.index(3)
    }

    /// Estimated yaw rate in radians per second.
    #[inline]
    pub fn yaw_rate(&self) -> T {
        *self.mean.index(4)
    }
}

// ============================================================================
// Step Results
// ============================================================================

/// Result of a prediction step.
///
/// Carries the propagated sigma points alongside the predicted belief; the
/// following measurement update projects the same set into observation
/// space.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction<T: RealField> {
    /// Predicted belief
    pub state: UkfState<T>,
    /// Sigma points the prediction was recovered from
    pub sigma: PredictedSigmaPoints<T>,
}

/// Result of a measurement update step.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction<T: RealField> {
    /// Corrected belief
    pub state: UkfState<T>,
    /// Normalized innovation squared of the processed measurement.
    ///
    /// Under correct tuning this follows a chi-square distribution with as
    /// many degrees of freedom as the sensor has observation components.
    pub nis: T,
}

// ============================================================================
// Unscented Kalman Filter
// ============================================================================

/// An Unscented Kalman Filter over the CTRV motion model.
///
/// The filter owns the motion model and the sigma recovery weights; sensor
/// models are supplied per update, so one filter serves any number of
/// sensors observing the same target.
#[derive(Debug, Clone)]
pub struct UnscentedKalmanFilter<T: RealField> {
    /// CTRV motion model
    pub motion: CtrvModel<T>,
    weights: SigmaWeights<T>,
}

impl<T: RealField + Float + Copy> UnscentedKalmanFilter<T> {
    /// Creates a new filter around a motion model.
    #[inline]
    pub fn new(motion: CtrvModel<T>) -> Self {
        Self {
            motion,
            weights: SigmaWeights::new(),
        }
    }

    /// Returns the sigma recovery weights.
    #[inline]
    pub fn weights(&self) -> &SigmaWeights<T> {
        &self.weights
    }

    /// Performs the prediction step over a time interval of `dt` seconds.
    ///
    /// 1. Generate augmented sigma points from the belief
    /// 2. Propagate every point through the CTRV dynamics
    /// 3. Recover the predicted mean and covariance
    ///
    /// A `dt` of zero is a legal no-op propagation. The input belief is left
    /// untouched.
    ///
    /// # Errors
    /// Returns [`TrackError::NotPositiveDefinite`] if the augmented
    /// covariance cannot be factored.
    ///
    /// # Panics
    /// Panics if `dt < 0`.
    pub fn predict(&self, state: &UkfState<T>, dt: T) -> Result<Prediction<T>> {
        let augmented =
            AugmentedSigmaPoints::generate(&state.mean, &state.covariance, &self.motion, &self.weights)?;
        let sigma = PredictedSigmaPoints::propagate(&augmented, &self.motion, dt);

        let mean = sigma.mean(&self.weights);
        let covariance = sigma.covariance(&self.weights, &mean);

        Ok(Prediction {
            state: UkfState::new(mean, covariance),
            sigma,
        })
    }

    /// Performs the measurement update step.
    ///
    /// 1. Project the predicted sigma points into observation space
    /// 2. Recover the predicted measurement mean and covariance S
    /// 3. Accumulate the cross correlation between state and observation
    /// 4. Apply the gain K = Tc·S⁻¹ to the innovation
    ///
    /// Residuals in the sensor's angular component and in the state heading
    /// are wrapped onto (-pi, pi] before entering any sum. The returned
    /// covariance is re-symmetrized after the subtractive correction.
    ///
    /// # Errors
    /// Returns [`TrackError::SingularMatrix`] if the predicted measurement
    /// covariance cannot be inverted.
    pub fn update<S, const M: usize>(
        &self,
        predicted: &Prediction<T>,
        sensor: &S,
        measurement: &Measurement<T, M>,
    ) -> Result<Correction<T>>
    where
        S: SensorModel<T, M>,
    {
        let sigma = &predicted.sigma;

        // Project the sigma points into observation space
        let mut projected = SMatrix::<T, M, SIGMA_COUNT>::zeros();
        for i in 0..SIGMA_COUNT {
            projected.set_column(i, sensor.project(&sigma.column(i)).as_svector());
        }

        // Predicted measurement mean
        let mut z_pred = SVector::<T, M>::zeros();
        for i in 0..SIGMA_COUNT {
            z_pred += projected.column(i).scale(self.weights.weight(i));
        }

        // Innovation covariance and state/observation cross correlation
        let angular = sensor.angular_component();
        let mut s = SMatrix::<T, M, M>::zeros();
        let mut cross = SMatrix::<T, STATE_DIM, M>::zeros();
        for i in 0..SIGMA_COUNT {
            let mut z_residual = projected.column(i) - z_pred;
            if let Some(component) = angular {
                z_residual[component] = normalize_angle(z_residual[component]);
            }

            let mut x_residual = sigma.points.column(i) - predicted.state.mean.as_svector();
            x_residual[3] = normalize_angle(x_residual[3]);

            s += (z_residual * z_residual.transpose()).scale(self.weights.weight(i));
            cross += (x_residual * z_residual.transpose()).scale(self.weights.weight(i));
        }
        s += sensor.noise_covariance().as_matrix();

        let s_inverse = s
            .try_inverse()
            .ok_or(TrackError::SingularMatrix("predicted measurement covariance"))?;
        let gain = cross * s_inverse;

        // Innovation, with the same angular wrap as the residuals above
        let mut innovation = (*measurement)
            .innovation(Measurement::from_svector(z_pred))
            .into_svector();
        if let Some(component) = angular {
            innovation[component] = normalize_angle(innovation[component]);
        }

        let nis = (innovation.transpose() * s_inverse * innovation)[(0, 0)];

        let mean = predicted.state.mean.as_svector() + gain * innovation;
        let covariance =
            predicted.state.covariance.as_matrix() - gain * s * gain.transpose();

        Ok(Correction {
            state: UkfState::new(
                StateVector::from_svector(mean),
                StateCovariance::from_matrix(covariance).symmetrized(),
            ),
            nis,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
