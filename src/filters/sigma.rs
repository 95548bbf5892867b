//! Sigma point generation and moment recovery
//!
//! The unscented transform represents a Gaussian belief by a small set of
//! deterministically placed sample points. This module generates the points
//! for the noise-augmented CTRV state, carries them through the motion
//! model, and recovers the propagated mean and covariance.
//!
//! # Sigma Point Selection
//!
//! The augmented scheme with spread parameter λ = 3 - n places:
//! - χ₀ = μ (mean)
//! - χᵢ = μ + √(λ+n)·Lᵢ for i = 1...n
//! - χᵢ₊ₙ = μ - √(λ+n)·Lᵢ for i = 1...n
//!
//! where L is the Cholesky factor of the augmented covariance and n is the
//! augmented dimension. Process noise is part of the augmented state, so the
//! nonlinear noise integration is sampled rather than added as a covariance
//! term afterwards.

use nalgebra::{RealField, SMatrix, SVector};
use num_traits::Float;

use crate::models::{CtrvModel, AUG_DIM, STATE_DIM};
use crate::types::spaces::{StateCovariance, StateVector};
use crate::utils::normalize_angle;
use crate::{Result, TrackError};

/// Number of sigma points for the augmented state.
pub const SIGMA_COUNT: usize = 2 * AUG_DIM + 1;

// ============================================================================
// Weights
// ============================================================================

/// Recovery weights for the augmented sigma point set.
///
/// With λ = 3 - n the center weight is negative; the weights still sum
/// to one, which is what moment recovery relies on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmaWeights<T: RealField> {
    /// Weight of the central point, λ / (λ + n)
    pub weight_0: T,
    /// Weight of each spread point, 1 / (2·(λ + n))
    pub weight_i: T,
    /// Column scale for generation, √(λ + n)
    pub spread: T,
}

impl<T: RealField + Float + Copy> SigmaWeights<T> {
    /// Computes the weights for the augmented dimension.
    pub fn new() -> Self {
        let n = T::from_usize(AUG_DIM).unwrap();
        let lambda = T::from_f64(3.0).unwrap() - n;
        let two = T::from_f64(2.0).unwrap();

        Self {
            weight_0: lambda / (lambda + n),
            weight_i: T::one() / (two * (lambda + n)),
            spread: Float::sqrt(lambda + n),
        }
    }

    /// Returns the recovery weight of sigma point `i`.
    #[inline]
    pub fn weight(&self, i: usize) -> T {
        if i == 0 {
            self.weight_0
        } else {
            self.weight_i
        }
    }
}

impl<T: RealField + Float + Copy> Default for SigmaWeights<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Augmented Sigma Points
// ============================================================================

/// Sigma points of the noise-augmented belief, one per column.
///
/// Rows 0..[`STATE_DIM`] hold the state, the last two rows the sampled
/// longitudinal and yaw acceleration noise.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedSigmaPoints<T: RealField> {
    /// The points [χ₀, χ₁, ..., χ₂ₙ] as matrix columns
    pub points: SMatrix<T, AUG_DIM, SIGMA_COUNT>,
}

impl<T: RealField + Float + Copy> AugmentedSigmaPoints<T> {
    /// Generates the augmented sigma point set for a belief.
    ///
    /// The augmented mean appends two zero noise components; the augmented
    /// covariance carries the motion model's acceleration variances on the
    /// two extra diagonal entries.
    ///
    /// # Errors
    /// Returns [`TrackError::NotPositiveDefinite`] if the augmented
    /// covariance has no Cholesky factor.
    pub fn generate(
        mean: &StateVector<T, STATE_DIM>,
        covariance: &StateCovariance<T, STATE_DIM>,
        motion: &CtrvModel<T>,
        weights: &SigmaWeights<T>,
    ) -> Result<Self> {
        let mut mean_aug = SVector::<T, AUG_DIM>::zeros();
        mean_aug
            .fixed_view_mut::<STATE_DIM, 1>(0, 0)
            .copy_from(mean.as_svector());

        let mut cov_aug = SMatrix::<T, AUG_DIM, AUG_DIM>::zeros();
        cov_aug
            .fixed_view_mut::<STATE_DIM, STATE_DIM>(0, 0)
            .copy_from(covariance.as_matrix());
        cov_aug[(STATE_DIM, STATE_DIM)] = motion.accel_variance();
        cov_aug[(STATE_DIM + 1, STATE_DIM + 1)] = motion.yaw_accel_variance();

        let root = nalgebra::Cholesky::new(cov_aug)
            .ok_or(TrackError::NotPositiveDefinite("augmented covariance"))?
            .l();

        let mut points = SMatrix::<T, AUG_DIM, SIGMA_COUNT>::zeros();
        points.set_column(0, &mean_aug);
        for i in 0..AUG_DIM {
            let offset = root.column(i).scale(weights.spread);
            points.set_column(i + 1, &(mean_aug + offset));
            points.set_column(i + 1 + AUG_DIM, &(mean_aug - offset));
        }

        Ok(Self { points })
    }
}

// ============================================================================
// Predicted Sigma Points
// ============================================================================

/// Sigma points after propagation through the motion model.
///
/// Kept until the next measurement update, which projects the same set into
/// observation space.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedSigmaPoints<T: RealField> {
    /// The propagated points as matrix columns
    pub points: SMatrix<T, STATE_DIM, SIGMA_COUNT>,
}

impl<T: RealField + Float + Copy> PredictedSigmaPoints<T> {
    /// Propagates every augmented point through the CTRV dynamics.
    pub fn propagate(augmented: &AugmentedSigmaPoints<T>, motion: &CtrvModel<T>, dt: T) -> Self {
        let mut points = SMatrix::<T, STATE_DIM, SIGMA_COUNT>::zeros();
        for i in 0..SIGMA_COUNT {
            let column = augmented.points.column(i).into_owned();
            points.set_column(i, &motion.propagate(&column, dt));
        }
        Self { points }
    }

    /// Returns sigma point `i` as a typed state vector.
    #[inline]
    pub fn column(&self, i: usize) -> StateVector<T, STATE_DIM> {
        StateVector::from_svector(self.points.column(i).into_owned())
    }

    /// Recovers the predicted mean as the weighted sum of the points.
    pub fn mean(&self, weights: &SigmaWeights<T>) -> StateVector<T, STATE_DIM> {
        let mut mean = SVector::<T, STATE_DIM>::zeros();
        for i in 0..SIGMA_COUNT {
            mean += self.points.column(i).scale(weights.weight(i));
        }
        StateVector::from_svector(mean)
    }

    /// Recovers the predicted covariance around a recovered mean.
    ///
    /// Heading residuals are renormalized onto (-pi, pi] before the outer
    /// products are accumulated.
    pub fn covariance(
        &self,
        weights: &SigmaWeights<T>,
        mean: &StateVector<T, STATE_DIM>,
    ) -> StateCovariance<T, STATE_DIM> {
        let mut cov = SMatrix::<T, STATE_DIM, STATE_DIM>::zeros();
        for i in 0..SIGMA_COUNT {
            let mut residual = self.points.column(i) - mean.as_svector();
            residual[3] = normalize_angle(residual[3]);
            cov += (residual * residual.transpose()).scale(weights.weight(i));
        }
        StateCovariance::from_matrix(cov)
    }
}
