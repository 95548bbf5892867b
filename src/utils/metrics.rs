//! Accuracy and consistency metrics
//!
//! Offline reductions over a finished run: root mean squared error against
//! ground truth, and chi-square reference points for judging the NIS
//! statistics reported by the filter.

use nalgebra::{RealField, SVector};
use num_traits::Float;

use crate::models::STATE_DIM;
use crate::types::spaces::StateVector;
use crate::{Result, TrackError};

/// 95th percentile of the chi-square distribution with 2 degrees of freedom.
///
/// Reference line for position sensor NIS values; a consistently tuned
/// filter leaves roughly 5% of values above it.
pub const CHI_SQUARE_95_2DOF: f64 = 5.991;

/// 95th percentile of the chi-square distribution with 3 degrees of freedom.
///
/// Reference line for range/bearing/range-rate sensor NIS values.
pub const CHI_SQUARE_95_3DOF: f64 = 7.815;

/// Converts a CTRV state into the [px, py, vx, vy] form used for evaluation.
///
/// Ground truth for this problem is recorded in Cartesian position and
/// velocity, so estimates are compared in that space.
#[inline]
pub fn position_velocity<T: RealField + Float + Copy>(
    state: &StateVector<T, STATE_DIM>,
) -> SVector<T, 4> {
    let px = *state.index(0);
    let py = *state.index(1);
    let v = *state.index(2);
    let yaw = *state.index(3);

    SVector::from([px, py, v * Float::cos(yaw), v * Float::sin(yaw)])
}

/// Computes the component-wise root mean squared error between an estimate
/// sequence and ground truth.
///
/// # Errors
/// - [`TrackError::EmptySequence`] if `estimations` is empty
/// - [`TrackError::LengthMismatch`] if the sequences differ in length
pub fn rmse<T: RealField + Float + Copy>(
    estimations: &[SVector<T, 4>],
    ground_truth: &[SVector<T, 4>],
) -> Result<SVector<T, 4>> {
    if estimations.is_empty() {
        return Err(TrackError::EmptySequence);
    }
    if estimations.len() != ground_truth.len() {
        return Err(TrackError::LengthMismatch {
            estimations: estimations.len(),
            ground_truth: ground_truth.len(),
        });
    }

    let mut accum = SVector::<T, 4>::zeros();
    for (estimate, truth) in estimations.iter().zip(ground_truth.iter()) {
        let residual = estimate - truth;
        accum += residual.component_mul(&residual);
    }

    let count = T::from_usize(estimations.len()).unwrap();
    Ok((accum / count).map(Float::sqrt))
}

/// Fraction of values strictly above a threshold.
///
/// Used to compare a collected NIS series against its chi-square reference
/// line. Returns zero for an empty series.
pub fn fraction_above<T: RealField + Float + Copy>(values: &[T], threshold: T) -> T {
    if values.is_empty() {
        return T::zero();
    }
    let above = values.iter().filter(|v| **v > threshold).count();
    T::from_usize(above).unwrap() / T::from_usize(values.len()).unwrap()
}
