//! Angle normalization
//!
//! Heading and bearing residuals must be wrapped onto the circle before they
//! enter any weighted sum; a residual of 2π - ε is really a residual of -ε.

use nalgebra::RealField;
use num_traits::Float;

/// Wraps an angle in radians onto the half-open interval (-pi, pi].
///
/// The result is congruent to the input modulo 2π. The wrap is computed in
/// closed form rather than by repeated subtraction, so the cost is
/// independent of the input magnitude and non-finite inputs simply yield NaN.
///
/// ```
/// use core::f64::consts::PI;
/// use sigmatrack::utils::normalize_angle;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
/// assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
/// ```
#[inline]
pub fn normalize_angle<T: RealField + Float + Copy>(angle: T) -> T {
    let pi = T::pi();
    let two_pi = T::two_pi();

    // Shift so the target interval maps onto [0, 2pi), wrap, shift back
    let mut wrapped = (pi - angle) % two_pi;
    if wrapped < T::zero() {
        wrapped += two_pi;
    }
    pi - wrapped
}
