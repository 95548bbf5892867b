//! Sigmatrack: Unscented Kalman Filter tracking for a single maneuvering target
//!
//! Estimates 2D position, speed, heading, and yaw rate from an asynchronous
//! stream of position and range/bearing/range-rate readings, using a constant
//! turn rate and velocity (CTRV) motion model.
//!
//! # Features
//!
//! - **Type Safety**: state, measurement, and innovation spaces are distinct types
//! - **Compile-Time Checks**: dimension mismatches caught at compile time
//! - **no_std Support**: fixed-size arithmetic, no allocation in the filter core

#![cfg_attr(not(feature = "std"), no_std)]

pub mod types;
pub mod models;
pub mod filters;
pub mod utils;

pub mod prelude {
    pub use crate::filters::sigma::*;
    pub use crate::filters::tracker::*;
    pub use crate::filters::ukf::*;
    pub use crate::models::*;
    pub use crate::types::measurement::*;
    pub use crate::types::spaces::*;
    pub use crate::utils::*;
    pub use crate::{Result, TrackError};
}

/// Error types for the library
#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    /// A tuning parameter is outside its valid range
    InvalidParameter(&'static str),
    /// A covariance matrix lost positive definiteness
    NotPositiveDefinite(&'static str),
    /// Matrix is singular and cannot be inverted
    SingularMatrix(&'static str),
    /// An evaluation sequence was empty
    EmptySequence,
    /// Evaluation sequences have different lengths
    LengthMismatch {
        /// Number of estimation vectors supplied
        estimations: usize,
        /// Number of ground truth vectors supplied
        ground_truth: usize,
    },
}

#[cfg(feature = "std")]
impl std::error::Error for TrackError {}

impl ::core::fmt::Display for TrackError {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        match self {
            TrackError::InvalidParameter(what) => write!(f, "Invalid parameter: {}", what),
            TrackError::NotPositiveDefinite(what) => {
                write!(f, "Matrix is not positive definite: {}", what)
            }
            TrackError::SingularMatrix(what) => write!(f, "Matrix is singular: {}", what),
            TrackError::EmptySequence => write!(f, "Evaluation sequence is empty"),
            TrackError::LengthMismatch {
                estimations,
                ground_truth,
            } => write!(
                f,
                "Sequence lengths differ: {} estimations vs {} ground truth",
                estimations, ground_truth
            ),
        }
    }
}

pub type Result<T> = ::core::result::Result<T, TrackError>;
