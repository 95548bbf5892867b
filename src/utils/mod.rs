//! Utility functions for tracking
//!
//! Angle normalization plus accuracy and consistency metrics.

mod angle;
mod metrics;

pub use angle::*;
pub use metrics::*;
