//! State estimation for a single maneuvering target
//!
//! The filtering stack has three layers:
//!
//! - [`sigma`]: augmented sigma point generation and recovery
//! - [`ukf::UnscentedKalmanFilter`]: pure predict/update steps over beliefs
//! - [`tracker::Tracker`]: measurement-driven controller that owns the track

pub mod sigma;
pub mod tracker;
pub mod ukf;
