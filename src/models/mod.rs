//! Motion and sensor models for target tracking
//!
//! This module defines the CTRV target dynamics and the sensor models
//! consumed by the unscented measurement update.

mod motion;
mod observation;

pub use motion::*;
pub use observation::*;
