//! Market structure and trend-following overlays

pub mod parabolic_sar;
pub mod supertrend;
pub mod support_resistance;

pub use parabolic_sar::*;
pub use supertrend::*;
pub use support_resistance::*;
