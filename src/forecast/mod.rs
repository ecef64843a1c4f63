//! Cross-rate forecasting: leg construction, synthesis and timeline bridging.

pub mod bridge;
pub mod leg;
pub mod synth;

pub use bridge::bridge;
pub use leg::{LegParams, build_leg};
pub use synth::synthesize;
