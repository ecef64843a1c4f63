//! Prediction auditing: trust classification, resolution, scoreboard.

pub mod resolver;
pub mod scoreboard;
pub mod store;
pub mod trust;

pub use resolver::{ResolutionOutcome, ResolutionSummary, resolve_pending};
pub use scoreboard::scoreboard;
pub use store::{AuditStore, JsonAuditStore, MemoryAuditStore};
pub use trust::classify;
