//! Snapshot assembly and the trade decision engine.

pub mod decision;
pub mod snapshot;

pub use decision::{decide, decide_snapshot};
pub use snapshot::{SnapshotBuilder, DEFAULT_CANDLE_LIMIT};
