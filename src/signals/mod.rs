pub mod classifier;
pub mod sizing;
pub mod tracker;
pub mod types;

pub use classifier::{classify, Classification};
pub use sizing::{BandExitPolicy, ExitLevels, ExitPolicy};
pub use tracker::SignalBook;
pub use types::{CloseReason, Signal, SignalEvent, SignalKind, SignalStrength};
