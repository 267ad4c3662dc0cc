// Signals module - frame validation, the logical transform and state diffing
pub mod frame;
pub mod key;
pub mod store;

pub use frame::InboundFrame;
pub use key::SignalKey;
pub use store::{SignalSet, SignalStore, apply};
