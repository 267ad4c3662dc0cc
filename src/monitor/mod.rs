// Module declarations
mod builder;
mod core;
mod router;

// Public API exports
pub use builder::SignalMonitorBuilder;
pub use core::SignalMonitor;
pub use router::FrameRouter;
