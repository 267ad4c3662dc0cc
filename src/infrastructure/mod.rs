// Infrastructure module - timers, task tracking and HTTP plumbing shared by the components
pub mod backoff;
pub mod heartbeat;
pub mod http;
pub mod task_manager;

pub use backoff::Backoff;
pub use heartbeat::{Heartbeat, HeartbeatEvent};
pub use http::HttpLogSource;
pub use task_manager::TaskManager;
