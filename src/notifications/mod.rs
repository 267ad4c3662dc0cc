pub mod notification;
pub mod queue;

pub use notification::{Notification, NotificationKind};
pub use queue::NotificationQueue;
