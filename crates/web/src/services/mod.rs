//! Application services.

pub mod auth;
pub mod notify;
pub mod tasks;

pub use auth::AuthService;
pub use notify::{Channel, NotificationPipeline, NotificationRequest, NotifyError, SnsChannel};
pub use tasks::TaskWorkflow;
