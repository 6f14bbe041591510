//! Domain models for the web crate.

pub mod member;
pub mod session;
pub mod task;

pub use member::{Member, NewMember};
pub use session::{AuthCorrelation, Identity, keys as session_keys};
pub use task::{NewTask, Task};
