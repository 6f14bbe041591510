//! Core type definitions.

mod email;
mod id;
mod realm;
mod status;

pub use email::{Email, EmailError};
pub use id::{MemberId, TaskId};
pub use realm::Realm;
pub use status::TaskStatus;
