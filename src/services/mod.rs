// Service exports
pub mod backend;
pub mod identity;

pub use backend::{BackendClient, BackendError, UserRecord};
pub use identity::{Claims, IdentityError, IdentityResolver};
