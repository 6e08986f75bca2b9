pub mod error;
pub mod store;

pub use error::AuthRejection;
pub use store::{SessionState, SessionStore};
