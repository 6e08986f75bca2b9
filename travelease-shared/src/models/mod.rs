pub mod cart;
pub mod session;

pub use cart::{BookableItem, EntityId, ItemType, LineItem, LineKey, ParseItemTypeError};
pub use session::{SessionId, SessionRecord};
