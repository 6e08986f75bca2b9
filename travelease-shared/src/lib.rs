pub mod models;
pub mod pii;

pub use models::{
    BookableItem, EntityId, ItemType, LineItem, LineKey, ParseItemTypeError, SessionId, SessionRecord,
};
pub use pii::Masked;
