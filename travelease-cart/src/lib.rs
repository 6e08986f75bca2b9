pub mod store;

pub use store::CartStore;
pub use travelease_shared::{BookableItem, EntityId, ItemType, LineItem, LineKey};
