pub mod reorder;
pub mod store;
pub mod views;

pub use store::{CategoryRemoval, ListenerId, LookupError, StoreEvent, TaskStore};
