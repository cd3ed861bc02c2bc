//! Shop records and the collaborators that supply them.
//!
//! # Overview
//!
//! - [`Shop`]: the persisted record for one installation
//! - [`ShopStore`]: get-or-create access to shops, implemented by the host app
//! - [`MemoryShopStore`]: in-memory store with soft deletes
//! - [`ShopSession`]: the request's ambient shop domain
//! - [`StaticSession`]: a fixed-value session

mod model;
mod session;
mod store;

pub use model::Shop;
pub use session::{ShopSession, StaticSession};
pub use store::{MemoryShopStore, ShopStore, StoreError};
