pub mod cache;
pub mod types;

pub use cache::{CatalogCache, PreparedItem};
pub use types::{CatalogItem, ClientItemHistory};
