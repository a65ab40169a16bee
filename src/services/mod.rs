pub mod catalog;
pub use catalog::{Catalog, CatalogEntry, CatalogLoader};

pub mod search;
pub use search::{SearchResult, SearchService, SearchSettings};
