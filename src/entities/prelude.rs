pub use super::search_cache::Entity as SearchCache;
