/// Redis-backed caching for yatube-service
pub mod page_cache;

pub use page_cache::PageCache;
