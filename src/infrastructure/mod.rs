pub mod content_cache;
pub mod page_fetcher;

pub use content_cache::{CachedData, ContentCache};
pub use page_fetcher::{HttpPageFetcher, PageFetcher};
