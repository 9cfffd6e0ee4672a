pub mod article_cache;
pub mod memory_cache;

pub use article_cache::ArticleCacheService;
pub use memory_cache::MemoryCacheService;
