use crate::application::ports::cache::ArticleCache;
use crate::domain::entities::SharedArticle;
use crate::infrastructure::cache::memory_cache::MemoryCacheService;

use async_trait::async_trait;

/// 記事キャッシュサービス
///
/// 値は共有ハンドルなので、ヒットを書き換えると保留中の
/// フラッシュバッチからも同じ変更が見える。
pub struct ArticleCacheService {
    cache: MemoryCacheService<SharedArticle>,
}

impl ArticleCacheService {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            cache: MemoryCacheService::new(ttl_seconds),
        }
    }

    fn cache_key(id: &str) -> String {
        format!("article:{id}")
    }

    /// 記事をキャッシュに追加
    pub async fn cache_article(&self, article: SharedArticle) {
        let key = Self::cache_key(&article.read().await.id);
        self.cache.set(key, article).await;
    }

    /// IDで記事を取得
    pub async fn get_article(&self, id: &str) -> Option<SharedArticle> {
        self.cache.get(&Self::cache_key(id)).await
    }

    /// 記事をキャッシュから外す
    pub async fn invalidate(&self, id: &str) -> Option<SharedArticle> {
        self.cache.delete(&Self::cache_key(id)).await
    }
}

#[async_trait]
impl ArticleCache for ArticleCacheService {
    async fn get(&self, id: &str) -> Option<SharedArticle> {
        self.get_article(id).await
    }

    async fn set(&self, article: SharedArticle) {
        self.cache_article(article).await;
    }

    async fn remove(&self, id: &str) -> Option<SharedArticle> {
        self.invalidate(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Article;

    fn create_test_article(id: &str) -> SharedArticle {
        let mut article = Article::new(
            "Test title".to_string(),
            "Test summary".to_string(),
            "Test content".to_string(),
        );
        article.id = id.to_string();
        article.into_shared()
    }

    #[tokio::test]
    async fn test_cache_and_get() {
        let cache = ArticleCacheService::new(60);

        cache.cache_article(create_test_article("a1")).await;
        let hit = cache.get_article("a1").await;

        assert!(hit.is_some());
        assert_eq!(hit.unwrap().read().await.id, "a1");
        assert!(cache.get_article("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_hit_returns_same_handle() {
        let cache = ArticleCacheService::new(60);
        let article = create_test_article("a1");

        cache.cache_article(article.clone()).await;
        let hit = cache.get_article("a1").await.expect("cache hit");

        hit.write().await.increment_views();
        assert_eq!(article.read().await.view_count, 1);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = ArticleCacheService::new(60);

        cache.cache_article(create_test_article("a1")).await;
        assert!(cache.invalidate("a1").await.is_some());
        assert!(cache.get_article("a1").await.is_none());
    }
}
