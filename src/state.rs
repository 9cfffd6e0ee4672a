use crate::application::services::{
    ArticleViewService, CounterMutationService, ViewFlushHandler, ViewFlushStats,
};
use crate::infrastructure::batch::CoalescingBatcher;
use crate::infrastructure::cache::ArticleCacheService;
use crate::infrastructure::database::{ConnectionPool, SqliteRepository};
use crate::infrastructure::locking::MutationGuard;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;

/// アプリケーション全体の状態を管理する構造体
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repository: Arc<SqliteRepository>,
    pub article_cache: Arc<ArticleCacheService>,
    pub mutation_guard: Arc<MutationGuard>,
    pub view_flush_stats: Arc<ViewFlushStats>,
    pub view_service: Arc<ArticleViewService>,
    pub mutation_service: Arc<CounterMutationService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("view_flush_stats", &self.view_flush_stats)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        if let Err(message) = config.validate() {
            return Err(AppError::Configuration(message).into());
        }

        // Create data directory if it doesn't exist
        std::fs::create_dir_all("./data")?;

        // データベース
        let pool =
            ConnectionPool::new(&config.database.url, config.database.max_connections).await?;
        let repository = Arc::new(SqliteRepository::new(pool));
        repository.initialize().await?;

        // キャッシュとロック
        let article_cache = Arc::new(ArticleCacheService::new(config.cache.article_ttl_secs));
        let mutation_guard = Arc::new(MutationGuard::new(config.locking.per_article));

        // 閲覧数のバッチ書き込み
        let view_flush_stats = Arc::new(ViewFlushStats::default());
        let flush_handler = Arc::new(ViewFlushHandler::new(
            repository.clone(),
            mutation_guard.clone(),
            view_flush_stats.clone(),
        ));
        let batcher = Arc::new(CoalescingBatcher::new(
            config.view_flush.threshold,
            flush_handler,
        ));

        let view_service = Arc::new(ArticleViewService::new(
            repository.clone(),
            repository.clone(),
            repository.clone(),
            repository.clone(),
            article_cache.clone(),
            batcher,
            view_flush_stats.clone(),
            config.listing.page_limit,
        ));
        let mutation_service = Arc::new(CounterMutationService::new(
            repository.clone(),
            repository.clone(),
            mutation_guard.clone(),
        ));

        Ok(Self {
            config,
            repository,
            article_cache,
            mutation_guard,
            view_flush_stats,
            view_service,
            mutation_service,
        })
    }

    /// 接続の生存確認。ヘルスチェック用
    pub async fn health_check(&self) -> anyhow::Result<()> {
        if !self.repository.health_check().await? {
            return Err(anyhow::anyhow!("database health check failed"));
        }
        Ok(())
    }
}
