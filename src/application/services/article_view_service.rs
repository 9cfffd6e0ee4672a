use crate::application::ports::cache::ArticleCache;
use crate::application::ports::repositories::{
    ArticleRepository, CommentRepository, LikeRepository, ReplyRepository,
};
use crate::domain::entities::{Article, ArticlePage, Comment, Reply, SharedArticle};
use crate::infrastructure::batch::{CoalescingBatcher, FlushHandler};
use crate::infrastructure::locking::MutationGuard;
use crate::shared::error::{AppError, Result};
use crate::shared::validation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::error;

/// One comment with the replies hanging under it, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Reply>,
}

/// Everything the article page renders in one response.
///
/// `article.view_count` is the in-memory count and may be ahead of what
/// was last flushed to the durable store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDisplay {
    pub article: Article,
    pub thread: Vec<CommentThread>,
    pub viewer_has_liked: bool,
}

#[derive(Debug, Default)]
pub struct ViewFlushStats {
    flushes_succeeded: AtomicU64,
    flushes_failed: AtomicU64,
    events_coalesced: AtomicU64,
    events_dropped: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFlushStatsSnapshot {
    pub flushes_succeeded: u64,
    pub flushes_failed: u64,
    pub events_coalesced: u64,
    pub events_dropped: u64,
}

impl ViewFlushStats {
    fn record_success(&self, events: usize) {
        self.flushes_succeeded.fetch_add(1, Ordering::Relaxed);
        self.events_coalesced
            .fetch_add(events as u64, Ordering::Relaxed);
    }

    fn record_failure(&self, events: usize) {
        self.flushes_failed.fetch_add(1, Ordering::Relaxed);
        self.events_dropped
            .fetch_add(events as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ViewFlushStatsSnapshot {
        ViewFlushStatsSnapshot {
            flushes_succeeded: self.flushes_succeeded.load(Ordering::Relaxed),
            flushes_failed: self.flushes_failed.load(Ordering::Relaxed),
            events_coalesced: self.events_coalesced.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Writes the newest in-memory view count back to the durable store when
/// a batch of view events comes due.
pub struct ViewFlushHandler {
    repository: Arc<dyn ArticleRepository>,
    guard: Arc<MutationGuard>,
    stats: Arc<ViewFlushStats>,
}

impl ViewFlushHandler {
    pub fn new(
        repository: Arc<dyn ArticleRepository>,
        guard: Arc<MutationGuard>,
        stats: Arc<ViewFlushStats>,
    ) -> Self {
        Self {
            repository,
            guard,
            stats,
        }
    }

    async fn persist_latest(&self, identity: &str, events: &[SharedArticle]) -> Result<()> {
        let handle = match events.last() {
            Some(handle) => handle.clone(),
            None => return Ok(()),
        };
        let repository = self.repository.clone();
        let article_id = identity.to_string();

        self.guard
            .with_lock(identity, || async move {
                // Read the counter inside the lock so the value written is
                // the one current at write time.
                let view_count = handle.read().await.view_count;
                let affected = repository.update_view_count(&article_id, view_count).await?;
                if affected <= 0 {
                    return Err(AppError::Persistence(format!(
                        "view count write for article {article_id} affected no rows"
                    )));
                }
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl FlushHandler<SharedArticle> for ViewFlushHandler {
    async fn on_flush(&self, identity: &str, events: Vec<SharedArticle>) -> Result<()> {
        let batch_size = events.len();
        match self.persist_latest(identity, &events).await {
            Ok(()) => self.stats.record_success(batch_size),
            Err(err) => {
                // View-count loss is tolerated; the request that tipped the
                // flush over must still succeed.
                self.stats.record_failure(batch_size);
                error!(
                    error = %err,
                    article_id = identity,
                    "view count flush failed, dropping batch"
                );
            }
        }
        Ok(())
    }
}

/// Read path: cache lookup, durable fallback, view-count accounting.
pub struct ArticleViewService {
    repository: Arc<dyn ArticleRepository>,
    comments: Arc<dyn CommentRepository>,
    replies: Arc<dyn ReplyRepository>,
    likes: Arc<dyn LikeRepository>,
    cache: Arc<dyn ArticleCache>,
    batcher: Arc<CoalescingBatcher<SharedArticle>>,
    stats: Arc<ViewFlushStats>,
    page_limit: u32,
}

impl ArticleViewService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repository: Arc<dyn ArticleRepository>,
        comments: Arc<dyn CommentRepository>,
        replies: Arc<dyn ReplyRepository>,
        likes: Arc<dyn LikeRepository>,
        cache: Arc<dyn ArticleCache>,
        batcher: Arc<CoalescingBatcher<SharedArticle>>,
        stats: Arc<ViewFlushStats>,
        page_limit: u32,
    ) -> Self {
        Self {
            repository,
            comments,
            replies,
            likes,
            cache,
            batcher,
            stats,
            page_limit,
        }
    }

    fn normalize_article_id(raw: &str) -> Result<String> {
        validation::check_id(raw).map_err(AppError::Validation)
    }

    /// Returns the article for rendering, counting this call as one view.
    ///
    /// The increment happens on the shared in-memory handle; the durable
    /// store catches up when the flush threshold is crossed, possibly
    /// synchronously inside this call.
    pub async fn get_article_for_display(
        &self,
        raw_id: &str,
        viewer: Option<&str>,
    ) -> Result<ArticleDisplay> {
        let article_id = Self::normalize_article_id(raw_id)?;

        let handle = self.resolve_article(&article_id).await?;
        handle.write().await.increment_views();
        // 閲覧のたびに入れ直して有効期限を更新する
        self.cache.set(handle.clone()).await;
        self.batcher.record(&article_id, handle.clone()).await?;

        let article = handle.read().await.clone();
        let thread = self.load_thread(&article_id).await?;
        let viewer_has_liked = match viewer {
            Some(user_id) => self.likes.exists(&article_id, user_id).await?,
            None => false,
        };

        Ok(ArticleDisplay {
            article,
            thread,
            viewer_has_liked,
        })
    }

    /// 記事一覧。`limit` は設定の上限でクランプしてから問い合わせる
    pub async fn list_articles(&self, limit: u32, offset: u32) -> Result<ArticlePage> {
        let limit = limit.clamp(1, self.page_limit);
        self.repository.list_page(limit, offset).await
    }

    pub fn flush_stats(&self) -> ViewFlushStatsSnapshot {
        self.stats.snapshot()
    }

    async fn resolve_article(&self, article_id: &str) -> Result<SharedArticle> {
        if let Some(handle) = self.cache.get(article_id).await {
            return Ok(handle);
        }

        let article = self
            .repository
            .find_by_id(article_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("article {article_id} not found")))?;
        Ok(article.into_shared())
    }

    async fn load_thread(&self, article_id: &str) -> Result<Vec<CommentThread>> {
        let comments = self.comments.list_by_article(article_id).await?;
        let replies = self.replies.list_by_article(article_id).await?;

        let mut grouped: HashMap<String, Vec<Reply>> = HashMap::new();
        for reply in replies {
            grouped
                .entry(reply.comment_id.clone())
                .or_default()
                .push(reply);
        }

        let mut thread = Vec::with_capacity(comments.len());
        for comment in comments {
            let replies = grouped.remove(&comment.id).unwrap_or_default();
            thread.push(CommentThread { comment, replies });
        }

        Ok(thread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ReplyKind;
    use crate::infrastructure::cache::ArticleCacheService;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio::time::sleep;

    struct TestArticleRepository {
        articles: Mutex<HashMap<String, Article>>,
        find_calls: Mutex<Vec<String>>,
        update_calls: Mutex<Vec<(String, u32)>>,
        list_calls: Mutex<Vec<(u32, u32)>>,
        fail_update: Mutex<bool>,
    }

    impl TestArticleRepository {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                articles: Mutex::new(HashMap::new()),
                find_calls: Mutex::new(Vec::new()),
                update_calls: Mutex::new(Vec::new()),
                list_calls: Mutex::new(Vec::new()),
                fail_update: Mutex::new(false),
            })
        }

        async fn seed(&self, article: Article) {
            self.articles
                .lock()
                .await
                .insert(article.id.clone(), article);
        }

        async fn set_update_failure(&self, fail: bool) {
            *self.fail_update.lock().await = fail;
        }

        async fn update_calls(&self) -> Vec<(String, u32)> {
            self.update_calls.lock().await.clone()
        }

        async fn find_call_count(&self) -> usize {
            self.find_calls.lock().await.len()
        }

        async fn stored_view_count(&self, id: &str) -> Option<u32> {
            self.articles
                .lock()
                .await
                .get(id)
                .map(|article| article.view_count)
        }
    }

    #[async_trait]
    impl ArticleRepository for TestArticleRepository {
        async fn find_by_id(&self, id: &str) -> Result<Option<Article>> {
            self.find_calls.lock().await.push(id.to_string());
            Ok(self.articles.lock().await.get(id).cloned())
        }

        async fn list_page(&self, limit: u32, offset: u32) -> Result<ArticlePage> {
            self.list_calls.lock().await.push((limit, offset));
            Ok(ArticlePage {
                total: self.articles.lock().await.len() as u32,
                items: Vec::new(),
            })
        }

        async fn add(&self, article: &Article) -> Result<i64> {
            self.seed(article.clone()).await;
            Ok(1)
        }

        async fn update_view_count(&self, id: &str, view_count: u32) -> Result<i64> {
            if *self.fail_update.lock().await {
                return Err(AppError::Database("connection lost".to_string()));
            }
            self.update_calls
                .lock()
                .await
                .push((id.to_string(), view_count));
            let mut articles = self.articles.lock().await;
            match articles.get_mut(id) {
                Some(article) => {
                    article.view_count = view_count;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    struct TestCommentRepository {
        comments: Vec<Comment>,
    }

    #[async_trait]
    impl CommentRepository for TestCommentRepository {
        async fn find_by_id(&self, id: &str) -> Result<Option<Comment>> {
            Ok(self
                .comments
                .iter()
                .find(|comment| comment.id == id)
                .cloned())
        }

        async fn list_by_article(&self, article_id: &str) -> Result<Vec<Comment>> {
            Ok(self
                .comments
                .iter()
                .filter(|comment| comment.article_id == article_id && !comment.is_deleted)
                .cloned()
                .collect())
        }
    }

    struct TestReplyRepository {
        replies: Vec<Reply>,
    }

    #[async_trait]
    impl ReplyRepository for TestReplyRepository {
        async fn find_by_id(&self, id: &str) -> Result<Option<Reply>> {
            Ok(self.replies.iter().find(|reply| reply.id == id).cloned())
        }

        async fn list_by_article(&self, article_id: &str) -> Result<Vec<Reply>> {
            Ok(self
                .replies
                .iter()
                .filter(|reply| reply.article_id == article_id)
                .cloned()
                .collect())
        }
    }

    struct TestLikeRepository {
        liked: Vec<(String, String)>,
    }

    #[async_trait]
    impl LikeRepository for TestLikeRepository {
        async fn exists(&self, article_id: &str, user_id: &str) -> Result<bool> {
            Ok(self
                .liked
                .iter()
                .any(|(article, user)| article == article_id && user == user_id))
        }
    }

    fn sample_article(id: &str) -> Article {
        let mut article = Article::new(
            "Morning pages".to_string(),
            "On keeping a journal".to_string(),
            "Full text".to_string(),
        );
        article.id = id.to_string();
        article
    }

    struct ViewServiceSetup {
        service: ArticleViewService,
        repository: Arc<TestArticleRepository>,
        stats: Arc<ViewFlushStats>,
    }

    async fn setup_view_service(threshold: usize) -> ViewServiceSetup {
        build_view_service(threshold, 60, Vec::new(), Vec::new(), Vec::new()).await
    }

    async fn setup_view_service_with_ttl(threshold: usize, ttl_seconds: u64) -> ViewServiceSetup {
        build_view_service(threshold, ttl_seconds, Vec::new(), Vec::new(), Vec::new()).await
    }

    async fn setup_view_service_with_thread(
        threshold: usize,
        comments: Vec<Comment>,
        replies: Vec<Reply>,
        liked: Vec<(String, String)>,
    ) -> ViewServiceSetup {
        build_view_service(threshold, 60, comments, replies, liked).await
    }

    async fn build_view_service(
        threshold: usize,
        ttl_seconds: u64,
        comments: Vec<Comment>,
        replies: Vec<Reply>,
        liked: Vec<(String, String)>,
    ) -> ViewServiceSetup {
        let repository = TestArticleRepository::new();
        let stats = Arc::new(ViewFlushStats::default());
        let guard = Arc::new(MutationGuard::new(false));
        let handler = Arc::new(ViewFlushHandler::new(
            repository.clone(),
            guard,
            stats.clone(),
        ));
        let batcher = Arc::new(CoalescingBatcher::new(
            threshold,
            handler as Arc<dyn FlushHandler<SharedArticle>>,
        ));

        let service = ArticleViewService::new(
            repository.clone(),
            Arc::new(TestCommentRepository { comments }),
            Arc::new(TestReplyRepository { replies }),
            Arc::new(TestLikeRepository { liked }),
            Arc::new(ArticleCacheService::new(ttl_seconds)),
            batcher,
            stats.clone(),
            10,
        );

        ViewServiceSetup {
            service,
            repository,
            stats,
        }
    }

    #[tokio::test]
    async fn each_display_increments_the_cached_view_count() {
        let setup = setup_view_service(10).await;
        setup.repository.seed(sample_article("a1")).await;

        let first = setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("first view");
        let second = setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("second view");

        assert_eq!(first.article.view_count, 1);
        assert_eq!(second.article.view_count, 2);
        // しきい値未満なのでまだ書き戻されていない
        assert!(setup.repository.update_calls().await.is_empty());
    }

    #[tokio::test]
    async fn cache_miss_fetches_once_then_serves_from_cache() {
        let setup = setup_view_service(10).await;
        setup.repository.seed(sample_article("a1")).await;

        for _ in 0..3 {
            setup
                .service
                .get_article_for_display("a1", None)
                .await
                .expect("view");
        }

        assert_eq!(setup.repository.find_call_count().await, 1);
    }

    #[tokio::test]
    async fn steady_views_extend_the_cache_window_past_the_first_expiry() {
        let setup = setup_view_service_with_ttl(10, 1).await;
        setup.repository.seed(sample_article("a1")).await;

        setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("first view");
        sleep(Duration::from_millis(600)).await;
        setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("second view");
        sleep(Duration::from_millis(600)).await;

        // 最初の有効期限は過ぎているが、2 回目の閲覧が窓を延長している
        let third = setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("third view");

        assert_eq!(third.article.view_count, 3);
        assert_eq!(setup.repository.find_call_count().await, 1);
    }

    #[tokio::test]
    async fn idle_gap_expires_the_entry_and_the_next_view_refetches() {
        let setup = setup_view_service_with_ttl(10, 1).await;
        setup.repository.seed(sample_article("a1")).await;

        setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("first view");
        sleep(Duration::from_millis(1300)).await;

        // 期限切れ後はストアから取り直すので未フラッシュ分の増分は消える
        let after_gap = setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("view after gap");
        assert_eq!(setup.repository.find_call_count().await, 2);
        assert_eq!(after_gap.article.view_count, 1);

        // 取り直した実体は再キャッシュされている
        let next = setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("next view");
        assert_eq!(setup.repository.find_call_count().await, 2);
        assert_eq!(next.article.view_count, 2);
    }

    #[tokio::test]
    async fn blank_id_is_rejected_before_any_lookup() {
        let setup = setup_view_service(10).await;

        let err = setup
            .service
            .get_article_for_display("   ", None)
            .await
            .expect_err("blank id");

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(setup.repository.find_call_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_article_is_not_found() {
        let setup = setup_view_service(10).await;

        let err = setup
            .service
            .get_article_for_display("missing", None)
            .await
            .expect_err("missing article");

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn surrounding_whitespace_resolves_to_the_same_article() {
        let setup = setup_view_service(10).await;
        setup.repository.seed(sample_article("a1")).await;

        setup
            .service
            .get_article_for_display("  a1  ", None)
            .await
            .expect("padded id");
        let display = setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("bare id");

        assert_eq!(display.article.view_count, 2);
        assert_eq!(setup.repository.find_call_count().await, 1);
    }

    #[tokio::test]
    async fn threshold_crossing_flushes_the_latest_count_exactly_once() {
        let setup = setup_view_service(3).await;
        setup.repository.seed(sample_article("a1")).await;

        for _ in 0..3 {
            setup
                .service
                .get_article_for_display("a1", None)
                .await
                .expect("view");
        }
        assert_eq!(
            setup.repository.update_calls().await,
            vec![("a1".to_string(), 3)]
        );
        assert_eq!(setup.repository.stored_view_count("a1").await, Some(3));

        for _ in 0..3 {
            setup
                .service
                .get_article_for_display("a1", None)
                .await
                .expect("view");
        }
        assert_eq!(
            setup.repository.update_calls().await,
            vec![("a1".to_string(), 3), ("a1".to_string(), 6)]
        );

        let stats = setup.stats.snapshot();
        assert_eq!(stats.flushes_succeeded, 2);
        assert_eq!(stats.events_coalesced, 6);
        assert_eq!(stats.flushes_failed, 0);
    }

    #[tokio::test]
    async fn failed_flush_is_swallowed_and_the_request_succeeds() {
        let setup = setup_view_service(1).await;
        setup.repository.seed(sample_article("a1")).await;
        setup.repository.set_update_failure(true).await;

        let display = setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("request must succeed despite flush failure");

        assert_eq!(display.article.view_count, 1);
        let stats = setup.stats.snapshot();
        assert_eq!(stats.flushes_failed, 1);
        assert_eq!(stats.events_dropped, 1);
        assert_eq!(stats.flushes_succeeded, 0);

        // 失われたイベントは積み直されず、次の閲覧から数え直す
        setup.repository.set_update_failure(false).await;
        setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("view");
        assert_eq!(
            setup.repository.update_calls().await,
            vec![("a1".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn list_articles_clamps_the_page_size() {
        let setup = setup_view_service(10).await;

        setup.service.list_articles(50, 0).await.expect("list");
        setup.service.list_articles(0, 20).await.expect("list");

        let calls = setup.repository.list_calls.lock().await.clone();
        assert_eq!(calls, vec![(10, 0), (1, 20)]);
    }

    #[tokio::test]
    async fn thread_groups_replies_under_their_comment() {
        let comment_a = Comment::new("a1".to_string(), "u1".to_string(), "first".to_string());
        let comment_b = Comment::new("a1".to_string(), "u2".to_string(), "second".to_string());
        let reply = Reply::new(
            "a1".to_string(),
            comment_a.id.clone(),
            None,
            "u3".to_string(),
            "welcome".to_string(),
            ReplyKind::ToComment,
        );

        let setup = setup_view_service_with_thread(
            10,
            vec![comment_a.clone(), comment_b.clone()],
            vec![reply.clone()],
            vec![("a1".to_string(), "u3".to_string())],
        )
        .await;
        setup.repository.seed(sample_article("a1")).await;

        let display = setup
            .service
            .get_article_for_display("a1", Some("u3"))
            .await
            .expect("view");

        assert_eq!(display.thread.len(), 2);
        assert_eq!(display.thread[0].comment.id, comment_a.id);
        assert_eq!(display.thread[0].replies.len(), 1);
        assert_eq!(display.thread[0].replies[0].id, reply.id);
        assert!(display.thread[1].replies.is_empty());
        assert!(display.viewer_has_liked);
    }

    #[tokio::test]
    async fn viewer_flag_is_false_for_anonymous_readers() {
        let setup = setup_view_service_with_thread(
            10,
            Vec::new(),
            Vec::new(),
            vec![("a1".to_string(), "u1".to_string())],
        )
        .await;
        setup.repository.seed(sample_article("a1")).await;

        let display = setup
            .service
            .get_article_for_display("a1", None)
            .await
            .expect("view");
        assert!(!display.viewer_has_liked);

        let display = setup
            .service
            .get_article_for_display("a1", Some("someone-else"))
            .await
            .expect("view");
        assert!(!display.viewer_has_liked);
    }
}
