use crate::domain::entities::{Article, ArticlePage, Comment, Reply};
use crate::shared::error::Result;
use async_trait::async_trait;

/// 記事エンティティ用の永続化ポート
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// ID で記事を検索
    async fn find_by_id(&self, id: &str) -> Result<Option<Article>>;

    /// 記事一覧を新しい順に取得
    async fn list_page(&self, limit: u32, offset: u32) -> Result<ArticlePage>;

    /// 記事を追加。影響行数を返す
    async fn add(&self, article: &Article) -> Result<i64>;

    /// 閲覧数のみを書き戻す。影響行数を返す
    async fn update_view_count(&self, id: &str, view_count: u32) -> Result<i64>;
}

/// コメント用の読み取りポート
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Comment>>;

    /// 記事に紐づくコメントを古い順に取得（削除済みは除く）
    async fn list_by_article(&self, article_id: &str) -> Result<Vec<Comment>>;
}

/// 返信用の読み取りポート
#[async_trait]
pub trait ReplyRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Reply>>;

    /// 記事に紐づく返信を古い順に取得
    async fn list_by_article(&self, article_id: &str) -> Result<Vec<Reply>>;
}

/// いいね履歴の読み取りポート
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// 指定ユーザーが記事をいいね済みか
    async fn exists(&self, article_id: &str, user_id: &str) -> Result<bool>;
}
