use crate::domain::entities::{Article, ArticleLike, Author, Comment, Reply};
use crate::shared::error::Result;
use async_trait::async_trait;

/// カウンター更新を伴う書き込みのトランザクション境界
#[async_trait]
pub trait MutationUnitOfWork: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn MutationTransaction>>;
}

/// 単一トランザクション内の操作。`commit` を呼ばずに drop すると
/// ロールバックされる。
#[async_trait]
pub trait MutationTransaction: Send {
    async fn find_article(&mut self, id: &str) -> Result<Option<Article>>;

    async fn find_comment(&mut self, id: &str) -> Result<Option<Comment>>;

    async fn find_reply(&mut self, id: &str) -> Result<Option<Reply>>;

    /// 投稿者を登録または更新。影響行数を返す
    async fn upsert_author(&mut self, author: &Author) -> Result<i64>;

    async fn insert_comment(&mut self, comment: &Comment) -> Result<i64>;

    async fn insert_reply(&mut self, reply: &Reply) -> Result<i64>;

    async fn insert_like(&mut self, like: &ArticleLike) -> Result<i64>;

    /// コメントを論理削除。既に削除済みなら 0 を返す
    async fn mark_comment_deleted(&mut self, id: &str) -> Result<i64>;

    /// コメント数・いいね数・更新日時を書き戻す
    async fn update_article_counters(&mut self, article: &Article) -> Result<i64>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
