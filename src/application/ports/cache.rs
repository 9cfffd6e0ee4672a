use crate::domain::entities::SharedArticle;
use async_trait::async_trait;

/// 記事エンティティ用のキャッシュポート
///
/// 共有ハンドルを保持するため、ヒットした呼び出し側と保留中の
/// フラッシュバッチは同じ記事実体を見る。
#[async_trait]
pub trait ArticleCache: Send + Sync {
    /// ID でキャッシュを検索
    async fn get(&self, id: &str) -> Option<SharedArticle>;

    /// 記事をキャッシュに追加（キーは記事自身の ID）
    async fn set(&self, article: SharedArticle);

    /// キャッシュから記事を削除
    async fn remove(&self, id: &str) -> Option<SharedArticle>;
}
