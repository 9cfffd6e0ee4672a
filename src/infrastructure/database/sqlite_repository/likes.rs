use super::SqliteRepository;
use super::queries::COUNT_LIKES_BY_ARTICLE_AND_USER;
use crate::application::ports::repositories::LikeRepository;
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::Row;

#[async_trait]
impl LikeRepository for SqliteRepository {
    async fn exists(&self, article_id: &str, user_id: &str) -> Result<bool, AppError> {
        let row = sqlx::query(COUNT_LIKES_BY_ARTICLE_AND_USER)
            .bind(article_id)
            .bind(user_id)
            .fetch_one(self.pool.get_pool())
            .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count > 0)
    }
}
