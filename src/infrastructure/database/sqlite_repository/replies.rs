use super::SqliteRepository;
use super::mapper::map_reply_row;
use super::queries::{SELECT_REPLIES_BY_ARTICLE, SELECT_REPLY_BY_ID};
use crate::application::ports::repositories::ReplyRepository;
use crate::domain::entities::Reply;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
impl ReplyRepository for SqliteRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Reply>, AppError> {
        let row = sqlx::query(SELECT_REPLY_BY_ID)
            .bind(id)
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(map_reply_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_article(&self, article_id: &str) -> Result<Vec<Reply>, AppError> {
        let rows = sqlx::query(SELECT_REPLIES_BY_ARTICLE)
            .bind(article_id)
            .fetch_all(self.pool.get_pool())
            .await?;

        let mut replies = Vec::with_capacity(rows.len());
        for row in rows {
            replies.push(map_reply_row(&row)?);
        }

        Ok(replies)
    }
}
