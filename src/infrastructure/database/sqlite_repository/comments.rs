use super::SqliteRepository;
use super::mapper::map_comment_row;
use super::queries::{SELECT_COMMENT_BY_ID, SELECT_COMMENTS_BY_ARTICLE};
use crate::application::ports::repositories::CommentRepository;
use crate::domain::entities::Comment;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
impl CommentRepository for SqliteRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Comment>, AppError> {
        let row = sqlx::query(SELECT_COMMENT_BY_ID)
            .bind(id)
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(map_comment_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_article(&self, article_id: &str) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query(SELECT_COMMENTS_BY_ARTICLE)
            .bind(article_id)
            .fetch_all(self.pool.get_pool())
            .await?;

        let mut comments = Vec::with_capacity(rows.len());
        for row in rows {
            comments.push(map_comment_row(&row)?);
        }

        Ok(comments)
    }
}
