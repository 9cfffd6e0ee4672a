use super::SqliteRepository;
use super::mapper::{map_article_row, map_comment_row, map_reply_row};
use super::queries::{
    INSERT_COMMENT, INSERT_LIKE, INSERT_REPLY, MARK_COMMENT_DELETED, SELECT_ARTICLE_BY_ID,
    SELECT_COMMENT_BY_ID, SELECT_REPLY_BY_ID, UPDATE_ARTICLE_COUNTERS, UPSERT_AUTHOR,
};
use crate::application::ports::unit_of_work::{MutationTransaction, MutationUnitOfWork};
use crate::domain::entities::{Article, ArticleLike, Author, Comment, Reply};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, Transaction};

/// 1 つの sqlx トランザクションを包む。`commit` せずに drop すると
/// ロールバックされる。
pub struct SqliteMutationTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl MutationUnitOfWork for SqliteRepository {
    async fn begin(&self) -> Result<Box<dyn MutationTransaction>, AppError> {
        let tx = self.pool.get_pool().begin().await?;
        Ok(Box::new(SqliteMutationTransaction { tx }))
    }
}

#[async_trait]
impl MutationTransaction for SqliteMutationTransaction {
    async fn find_article(&mut self, id: &str) -> Result<Option<Article>, AppError> {
        let row = sqlx::query(SELECT_ARTICLE_BY_ID)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        match row {
            Some(row) => Ok(Some(map_article_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_comment(&mut self, id: &str) -> Result<Option<Comment>, AppError> {
        let row = sqlx::query(SELECT_COMMENT_BY_ID)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        match row {
            Some(row) => Ok(Some(map_comment_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_reply(&mut self, id: &str) -> Result<Option<Reply>, AppError> {
        let row = sqlx::query(SELECT_REPLY_BY_ID)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        match row {
            Some(row) => Ok(Some(map_reply_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert_author(&mut self, author: &Author) -> Result<i64, AppError> {
        let result = sqlx::query(UPSERT_AUTHOR)
            .bind(&author.id)
            .bind(&author.name)
            .bind(author.site.as_deref())
            .bind(author.email.as_deref())
            .bind(author.is_admin as i64)
            .bind(author.created_at.timestamp_millis())
            .bind(author.updated_at.timestamp_millis())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() as i64)
    }

    async fn insert_comment(&mut self, comment: &Comment) -> Result<i64, AppError> {
        let result = sqlx::query(INSERT_COMMENT)
            .bind(&comment.id)
            .bind(&comment.article_id)
            .bind(&comment.author_id)
            .bind(&comment.content)
            .bind(comment.is_deleted as i64)
            .bind(comment.created_at.timestamp_millis())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() as i64)
    }

    async fn insert_reply(&mut self, reply: &Reply) -> Result<i64, AppError> {
        let result = sqlx::query(INSERT_REPLY)
            .bind(&reply.id)
            .bind(&reply.article_id)
            .bind(&reply.comment_id)
            .bind(reply.to_reply_id.as_deref())
            .bind(&reply.author_id)
            .bind(&reply.content)
            .bind(reply.kind.as_i64())
            .bind(reply.created_at.timestamp_millis())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() as i64)
    }

    async fn insert_like(&mut self, like: &ArticleLike) -> Result<i64, AppError> {
        let result = sqlx::query(INSERT_LIKE)
            .bind(&like.id)
            .bind(&like.article_id)
            .bind(&like.user_id)
            .bind(like.created_at.timestamp_millis())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() as i64)
    }

    async fn mark_comment_deleted(&mut self, id: &str) -> Result<i64, AppError> {
        let result = sqlx::query(MARK_COMMENT_DELETED)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() as i64)
    }

    async fn update_article_counters(&mut self, article: &Article) -> Result<i64, AppError> {
        let result = sqlx::query(UPDATE_ARTICLE_COUNTERS)
            .bind(&article.id)
            .bind(article.comment_count as i64)
            .bind(article.like_count as i64)
            .bind(Utc::now().timestamp_millis())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() as i64)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
