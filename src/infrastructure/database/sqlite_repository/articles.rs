use super::SqliteRepository;
use super::mapper::{map_article_row, map_article_summary_row};
use super::queries::{
    COUNT_ARTICLES, INSERT_ARTICLE, SELECT_ARTICLE_BY_ID, SELECT_ARTICLE_PAGE,
    UPDATE_ARTICLE_VIEW_COUNT,
};
use crate::application::ports::repositories::ArticleRepository;
use crate::domain::entities::{Article, ArticlePage};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

#[async_trait]
impl ArticleRepository for SqliteRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Article>, AppError> {
        let row = sqlx::query(SELECT_ARTICLE_BY_ID)
            .bind(id)
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(map_article_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_page(&self, limit: u32, offset: u32) -> Result<ArticlePage, AppError> {
        let count_row = sqlx::query(COUNT_ARTICLES)
            .fetch_one(self.pool.get_pool())
            .await?;
        let total_raw: i64 = count_row.try_get("count")?;

        let rows = sqlx::query(SELECT_ARTICLE_PAGE)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(self.pool.get_pool())
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(map_article_summary_row(&row)?);
        }

        Ok(ArticlePage {
            total: u32::try_from(total_raw.max(0)).unwrap_or(u32::MAX),
            items,
        })
    }

    async fn add(&self, article: &Article) -> Result<i64, AppError> {
        let result = sqlx::query(INSERT_ARTICLE)
            .bind(&article.id)
            .bind(&article.title)
            .bind(&article.summary)
            .bind(&article.content)
            .bind(article.view_count as i64)
            .bind(article.comment_count as i64)
            .bind(article.like_count as i64)
            .bind(article.created_at.timestamp_millis())
            .bind(article.updated_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.rows_affected() as i64)
    }

    async fn update_view_count(&self, id: &str, view_count: u32) -> Result<i64, AppError> {
        let result = sqlx::query(UPDATE_ARTICLE_VIEW_COUNT)
            .bind(id)
            .bind(view_count as i64)
            .bind(Utc::now().timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.rows_affected() as i64)
    }
}
