use crate::domain::entities::{Article, ArticleSummary, Comment, Reply, ReplyKind};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::{Row, sqlite::SqliteRow};

pub(super) fn map_article_row(row: &SqliteRow) -> Result<Article, AppError> {
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        content: row.try_get("content")?,
        view_count: row.try_get::<i64, _>("view_count")? as u32,
        comment_count: row.try_get::<i64, _>("comment_count")? as u32,
        like_count: row.try_get::<i64, _>("like_count")? as u32,
        created_at: millis_to_datetime(row.try_get("created_at")?),
        updated_at: millis_to_datetime(row.try_get("updated_at")?),
    })
}

pub(super) fn map_article_summary_row(row: &SqliteRow) -> Result<ArticleSummary, AppError> {
    Ok(ArticleSummary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        view_count: row.try_get::<i64, _>("view_count")? as u32,
        comment_count: row.try_get::<i64, _>("comment_count")? as u32,
        like_count: row.try_get::<i64, _>("like_count")? as u32,
        created_at: millis_to_datetime(row.try_get("created_at")?),
    })
}

pub(super) fn map_comment_row(row: &SqliteRow) -> Result<Comment, AppError> {
    Ok(Comment {
        id: row.try_get("id")?,
        article_id: row.try_get("article_id")?,
        author_id: row.try_get("author_id")?,
        content: row.try_get("content")?,
        is_deleted: row.try_get::<i64, _>("is_deleted")? != 0,
        created_at: millis_to_datetime(row.try_get("created_at")?),
    })
}

pub(super) fn map_reply_row(row: &SqliteRow) -> Result<Reply, AppError> {
    Ok(Reply {
        id: row.try_get("id")?,
        article_id: row.try_get("article_id")?,
        comment_id: row.try_get("comment_id")?,
        to_reply_id: row.try_get("to_reply_id")?,
        author_id: row.try_get("author_id")?,
        content: row.try_get("content")?,
        kind: ReplyKind::from_i64(row.try_get("kind")?),
        created_at: millis_to_datetime(row.try_get("created_at")?),
    })
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}
