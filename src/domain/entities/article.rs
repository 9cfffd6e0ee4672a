use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// キャッシュと保留バッチが同じ実体を参照するためのハンドル。
pub type SharedArticle = Arc<RwLock<Article>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub view_count: u32,
    pub comment_count: u32,
    pub like_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn new(title: String, summary: String, content: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            summary,
            content,
            view_count: 0,
            comment_count: 0,
            like_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_shared(self) -> SharedArticle {
        Arc::new(RwLock::new(self))
    }

    pub fn increment_views(&mut self) {
        self.view_count += 1;
    }

    pub fn increment_comments(&mut self) {
        self.comment_count += 1;
    }

    pub fn decrement_comments(&mut self) {
        if self.comment_count > 0 {
            self.comment_count -= 1;
        }
    }

    pub fn increment_likes(&mut self) {
        self.like_count += 1;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub view_count: u32,
    pub comment_count: u32,
    pub like_count: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlePage {
    pub total: u32,
    pub items: Vec<ArticleSummary>,
}
