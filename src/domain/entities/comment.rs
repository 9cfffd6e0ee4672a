use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub article_id: String,
    pub author_id: String,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(article_id: String, author_id: String, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            article_id,
            author_id,
            content,
            is_deleted: false,
            created_at: chrono::Utc::now(),
        }
    }
}
