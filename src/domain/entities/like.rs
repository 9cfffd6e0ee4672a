use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleLike {
    pub id: String,
    pub article_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl ArticleLike {
    pub fn new(article_id: String, user_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            article_id,
            user_id,
            created_at: chrono::Utc::now(),
        }
    }
}
