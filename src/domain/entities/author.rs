use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub site: Option<String>,
    pub email: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    pub fn new(
        id: String,
        name: String,
        site: Option<String>,
        email: Option<String>,
        is_admin: bool,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            name,
            site,
            email,
            is_admin,
            created_at: now,
            updated_at: now,
        }
    }
}

/// フォーム入力そのままの未検証データ。検証後に `Author` へ変換される。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInput {
    pub user_id: String,
    pub name: String,
    pub site: String,
    pub email: String,
    pub is_admin: bool,
}

impl AuthorInput {
    pub fn new(user_id: String, name: String) -> Self {
        Self {
            user_id,
            name,
            site: String::new(),
            email: String::new(),
            is_admin: false,
        }
    }

    pub fn with_site(mut self, site: String) -> Self {
        self.site = site;
        self
    }

    pub fn with_email(mut self, email: String) -> Self {
        self.email = email;
        self
    }

    pub fn as_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }
}
