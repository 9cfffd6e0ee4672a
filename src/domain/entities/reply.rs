use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 返信先の種別。コメント直下か、別の返信へのぶら下がりか。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    ToComment,
    ToReply,
}

impl ReplyKind {
    pub fn as_i64(self) -> i64 {
        match self {
            ReplyKind::ToComment => 0,
            ReplyKind::ToReply => 1,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => ReplyKind::ToReply,
            _ => ReplyKind::ToComment,
        }
    }
}

/// 返信操作の宛先。返信への返信でもスレッドはコメント単位で束ねる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    Comment(String),
    Reply(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub article_id: String,
    pub comment_id: String,
    pub to_reply_id: Option<String>,
    pub author_id: String,
    pub content: String,
    pub kind: ReplyKind,
    pub created_at: DateTime<Utc>,
}

impl Reply {
    pub fn new(
        article_id: String,
        comment_id: String,
        to_reply_id: Option<String>,
        author_id: String,
        content: String,
        kind: ReplyKind,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            article_id,
            comment_id,
            to_reply_id,
            author_id,
            content,
            kind,
            created_at: chrono::Utc::now(),
        }
    }
}
