pub mod article;
pub mod author;
pub mod comment;
pub mod like;
pub mod reply;

pub use article::{Article, ArticlePage, ArticleSummary, SharedArticle};
pub use author::{Author, AuthorInput};
pub use comment::Comment;
pub use like::ArticleLike;
pub use reply::{Reply, ReplyKind, ReplyTarget};
