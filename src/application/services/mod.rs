pub mod article_view_service;
pub mod counter_mutation_service;

pub use article_view_service::{
    ArticleDisplay, ArticleViewService, CommentThread, ViewFlushHandler, ViewFlushStats,
    ViewFlushStatsSnapshot,
};
pub use counter_mutation_service::{CommentReceipt, CounterMutationService, ReplyReceipt};
