use crate::application::ports::repositories::CommentRepository;
use crate::application::ports::unit_of_work::MutationUnitOfWork;
use crate::domain::entities::{
    ArticleLike, Author, AuthorInput, Comment, Reply, ReplyKind, ReplyTarget,
};
use crate::infrastructure::locking::MutationGuard;
use crate::shared::error::{AppError, Result};
use crate::shared::validation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Returned after a comment is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentReceipt {
    pub comment_id: String,
    pub by_admin: bool,
}

/// Returned after a reply is accepted. `comment_id` is the thread root
/// the reply was attached to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyReceipt {
    pub comment_id: String,
    pub reply_id: String,
    pub by_admin: bool,
}

/// Write path for the shared article counters.
///
/// Every operation validates its input first, then runs the whole
/// read-modify-write inside one transaction while holding the mutation
/// guard for the article. The child row is always written before the
/// parent counter.
pub struct CounterMutationService {
    uow: Arc<dyn MutationUnitOfWork>,
    comments: Arc<dyn CommentRepository>,
    guard: Arc<MutationGuard>,
}

impl CounterMutationService {
    pub fn new(
        uow: Arc<dyn MutationUnitOfWork>,
        comments: Arc<dyn CommentRepository>,
        guard: Arc<MutationGuard>,
    ) -> Self {
        Self {
            uow,
            comments,
            guard,
        }
    }

    fn check_id(raw: &str) -> Result<String> {
        validation::check_id(raw).map_err(AppError::Validation)
    }

    fn check_content(raw: &str) -> Result<String> {
        validation::check_content(raw).map_err(AppError::Validation)
    }

    fn validate_author(input: &AuthorInput) -> Result<Author> {
        let user_id = validation::check_id(&input.user_id).map_err(AppError::Validation)?;
        let name = validation::check_display_name(&input.name).map_err(AppError::Validation)?;
        let site = validation::check_optional_site(&input.site).map_err(AppError::Validation)?;
        let email = validation::check_optional_email(&input.email).map_err(AppError::Validation)?;
        Ok(Author::new(user_id, name, site, email, input.is_admin))
    }

    fn ensure_rows(operation: &str, affected: i64) -> Result<()> {
        if affected <= 0 {
            return Err(AppError::Persistence(format!(
                "{operation} affected no rows"
            )));
        }
        Ok(())
    }

    /// Adds a comment to an article and bumps its comment counter.
    pub async fn add_comment(
        &self,
        raw_article_id: &str,
        author: AuthorInput,
        raw_content: &str,
    ) -> Result<CommentReceipt> {
        let article_id = Self::check_id(raw_article_id)?;
        let content = Self::check_content(raw_content)?;
        let author = Self::validate_author(&author)?;

        let uow = self.uow.clone();
        let tx_article_id = article_id.clone();

        self.guard
            .with_lock(&article_id, || async move {
                let mut tx = uow.begin().await?;
                let mut article = tx
                    .find_article(&tx_article_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("article {tx_article_id} not found"))
                    })?;

                Self::ensure_rows("author upsert", tx.upsert_author(&author).await?)?;

                let comment = Comment::new(tx_article_id.clone(), author.id.clone(), content);
                Self::ensure_rows("comment insert", tx.insert_comment(&comment).await?)?;

                article.increment_comments();
                Self::ensure_rows(
                    "article counter update",
                    tx.update_article_counters(&article).await?,
                )?;

                tx.commit().await?;
                Ok(CommentReceipt {
                    comment_id: comment.id,
                    by_admin: author.is_admin,
                })
            })
            .await
    }

    /// Adds a reply under an existing comment (or under another reply,
    /// in which case the thread root is inherited). Replying to your own
    /// comment or reply is rejected before anything is written.
    pub async fn add_reply(
        &self,
        raw_article_id: &str,
        target: ReplyTarget,
        author: AuthorInput,
        raw_content: &str,
    ) -> Result<ReplyReceipt> {
        let article_id = Self::check_id(raw_article_id)?;
        let content = Self::check_content(raw_content)?;
        let author = Self::validate_author(&author)?;
        let target = match target {
            ReplyTarget::Comment(id) => ReplyTarget::Comment(Self::check_id(&id)?),
            ReplyTarget::Reply(id) => ReplyTarget::Reply(Self::check_id(&id)?),
        };

        let uow = self.uow.clone();
        let tx_article_id = article_id.clone();

        self.guard
            .with_lock(&article_id, || async move {
                let mut tx = uow.begin().await?;
                let mut article = tx
                    .find_article(&tx_article_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("article {tx_article_id} not found"))
                    })?;

                let (comment_id, to_reply_id, kind, target_author_id) = match &target {
                    ReplyTarget::Comment(comment_id) => {
                        let comment = tx.find_comment(comment_id).await?.ok_or_else(|| {
                            AppError::NotFound(format!("comment {comment_id} not found"))
                        })?;
                        (comment.id, None, ReplyKind::ToComment, comment.author_id)
                    }
                    ReplyTarget::Reply(reply_id) => {
                        let parent = tx.find_reply(reply_id).await?.ok_or_else(|| {
                            AppError::NotFound(format!("reply {reply_id} not found"))
                        })?;
                        (
                            parent.comment_id,
                            Some(parent.id),
                            ReplyKind::ToReply,
                            parent.author_id,
                        )
                    }
                };

                if target_author_id == author.id {
                    return Err(AppError::Conflict(
                        "cannot reply to your own comment".to_string(),
                    ));
                }

                Self::ensure_rows("author upsert", tx.upsert_author(&author).await?)?;

                let reply = Reply::new(
                    tx_article_id.clone(),
                    comment_id.clone(),
                    to_reply_id,
                    author.id.clone(),
                    content,
                    kind,
                );
                Self::ensure_rows("reply insert", tx.insert_reply(&reply).await?)?;

                article.increment_comments();
                Self::ensure_rows(
                    "article counter update",
                    tx.update_article_counters(&article).await?,
                )?;

                tx.commit().await?;
                Ok(ReplyReceipt {
                    comment_id,
                    reply_id: reply.id,
                    by_admin: author.is_admin,
                })
            })
            .await
    }

    /// Soft-deletes a comment and decrements the article's comment
    /// counter, never below zero. Administrator only.
    pub async fn delete_comment(&self, raw_comment_id: &str, is_admin: bool) -> Result<()> {
        if !is_admin {
            return Err(AppError::Forbidden(
                "only the administrator can delete comments".to_string(),
            ));
        }
        let comment_id = Self::check_id(raw_comment_id)?;

        // ガードのキーは親記事なので、先にコメントから引く
        let located = self
            .comments
            .find_by_id(&comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id} not found")))?;
        let article_id = located.article_id;

        let uow = self.uow.clone();
        let tx_article_id = article_id.clone();

        self.guard
            .with_lock(&article_id, || async move {
                let mut tx = uow.begin().await?;

                let fresh = tx.find_comment(&comment_id).await?.ok_or_else(|| {
                    AppError::NotFound(format!("comment {comment_id} not found"))
                })?;
                if fresh.is_deleted {
                    return Err(AppError::NotFound(format!(
                        "comment {comment_id} is already deleted"
                    )));
                }

                Self::ensure_rows("comment delete", tx.mark_comment_deleted(&comment_id).await?)?;

                let mut article = tx
                    .find_article(&tx_article_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("article {tx_article_id} not found"))
                    })?;
                article.decrement_comments();
                Self::ensure_rows(
                    "article counter update",
                    tx.update_article_counters(&article).await?,
                )?;

                tx.commit().await?;
                Ok(())
            })
            .await
    }

    /// Records a like and bumps the article's like counter. Repeat likes
    /// by the same user are accepted as new rows.
    pub async fn like_article(&self, raw_article_id: &str, raw_user_id: &str) -> Result<()> {
        let article_id = Self::check_id(raw_article_id)?;
        let user_id = Self::check_id(raw_user_id)?;

        let uow = self.uow.clone();
        let tx_article_id = article_id.clone();

        self.guard
            .with_lock(&article_id, || async move {
                let mut tx = uow.begin().await?;
                let mut article = tx
                    .find_article(&tx_article_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("article {tx_article_id} not found"))
                    })?;

                let like = ArticleLike::new(tx_article_id.clone(), user_id);
                Self::ensure_rows("like insert", tx.insert_like(&like).await?)?;

                article.increment_likes();
                Self::ensure_rows(
                    "article counter update",
                    tx.update_article_counters(&article).await?,
                )?;

                tx.commit().await?;
                Ok(())
            })
            .await
    }
}
