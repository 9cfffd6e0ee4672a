pub(super) const SELECT_ARTICLE_BY_ID: &str = r#"
    SELECT id, title, summary, content, view_count, comment_count, like_count,
           created_at, updated_at
    FROM articles
    WHERE id = ?1
"#;

pub(super) const SELECT_ARTICLE_PAGE: &str = r#"
    SELECT id, title, summary, view_count, comment_count, like_count, created_at
    FROM articles
    ORDER BY created_at DESC
    LIMIT ?1 OFFSET ?2
"#;

pub(super) const COUNT_ARTICLES: &str = r#"
    SELECT COUNT(*) AS count FROM articles
"#;

pub(super) const INSERT_ARTICLE: &str = r#"
    INSERT INTO articles (
        id, title, summary, content, view_count, comment_count, like_count,
        created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub(super) const UPDATE_ARTICLE_VIEW_COUNT: &str = r#"
    UPDATE articles
    SET view_count = ?2,
        updated_at = ?3
    WHERE id = ?1
"#;

pub(super) const UPDATE_ARTICLE_COUNTERS: &str = r#"
    UPDATE articles
    SET comment_count = ?2,
        like_count = ?3,
        updated_at = ?4
    WHERE id = ?1
"#;

pub(super) const SELECT_COMMENT_BY_ID: &str = r#"
    SELECT id, article_id, author_id, content, is_deleted, created_at
    FROM comments
    WHERE id = ?1
"#;

pub(super) const SELECT_COMMENTS_BY_ARTICLE: &str = r#"
    SELECT id, article_id, author_id, content, is_deleted, created_at
    FROM comments
    WHERE article_id = ?1 AND is_deleted = 0
    ORDER BY created_at ASC, id ASC
"#;

pub(super) const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (id, article_id, author_id, content, is_deleted, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub(super) const MARK_COMMENT_DELETED: &str = r#"
    UPDATE comments
    SET is_deleted = 1
    WHERE id = ?1 AND is_deleted = 0
"#;

pub(super) const SELECT_REPLY_BY_ID: &str = r#"
    SELECT id, article_id, comment_id, to_reply_id, author_id, content, kind, created_at
    FROM replies
    WHERE id = ?1
"#;

pub(super) const SELECT_REPLIES_BY_ARTICLE: &str = r#"
    SELECT id, article_id, comment_id, to_reply_id, author_id, content, kind, created_at
    FROM replies
    WHERE article_id = ?1
    ORDER BY created_at ASC, id ASC
"#;

pub(super) const INSERT_REPLY: &str = r#"
    INSERT INTO replies (
        id, article_id, comment_id, to_reply_id, author_id, content, kind, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

pub(super) const INSERT_LIKE: &str = r#"
    INSERT INTO article_likes (id, article_id, user_id, created_at)
    VALUES (?1, ?2, ?3, ?4)
"#;

pub(super) const COUNT_LIKES_BY_ARTICLE_AND_USER: &str = r#"
    SELECT COUNT(*) AS count
    FROM article_likes
    WHERE article_id = ?1 AND user_id = ?2
"#;

pub(super) const UPSERT_AUTHOR: &str = r#"
    INSERT INTO authors (id, name, site, email, is_admin, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        site = excluded.site,
        email = excluded.email,
        is_admin = excluded.is_admin,
        updated_at = excluded.updated_at
"#;
