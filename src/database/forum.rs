use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{DiscussionComment, DiscussionPost};

/// Who is reading. Moderators see unapproved content as well as their own.
#[derive(Debug, Clone, Copy)]
pub struct Viewer {
    pub user_id: Uuid,
    pub moderator: bool,
}

/// Post columns with a comment count that only includes comments the viewer
/// can see. `user` and `moderator` are the placeholders binding the viewer.
fn post_select(user: &str, moderator: &str) -> String {
    format!(
        "SELECT p.id, p.user_id, a.display_name AS author_name, p.title, p.content, p.category,
                p.is_approved,
                (SELECT COUNT(*) FROM discussion_comments c
                 WHERE c.post_id = p.id AND (c.is_approved OR c.user_id = {user} OR {moderator})) AS comment_count,
                p.created_at, p.updated_at
         FROM discussion_posts p
         JOIN user_profiles a ON a.id = p.user_id"
    )
}

const COMMENT_SELECT: &str = "
    SELECT c.id, c.post_id, c.user_id, a.display_name AS author_name, c.content,
           c.is_approved, c.created_at
    FROM discussion_comments c
    JOIN user_profiles a ON a.id = c.user_id";

/// Approved posts plus the viewer's own (all posts for moderators), newest first
pub async fn list_visible(
    pool: &PgPool,
    viewer: Viewer,
    category: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<DiscussionPost>, DatabaseError> {
    let sql = format!(
        "{} WHERE (p.is_approved OR p.user_id = $1 OR $2)
           AND ($3::text IS NULL OR p.category = $3)
         ORDER BY p.created_at DESC, p.id
         LIMIT $4 OFFSET $5",
        post_select("$1", "$2")
    );
    let posts = sqlx::query_as::<_, DiscussionPost>(&sql)
        .bind(viewer.user_id)
        .bind(viewer.moderator)
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

/// Visibility of the post itself is left to the caller
pub async fn find_post(pool: &PgPool, post_id: Uuid, viewer: Viewer) -> Result<Option<DiscussionPost>, DatabaseError> {
    let sql = format!("{} WHERE p.id = $1", post_select("$2", "$3"));
    let post = sqlx::query_as::<_, DiscussionPost>(&sql)
        .bind(post_id)
        .bind(viewer.user_id)
        .bind(viewer.moderator)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

pub async fn create_post(
    pool: &PgPool,
    author: Viewer,
    title: &str,
    content: &str,
    category: Option<&str>,
    is_approved: bool,
) -> Result<DiscussionPost, DatabaseError> {
    let (post_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO discussion_posts (id, user_id, title, content, category, is_approved)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(author.user_id)
    .bind(title)
    .bind(content)
    .bind(category)
    .bind(is_approved)
    .fetch_one(pool)
    .await?;

    find_post(pool, post_id, author)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("post {}", post_id)))
}

/// Owner edit of title, content and category
pub async fn update_post(
    pool: &PgPool,
    post_id: Uuid,
    owner: Viewer,
    title: &str,
    content: &str,
    category: Option<&str>,
) -> Result<DiscussionPost, DatabaseError> {
    let result = sqlx::query(
        "UPDATE discussion_posts
         SET title = $3, content = $4, category = $5, updated_at = now()
         WHERE id = $1 AND user_id = $2",
    )
    .bind(post_id)
    .bind(owner.user_id)
    .bind(title)
    .bind(content)
    .bind(category)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("post {}", post_id)));
    }

    find_post(pool, post_id, owner)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("post {}", post_id)))
}

/// Remove a post's comments, then the post. Run inside a transaction.
pub async fn delete_post_with_comments(conn: &mut PgConnection, post_id: Uuid) -> Result<u64, DatabaseError> {
    let comments = sqlx::query("DELETE FROM discussion_comments WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM discussion_posts WHERE id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(DatabaseError::NotFound(format!("post {}", post_id)));
    }
    Ok(comments)
}

/// Moderation switch; returns false when the post does not exist
pub async fn set_post_approval(pool: &PgPool, post_id: Uuid, approved: bool) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "UPDATE discussion_posts SET is_approved = $2, updated_at = now() WHERE id = $1",
    )
    .bind(post_id)
    .bind(approved)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Approved comments plus the viewer's own (all comments for moderators),
/// oldest first
pub async fn list_visible_comments(
    pool: &PgPool,
    post_id: Uuid,
    viewer: Viewer,
) -> Result<Vec<DiscussionComment>, DatabaseError> {
    let sql = format!(
        "{} WHERE c.post_id = $1 AND (c.is_approved OR c.user_id = $2 OR $3)
         ORDER BY c.created_at ASC, c.id",
        COMMENT_SELECT
    );
    let comments = sqlx::query_as::<_, DiscussionComment>(&sql)
        .bind(post_id)
        .bind(viewer.user_id)
        .bind(viewer.moderator)
        .fetch_all(pool)
        .await?;
    Ok(comments)
}

pub async fn create_comment(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    content: &str,
    is_approved: bool,
) -> Result<DiscussionComment, DatabaseError> {
    let (comment_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO discussion_comments (id, post_id, user_id, content, is_approved)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(post_id)
    .bind(user_id)
    .bind(content)
    .bind(is_approved)
    .fetch_one(pool)
    .await?;

    find_comment(pool, comment_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("comment {}", comment_id)))
}

pub async fn find_comment(pool: &PgPool, comment_id: Uuid) -> Result<Option<DiscussionComment>, DatabaseError> {
    let sql = format!("{} WHERE c.id = $1", COMMENT_SELECT);
    let comment = sqlx::query_as::<_, DiscussionComment>(&sql)
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;
    Ok(comment)
}

/// Moderation switch for a single comment; false when it does not exist
pub async fn set_comment_approval(pool: &PgPool, comment_id: Uuid, approved: bool) -> Result<bool, DatabaseError> {
    let result = sqlx::query("UPDATE discussion_comments SET is_approved = $2 WHERE id = $1")
        .bind(comment_id)
        .bind(approved)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete_comment(pool: &PgPool, comment_id: Uuid, owner_id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM discussion_comments WHERE id = $1 AND user_id = $2")
        .bind(comment_id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
