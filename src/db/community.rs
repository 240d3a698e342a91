use sqlx::PgPool;

use crate::models::community::{Comment, Post, PostSummary};

pub async fn create_post(pool: &PgPool, user_id: i64, title: &str, content: &str) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "INSERT INTO posts (user_id, title, content, created_at, updated_at)
        VALUES ($1, $2, $3, NOW(), NOW())
        RETURNING *",
    )
    .bind(user_id)
    .bind(title)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// Newest first, each with its number of comments.
pub async fn list_posts(pool: &PgPool) -> Result<Vec<PostSummary>, sqlx::Error> {
    sqlx::query_as::<_, PostSummary>(
        "SELECT p.*, (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count
        FROM posts p
        ORDER BY p.created_at DESC, p.id DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn post_exists(pool: &PgPool, post_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)")
        .bind(post_id)
        .fetch_one(pool)
        .await
}

pub async fn create_comment(pool: &PgPool, user_id: i64, post_id: i64, content: &str) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (user_id, post_id, content, created_at)
        VALUES ($1, $2, $3, NOW())
        RETURNING *",
    )
    .bind(user_id)
    .bind(post_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// Oldest first.
pub async fn list_comments(pool: &PgPool, post_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE post_id = $1 ORDER BY created_at, id")
        .bind(post_id)
        .fetch_all(pool)
        .await
}
