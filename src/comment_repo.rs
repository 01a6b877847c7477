use axum::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use eyre::Result;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Comment, CommentView, NewNotification, UserSummary};
use crate::notification_repo::insert_notification;
use crate::schema::{post_comments, posts, users};
use crate::service::ServiceState;

#[async_trait]
pub trait CommentRepository {
    /// Adds a comment and notifies the post author. `Ok(None)` when the post
    /// doesn't exist.
    async fn create_comment(&self, author: Uuid, post: Uuid, content: String) -> Result<Option<Comment>>;
    async fn comments_for_post(&self, post: Uuid) -> Result<Vec<CommentView>>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    /// `Ok(None)` unless the comment exists and was written by `author`.
    async fn update_comment(&self, id: Uuid, author: Uuid, content: String) -> Result<Option<Comment>>;
    async fn delete_comment(&self, id: Uuid, author: Uuid) -> Result<bool>;
}

#[async_trait]
impl CommentRepository for ServiceState {
    async fn create_comment(&self, author: Uuid, post: Uuid, content: String) -> Result<Option<Comment>> {
        self.with_conn("create comment", move |db| {
            db.transaction::<_, diesel::result::Error, _>(|db| {
                let post_author = posts::table
                    .find(post)
                    .select(posts::user_id)
                    .get_result::<Uuid>(db)
                    .optional()?;
                let Some(post_author) = post_author else {
                    return Ok(None);
                };

                let comment = diesel::insert_into(post_comments::table)
                    .values(Comment {
                        id: Uuid::new_v4(),
                        user_id: author,
                        post_id: post,
                        content,
                        created_at: Utc::now(),
                    })
                    .returning(Comment::as_returning())
                    .get_result(db)?;

                if post_author != author {
                    let notification = insert_notification(db, &NewNotification::for_comment(post_author, &comment))?;
                    debug!("notified {} of comment {}", notification.recipient_id, comment.id);
                }
                Ok(Some(comment))
            })
        })
        .await
    }

    async fn comments_for_post(&self, post: Uuid) -> Result<Vec<CommentView>> {
        self.with_conn("list comments for post", move |db| {
            let rows = post_comments::table
                .inner_join(users::table)
                .filter(post_comments::post_id.eq(post))
                .order((post_comments::created_at.asc(), post_comments::id.asc()))
                .select((Comment::as_select(), (users::id, users::username)))
                .load::<(Comment, UserSummary)>(db)?;
            Ok(rows
                .into_iter()
                .map(|(comment, author)| CommentView { comment, author })
                .collect())
        })
        .await
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        self.with_conn("get comment", move |db| {
            post_comments::table
                .find(id)
                .select(Comment::as_select())
                .get_result(db)
                .optional()
        })
        .await
    }

    async fn update_comment(&self, id: Uuid, author: Uuid, content: String) -> Result<Option<Comment>> {
        self.with_conn("update comment", move |db| {
            diesel::update(
                post_comments::table
                    .filter(post_comments::id.eq(id))
                    .filter(post_comments::user_id.eq(author)),
            )
            .set(post_comments::content.eq(content))
            .returning(Comment::as_returning())
            .get_result(db)
            .optional()
        })
        .await
    }

    async fn delete_comment(&self, id: Uuid, author: Uuid) -> Result<bool> {
        self.with_conn("delete comment", move |db| {
            let deleted = diesel::delete(
                post_comments::table
                    .filter(post_comments::id.eq(id))
                    .filter(post_comments::user_id.eq(author)),
            )
            .execute(db)?;
            Ok(deleted > 0)
        })
        .await
    }
}
