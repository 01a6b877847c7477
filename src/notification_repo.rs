use axum::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use eyre::Result;
use uuid::Uuid;

use crate::models::{CommentSummary, NewNotification, Notification, NotificationView, PostSummary, UserSummary};
use crate::schema::{notifications, post_comments, posts, users};
use crate::service::ServiceState;

#[async_trait]
pub trait NotificationRepository {
    /// Every notification addressed to `recipient`, newest first. Rows with
    /// the same `created_at` keep their insertion order.
    async fn list_for_recipient(&self, recipient: Uuid) -> Result<Vec<NotificationView>>;

    /// Flags the notification as read if it exists and belongs to `caller`.
    /// `Ok(false)` means no such notification for this caller; it is never an
    /// error. Marking an already read notification returns `Ok(true)` again.
    async fn mark_as_read(&self, notification: Uuid, caller: Uuid) -> Result<bool>;

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification>;
}

#[async_trait]
impl NotificationRepository for ServiceState {
    async fn list_for_recipient(&self, recipient: Uuid) -> Result<Vec<NotificationView>> {
        self.with_conn("list notifications for recipient", move |db| feed_for_recipient(db, recipient))
            .await
    }

    async fn mark_as_read(&self, notification: Uuid, caller: Uuid) -> Result<bool> {
        self.with_conn("mark notification as read", move |db| {
            // id and ownership in one statement, so there is no window between check and write
            let updated = diesel::update(
                notifications::table
                    .filter(notifications::id.eq(notification))
                    .filter(notifications::recipient_id.eq(caller)),
            )
            .set(notifications::is_read.eq(true))
            .execute(db)?;
            Ok(updated > 0)
        })
        .await
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        self.with_conn("create notification", move |db| insert_notification(db, &notification))
            .await
    }
}

pub(crate) fn insert_notification(db: &mut PgConnection, notification: &NewNotification) -> QueryResult<Notification> {
    diesel::insert_into(notifications::table)
        .values(notification)
        .returning(Notification::as_returning())
        .get_result(db)
}

fn feed_for_recipient(db: &mut PgConnection, recipient: Uuid) -> QueryResult<Vec<NotificationView>> {
    let rows = notifications::table
        .left_join(users::table.on(notifications::actor_id.eq(users::id.nullable())))
        .left_join(posts::table.on(notifications::post_id.eq(posts::id.nullable())))
        .left_join(post_comments::table.on(notifications::comment_id.eq(post_comments::id.nullable())))
        .filter(notifications::recipient_id.eq(recipient))
        .order((notifications::created_at.desc(), notifications::seq.asc()))
        .select((
            Notification::as_select(),
            (users::id, users::username).nullable(),
            (posts::id, posts::content).nullable(),
            (post_comments::id, post_comments::content).nullable(),
        ))
        .load::<(Notification, Option<UserSummary>, Option<PostSummary>, Option<CommentSummary>)>(db)?;

    Ok(rows.into_iter().map(NotificationView::from).collect())
}
