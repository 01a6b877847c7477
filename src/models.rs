use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name=crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub is_active: bool,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        User {
            id: Uuid::new_v4(),
            username: username.into(),
            is_active: true,
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name=crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name=crate::schema::post_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A stored notification row. `seq` only exists to keep the feed order stable
/// when two rows share a `created_at`.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name=crate::schema::notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: Uuid,
    pub seq: i64,
    pub recipient_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Insert form of [`Notification`]. Any combination of the optional
/// references may be set, including none of them.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name=crate::schema::notifications)]
pub struct NewNotification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    pub fn for_recipient(recipient_id: Uuid) -> Self {
        NewNotification {
            id: Uuid::new_v4(),
            recipient_id,
            actor_id: None,
            post_id: None,
            comment_id: None,
            created_at: Utc::now(),
        }
    }

    /// Tells the post author that `comment` was left on their post.
    pub fn for_comment(post_author: Uuid, comment: &Comment) -> Self {
        NewNotification {
            actor_id: Some(comment.user_id),
            post_id: Some(comment.post_id),
            comment_id: Some(comment.id),
            created_at: comment.created_at,
            ..Self::for_recipient(post_author)
        }
    }
}

#[derive(Queryable, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Queryable, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub id: Uuid,
    pub content: String,
}

#[derive(Queryable, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommentSummary {
    pub id: Uuid,
    pub content: String,
}

/// A feed entry: the notification plus whichever related rows it points at.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NotificationView {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub actor: Option<UserSummary>,
    pub post: Option<PostSummary>,
    pub comment: Option<CommentSummary>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl From<(Notification, Option<UserSummary>, Option<PostSummary>, Option<CommentSummary>)> for NotificationView {
    fn from((notification, actor, post, comment): (Notification, Option<UserSummary>, Option<PostSummary>, Option<CommentSummary>)) -> Self {
        NotificationView {
            id: notification.id,
            recipient_id: notification.recipient_id,
            actor,
            post,
            comment,
            created_at: notification.created_at,
            is_read: notification.is_read,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: UserSummary,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name=crate::schema::skills)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Skill {
    pub id: i32,
    pub name: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[diesel(table_name=crate::schema::user_skills)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserSkill {
    pub user_id: Uuid,
    pub skill_id: i32,
}
