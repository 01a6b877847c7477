use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::auth_layer::bearer_auth_middleware;
use crate::error::ServerError;
use crate::models::{Comment, CommentView, NotificationView, Post, Skill, User};
use crate::service::AppState;
use crate::skills::SkillName;

pub const MAX_CONTENT_LEN: usize = 2000;

type AppStateExtractor = State<AppState>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/", get(list_notifications))
        .route("/notifications/:notif_id/read", put(mark_notification_read))
        .route("/posts", post(create_post))
        .route("/posts/:post_id/comments", get(list_comments).post(create_comment))
        .route("/comments/:comment_id", get(get_comment).put(update_comment).delete(delete_comment))
        .route("/skills", get(list_skills))
        .route("/users/me/skills", get(my_skills).post(add_my_skill))
        .route("/users/me/skills/:skill_id", delete(remove_my_skill))
        .route_layer(from_fn_with_state(state.clone(), bearer_auth_middleware))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Deserialize)]
pub struct ContentBody {
    pub content: String,
}

#[derive(Deserialize)]
pub struct SkillBody {
    pub name: String,
}

// Malformed ids can't match anything, so they get the same answer as unknown ones.
fn parse_uuid(raw: &str, what: &'static str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(raw).map_err(|_| ServerError::NotFound(what))
}

fn validate_content(raw: &str) -> Result<String, ServerError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ServerError::Validation("Content must not be empty".to_string()));
    }
    // postgres TEXT can't hold NUL
    if content.contains('\0') {
        return Err(ServerError::Validation("Content must not contain NUL characters".to_string()));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(ServerError::Validation(format!(
            "Content can be at most {MAX_CONTENT_LEN} characters"
        )));
    }
    Ok(content.to_string())
}

async fn health() -> &'static str {
    "ok"
}

async fn list_notifications(
    State(state): AppStateExtractor,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<NotificationView>>, ServerError> {
    let feed = state.store.list_for_recipient(user.id).await?;
    debug!("{} notifications for {}", feed.len(), user.id);
    Ok(Json(feed))
}

async fn mark_notification_read(
    State(state): AppStateExtractor,
    Extension(user): Extension<User>,
    Path(notif_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let id = parse_uuid(&notif_id, "Notification")?;
    // someone else's notification answers exactly like a missing one
    if state.store.mark_as_read(id, user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound("Notification"))
    }
}

async fn create_post(
    State(state): AppStateExtractor,
    Extension(user): Extension<User>,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Post>), ServerError> {
    let Json(body) = body?;
    let content = validate_content(&body.content)?;
    let post = state.store.create_post(user.id, content).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn create_comment(
    State(state): AppStateExtractor,
    Extension(user): Extension<User>,
    Path(post_id): Path<String>,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ServerError> {
    let post_id = parse_uuid(&post_id, "Post")?;
    let Json(body) = body?;
    let content = validate_content(&body.content)?;
    let comment = state
        .store
        .create_comment(user.id, post_id, content)
        .await?
        .ok_or(ServerError::NotFound("Post"))?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    State(state): AppStateExtractor,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<CommentView>>, ServerError> {
    let post_id = parse_uuid(&post_id, "Post")?;
    Ok(Json(state.store.comments_for_post(post_id).await?))
}

async fn get_comment(
    State(state): AppStateExtractor,
    Path(comment_id): Path<String>,
) -> Result<Json<Comment>, ServerError> {
    let id = parse_uuid(&comment_id, "Comment")?;
    let comment = state.store.get_comment(id).await?.ok_or(ServerError::NotFound("Comment"))?;
    Ok(Json(comment))
}

async fn update_comment(
    State(state): AppStateExtractor,
    Extension(user): Extension<User>,
    Path(comment_id): Path<String>,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> Result<Json<Comment>, ServerError> {
    let id = parse_uuid(&comment_id, "Comment")?;
    let Json(body) = body?;
    let content = validate_content(&body.content)?;
    let comment = state
        .store
        .update_comment(id, user.id, content)
        .await?
        .ok_or(ServerError::NotFound("Comment"))?;
    Ok(Json(comment))
}

async fn delete_comment(
    State(state): AppStateExtractor,
    Extension(user): Extension<User>,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let id = parse_uuid(&comment_id, "Comment")?;
    if state.store.delete_comment(id, user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound("Comment"))
    }
}

async fn list_skills(State(state): AppStateExtractor) -> Result<Json<Vec<Skill>>, ServerError> {
    Ok(Json(state.store.list_skills().await?))
}

async fn my_skills(
    State(state): AppStateExtractor,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Skill>>, ServerError> {
    Ok(Json(state.store.skills_for_user(user.id).await?))
}

async fn add_my_skill(
    State(state): AppStateExtractor,
    Extension(user): Extension<User>,
    body: Result<Json<SkillBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Skill>), ServerError> {
    let Json(body) = body?;
    let name = SkillName::parse(&body.name)?;
    let skill = state.store.add_skill_to_user(user.id, name).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

async fn remove_my_skill(
    State(state): AppStateExtractor,
    Extension(user): Extension<User>,
    Path(skill_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let skill_id: i32 = skill_id.parse().map_err(|_| ServerError::NotFound("Skill"))?;
    if state.store.remove_skill_from_user(user.id, skill_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound("Skill"))
    }
}
