use axum::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use eyre::Result;
use uuid::Uuid;

use crate::models::Post;
use crate::schema::posts;
use crate::service::ServiceState;

#[async_trait]
pub trait PostRepository {
    async fn create_post(&self, author: Uuid, content: String) -> Result<Post>;
}

#[async_trait]
impl PostRepository for ServiceState {
    async fn create_post(&self, author: Uuid, content: String) -> Result<Post> {
        let post = Post {
            id: Uuid::new_v4(),
            user_id: author,
            content,
            created_at: Utc::now(),
        };
        self.with_conn("create post", move |db| {
            diesel::insert_into(posts::table)
                .values(&post)
                .returning(Post::as_returning())
                .get_result(db)
        })
        .await
    }
}
