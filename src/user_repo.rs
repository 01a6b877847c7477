use axum::async_trait;
use diesel::prelude::*;
use eyre::Result;
use uuid::Uuid;

use crate::models::User;
use crate::schema::users;
use crate::service::ServiceState;

#[async_trait]
pub trait UserRepository {
    /// The user with `id`, unless it doesn't exist or has been deactivated.
    async fn find_active_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn insert_user(&self, user: User) -> Result<User>;
}

#[async_trait]
impl UserRepository for ServiceState {
    async fn find_active_user(&self, id: Uuid) -> Result<Option<User>> {
        self.with_conn("find active user", move |db| {
            users::table
                .find(id)
                .filter(users::is_active.eq(true))
                .select(User::as_select())
                .get_result(db)
                .optional()
        })
        .await
    }

    async fn insert_user(&self, user: User) -> Result<User> {
        self.with_conn("insert user", move |db| {
            diesel::insert_into(users::table)
                .values(&user)
                .returning(User::as_returning())
                .get_result(db)
        })
        .await
    }
}
