use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::QueryResult;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use eyre::{eyre, Result, WrapErr};
use tracing::debug;

use crate::auth_layer::TokenKey;
use crate::comment_repo::CommentRepository;
use crate::config::Config;
use crate::notification_repo::NotificationRepository;
use crate::post_repo::PostRepository;
use crate::skill_repo::SkillRepository;
use crate::user_repo::UserRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Everything the HTTP layer needs from storage.
pub trait Store:
    UserRepository + PostRepository + NotificationRepository + CommentRepository + SkillRepository + Send + Sync
{
}

impl<T> Store for T where
    T: UserRepository + PostRepository + NotificationRepository + CommentRepository + SkillRepository + Send + Sync
{
}

/// Shared router state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub token_key: Arc<TokenKey>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, token_key: TokenKey) -> Self {
        AppState {
            store,
            token_key: Arc::new(token_key),
        }
    }
}

/// The diesel-backed [`Store`].
pub struct ServiceState {
    pub db_pool: DbPool,
}

impl ServiceState {
    pub fn new(config: &Config) -> Result<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let db_pool = Pool::builder()
            .max_size(config.pool_size)
            .build(manager)
            .wrap_err("building database pool")?;
        debug!("database pool ready with {} connections", config.pool_size);
        Ok(Self { db_pool })
    }

    pub fn run_migrations(&self) -> Result<()> {
        let mut db = self.db_pool.get().wrap_err("checking out connection for migrations")?;
        run_migrations(&mut db)
    }

    /// Runs a synchronous diesel operation on the blocking pool. Failures are
    /// tagged with `operation` so the logged chain says what was attempted.
    pub async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.db_pool.clone();
        tokio::task::spawn_blocking(move || -> Result<T> {
            let mut db = pool.get()?;
            Ok(f(&mut db)?)
        })
        .await
        .wrap_err(operation)?
        .wrap_err(operation)
    }
}

pub fn run_migrations(db: &mut PgConnection) -> Result<()> {
    let applied = db.run_pending_migrations(MIGRATIONS).map_err(|e| eyre!(e))?;
    for version in applied {
        debug!("applied migration {version}");
    }
    Ok(())
}
