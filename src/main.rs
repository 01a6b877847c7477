use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::Result;
use tokio::net::TcpListener;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use crate::auth_layer::TokenKey;
use crate::config::Config;
use crate::models::User;
use crate::service::{AppState, ServiceState};
use crate::user_repo::UserRepository;

mod api;
mod auth_layer;
mod comment_repo;
mod config;
mod error;
mod models;
mod notification_repo;
mod post_repo;
mod schema;
mod service;
mod skill_repo;
mod skills;
#[cfg(test)]
mod test_support;
mod user_repo;

#[derive(Parser, Debug)]
#[command(name="social-backend")]
#[command(about="Notifications, comments and skill tags over HTTP")]
struct Args {
    #[command(subcommand)]
    command: Commands
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the server normally
    #[command(name = "run")]
    Run {},
    /// Apply pending database migrations and exit
    #[command(name = "migrate")]
    Migrate {},
    /// Print a bearer token for an existing user
    #[command(name = "token", arg_required_else_help = true)]
    Token {
        #[arg(required = true)]
        user_id: Uuid
    },
    /// Create an active user and print its id and bearer token
    #[command(name = "create-user", arg_required_else_help = true)]
    CreateUser {
        #[arg(required = true)]
        username: String
    },
}

#[tokio::main]
async fn main() -> Result<()> {

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                "social_backend=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let token_key = TokenKey::from_secret(&config.token_secret);

    match args.command {
        Commands::Run {} => serve(config, token_key).await,
        Commands::Migrate {} => ServiceState::new(&config)?.run_migrations(),
        Commands::Token { user_id } => {
            println!("{}", token_key.mint(user_id));
            Ok(())
        }
        Commands::CreateUser { username } => {
            let state = ServiceState::new(&config)?;
            let user = state.insert_user(User::new(username)).await?;
            println!("{}\t{}", user.id, token_key.mint(user.id));
            Ok(())
        }
    }
}

async fn serve(config: Config, token_key: TokenKey) -> Result<()> {
    debug!("Initializing resources");

    let service = ServiceState::new(&config)?;
    service.run_migrations()?;
    let state = AppState::new(Arc::new(service), token_key);

    let app = api::router(state);

    debug!("Running on {}", &config.bind_addr);
    let tcp_listener = TcpListener::bind(&config.bind_addr).await?;
    axum::serve(tcp_listener, app).await?;

    Ok(())
}
