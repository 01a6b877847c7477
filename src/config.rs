use dotenvy::var;
use eyre::{Result, WrapErr};
use tracing::debug;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Process configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub token_secret: String,
    pub pool_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("no .env file loaded: {e}");
        }

        let database_url = var("DATABASE_URL").wrap_err("DATABASE_URL must be set")?;
        let token_secret = var("TOKEN_SECRET").wrap_err("TOKEN_SECRET must be set")?;
        let bind_addr = var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let pool_size = match var("DB_POOL_SIZE") {
            Ok(size) => size.parse().wrap_err("DB_POOL_SIZE must be a positive integer")?,
            Err(_) => DEFAULT_POOL_SIZE,
        };

        Ok(Config {
            database_url,
            bind_addr,
            token_secret,
            pool_size,
        })
    }
}
