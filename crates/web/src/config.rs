use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Comma separated admin keys.
    pub admin_api_keys: String,
    /// Comma separated `judge_id:key` pairs.
    pub judge_api_keys: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            admin_api_keys: std::env::var("ADMIN_API_KEYS").unwrap_or_default(),
            judge_api_keys: std::env::var("JUDGE_API_KEYS").unwrap_or_default(),
        })
    }
}
