use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub admin: AdminSeed,
}

/// Credentials for the admin account created on first start
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_var("SERVER_PORT", 5000)?,
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://csr.db".to_string()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS", 24)?,
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "public/uploads".to_string())
                .into(),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            admin: AdminSeed {
                email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@demo.com".to_string()),
                password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "password123".to_string()),
                name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} has an invalid value")]
    Invalid(&'static str),
}
