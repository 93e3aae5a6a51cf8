use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use leavedesk_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

const MIN_BOOTSTRAP_TOKEN_CHARS: usize = 16;

/// Process settings, read from the environment once in `main`.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `leavedesk-api migrate` applies migrations and exits.
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Allowed CORS origin and the origin mutations must come from.
    pub frontend_url: String,
    /// Shared secret for creating the first super admin.
    pub bootstrap_token: String,
    pub api_host: IpAddr,
    pub api_port: u16,
    pub cookie_secure: bool,
}

impl ApiConfig {
    pub fn load() -> AppResult<Self> {
        let database_max_connections = optional("DATABASE_MAX_CONNECTIONS", 10_u32)?;
        if database_max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_owned(),
            ));
        }

        let bootstrap_token = required("AUTH_BOOTSTRAP_TOKEN")?;
        if bootstrap_token.chars().count() < MIN_BOOTSTRAP_TOKEN_CHARS {
            return Err(AppError::Validation(format!(
                "AUTH_BOOTSTRAP_TOKEN must be at least {MIN_BOOTSTRAP_TOKEN_CHARS} characters"
            )));
        }

        Ok(Self {
            migrate_only: env::args().nth(1).is_some_and(|command| command == "migrate"),
            database_url: required("DATABASE_URL")?,
            database_max_connections,
            frontend_url: optional("FRONTEND_URL", "http://localhost:3000".to_owned())?,
            bootstrap_token,
            api_host: optional("API_HOST", IpAddr::from([127, 0, 0, 1]))?,
            api_port: optional("API_PORT", 3001_u16)?,
            cookie_secure: optional("SESSION_COOKIE_SECURE", false)?,
        })
    }

    #[must_use]
    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::new(self.api_host, self.api_port)
    }
}

/// Installs the global subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();
}

fn required(name: &str) -> AppResult<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        Ok(_) => Err(AppError::Validation(format!("{name} must not be empty"))),
        Err(_) => Err(AppError::Validation(format!("{name} is required"))),
    }
}

fn optional<T>(name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env::var(name)
        .ok()
        .map_or(Ok(default), |raw| parse_setting(name, &raw))
}

fn parse_setting<T>(name: &str, raw: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|error| AppError::Validation(format!("invalid {name} '{raw}': {error}")))
}
