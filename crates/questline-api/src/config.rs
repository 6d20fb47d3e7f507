//! Server configuration read from the environment.

use std::net::SocketAddr;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Where records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL via a connection pool.
    Postgres {
        /// Connection string.
        database_url: String,
        /// Pool size.
        max_connections: u32,
    },
    /// Process memory; everything is lost on exit.
    Memory,
}

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address to bind.
    pub listen_addr: SocketAddr,
    /// Record store selection.
    pub store: StoreBackend,
    /// OTLP collector endpoint; tracing export is off when absent.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// Recognized variables: `STORE_BACKEND` (`postgres` or `memory`),
    /// `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`, `HOST`, `PORT`,
    /// `OTEL_EXPORTER_OTLP_ENDPOINT`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;

        let backend = lookup("STORE_BACKEND").unwrap_or_else(|| "postgres".to_owned());
        let store = match backend.to_ascii_lowercase().as_str() {
            "postgres" => {
                let database_url = lookup("DATABASE_URL").ok_or_else(|| {
                    AppError::Config("DATABASE_URL environment variable must be set".into())
                })?;
                let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
                    Some(raw) => raw.parse().map_err(|e| {
                        AppError::Config(format!(
                            "DATABASE_MAX_CONNECTIONS must be a positive integer: {e}"
                        ))
                    })?,
                    None => DEFAULT_MAX_CONNECTIONS,
                };
                if max_connections == 0 {
                    return Err(AppError::Config(
                        "DATABASE_MAX_CONNECTIONS must be a positive integer".into(),
                    ));
                }
                StoreBackend::Postgres {
                    database_url,
                    max_connections,
                }
            }
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::Config(format!(
                    "STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        let otlp_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty());

        Ok(Self {
            listen_addr,
            store,
            otlp_endpoint,
        })
    }
}
