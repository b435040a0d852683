//! Application configuration loaded from environment.

use std::net::SocketAddr;

/// One hour.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;
/// Sixty days.
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 60 * 24 * 60 * 60;
/// Upper bound for either token lifetime: one hundred years.
pub const MAX_TOKEN_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:8080`).
    pub server_addr: SocketAddr,
    /// HMAC secret used to sign access and refresh tokens.
    pub jwt_secret: String,
    /// API key expected from the Polka payment webhook.
    pub polka_key: String,
    /// Lifetime of access tokens, in seconds.
    pub access_token_ttl_secs: i64,
    /// Lifetime of refresh tokens, in seconds.
    pub refresh_token_ttl_secs: i64,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let server_addr = std::env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "chirpy_jwt_secret_change_in_production".to_string());
        if jwt_secret.is_empty() {
            return Err(ConfigLoadError::EmptyJwtSecret);
        }
        let polka_key = std::env::var("POLKA_KEY").unwrap_or_default();

        let access_token_ttl_secs =
            ttl_from_env("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        let refresh_token_ttl_secs =
            ttl_from_env("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TOKEN_TTL_SECS)?;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            server_addr,
            jwt_secret,
            polka_key,
            access_token_ttl_secs,
            refresh_token_ttl_secs,
            log_level,
        })
    }
}

fn ttl_from_env(var: &'static str, default: i64) -> Result<i64, ConfigLoadError> {
    match std::env::var(var) {
        Ok(raw) => match raw.trim().parse::<i64>() {
            Ok(secs) if secs > 0 && secs <= MAX_TOKEN_TTL_SECS => Ok(secs),
            _ => Err(ConfigLoadError::InvalidTtl(var)),
        },
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("JWT_SECRET must not be empty")]
    EmptyJwtSecret,
    #[error("Invalid {0}: expected a positive number of seconds, at most one hundred years")]
    InvalidTtl(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_when_unset() {
        assert_eq!(ttl_from_env("CHIRPY_TEST_TTL_UNSET", 42).unwrap(), 42);
    }

    #[test]
    fn ttl_rejects_non_positive_and_garbage() {
        std::env::set_var("CHIRPY_TEST_TTL_ZERO", "0");
        std::env::set_var("CHIRPY_TEST_TTL_TEXT", "soon");
        assert!(matches!(
            ttl_from_env("CHIRPY_TEST_TTL_ZERO", 1),
            Err(ConfigLoadError::InvalidTtl("CHIRPY_TEST_TTL_ZERO"))
        ));
        assert!(ttl_from_env("CHIRPY_TEST_TTL_TEXT", 1).is_err());
    }

    #[test]
    fn ttl_rejects_values_past_the_cap() {
        std::env::set_var("CHIRPY_TEST_TTL_HUGE", "100000000000000");
        assert!(matches!(
            ttl_from_env("CHIRPY_TEST_TTL_HUGE", 1),
            Err(ConfigLoadError::InvalidTtl("CHIRPY_TEST_TTL_HUGE"))
        ));
        std::env::set_var("CHIRPY_TEST_TTL_MAX", MAX_TOKEN_TTL_SECS.to_string());
        assert_eq!(
            ttl_from_env("CHIRPY_TEST_TTL_MAX", 1).unwrap(),
            MAX_TOKEN_TTL_SECS
        );
    }

    #[test]
    fn ttl_parses_seconds() {
        std::env::set_var("CHIRPY_TEST_TTL_OK", " 120 ");
        assert_eq!(ttl_from_env("CHIRPY_TEST_TTL_OK", 1).unwrap(), 120);
    }
}
