use log::info;
use std::{env, fmt, str::FromStr};

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_address: String,
    pub max_connections: u32,
    pub token_ttl_hours: i64,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "invalid {} value '{}'", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            max_connections: try_load("DATABASE_MAX_CONNECTIONS", 10)?,
            token_ttl_hours: try_load("TOKEN_TTL_HOURS", 24)?,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn try_load<T: FromStr + fmt::Display>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        for key in [
            "DATABASE_URL",
            "JWT_SECRET",
            "BIND_ADDRESS",
            "DATABASE_MAX_CONNECTIONS",
            "TOKEN_TTL_HOURS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_when_optional_values_absent() {
        clear();
        env::set_var("DATABASE_URL", "postgres://localhost/fittrack");
        env::set_var("JWT_SECRET", "s3cret");

        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.token_ttl_hours, 24);
        clear();
    }

    #[test]
    #[serial]
    fn empty_secret_is_rejected() {
        clear();
        env::set_var("DATABASE_URL", "postgres://localhost/fittrack");
        env::set_var("JWT_SECRET", "  ");

        assert_eq!(Config::from_env().unwrap_err(), ConfigError::Missing("JWT_SECRET"));
        clear();
    }

    #[test]
    #[serial]
    fn unparsable_number_is_reported() {
        clear();
        env::set_var("DATABASE_URL", "postgres://localhost/fittrack");
        env::set_var("JWT_SECRET", "s3cret");
        env::set_var("TOKEN_TTL_HOURS", "a day");

        let err = Config::from_env().unwrap_err();
        assert_eq!(err.to_string(), "invalid TOKEN_TTL_HOURS value 'a day'");
        clear();
    }
}
