use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheMode {
    Redis,
    Local,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub mode: CacheMode,
    pub redis_url: Option<String>,
    pub default_ttl_secs: u64,
    pub connect_retries: u32,
    pub connect_timeout_secs: u64,
    pub retry_delay_secs: u64,
    /// Upper bound on any single Redis command after startup.
    pub op_timeout_ms: u64,
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub log_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub password_parallelism: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Checks the settings the server cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.security.jwt_expiry_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRY_HOURS",
                reason: "must be a positive number of hours".to_string(),
            });
        }
        if self.cache.mode == CacheMode::Redis && self.cache.op_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "CACHE_OP_TIMEOUT_MS",
                reason: "must be a positive number of milliseconds".to_string(),
            });
        }
        if self.cache.mode == CacheMode::Redis && self.cache.connect_retries == 0 {
            return Err(ConfigError::Invalid {
                key: "CACHE_CONNECT_RETRIES",
                reason: "at least one connection attempt is required".to_string(),
            });
        }
        Ok(())
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Cache overrides
        if let Ok(v) = env::var("CACHE_MODE") {
            self.cache.mode = match v.to_ascii_lowercase().as_str() {
                "redis" => CacheMode::Redis,
                "local" | "memory" => CacheMode::Local,
                "disabled" | "off" | "none" => CacheMode::Disabled,
                _ => self.cache.mode,
            };
        }
        if let Ok(v) = env::var("REDIS_URL") {
            self.cache.redis_url = Some(v).filter(|url| !url.is_empty());
        }
        if let Ok(v) = env::var("CACHE_DEFAULT_TTL_SECS") {
            self.cache.default_ttl_secs = v.parse().unwrap_or(self.cache.default_ttl_secs);
        }
        if let Ok(v) = env::var("CACHE_CONNECT_RETRIES") {
            self.cache.connect_retries = v.parse().unwrap_or(self.cache.connect_retries);
        }
        if let Ok(v) = env::var("CACHE_CONNECT_TIMEOUT_SECS") {
            self.cache.connect_timeout_secs = v.parse().unwrap_or(self.cache.connect_timeout_secs);
        }
        if let Ok(v) = env::var("CACHE_RETRY_DELAY_SECS") {
            self.cache.retry_delay_secs = v.parse().unwrap_or(self.cache.retry_delay_secs);
        }
        if let Ok(v) = env::var("CACHE_OP_TIMEOUT_MS") {
            self.cache.op_timeout_ms = v.parse().unwrap_or(self.cache.op_timeout_ms);
        }

        // API overrides
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("LOG_FILTER") {
            self.api.log_filter = v;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("PASSWORD_MEMORY_KIB") {
            self.security.password_memory_kib = v.parse().unwrap_or(self.security.password_memory_kib);
        }
        if let Ok(v) = env::var("PASSWORD_ITERATIONS") {
            self.security.password_iterations = v.parse().unwrap_or(self.security.password_iterations);
        }
        if let Ok(v) = env::var("PASSWORD_PARALLELISM") {
            self.security.password_parallelism = v.parse().unwrap_or(self.security.password_parallelism);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            cache: CacheConfig {
                mode: CacheMode::Redis,
                redis_url: None,
                default_ttl_secs: 15 * 60,
                connect_retries: 3,
                connect_timeout_secs: 5,
                retry_delay_secs: 2,
                op_timeout_ms: 500,
            },
            api: ApiConfig {
                port: 3000,
                log_filter: "course_catalog=debug,tower_http=debug,info".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: crate::auth::DEFAULT_TOKEN_TTL_HOURS,
                password_memory_kib: 19 * 1024,
                password_iterations: 2,
                password_parallelism: 1,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.api.log_filter = "course_catalog=info,tower_http=info,warn".to_string();
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.api.log_filter = "course_catalog=info,warn".to_string();
        config.security.password_memory_kib = 64 * 1024;
        config.security.password_iterations = 3;
        config
    }
}
