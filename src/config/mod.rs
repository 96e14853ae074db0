use std::env;

use thiserror::Error;

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Process configuration. Built once at startup and handed to the
/// collaborators that need it; nothing reads the environment after that.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub enable_response_compression: bool,
    pub max_request_size_bytes: usize,
    /// Upper bound on the number of videos returned by `/videos/random`.
    pub random_sample_size: usize,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    /// Lifetime of both the signed token and the `access_token` cookie.
    pub token_ttl_hours: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    /// Marks the session cookie `Secure`.
    pub require_https: bool,
    /// Admin account ensured at server startup.
    pub bootstrap_admin: Option<AdminCredentials>,
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,

    #[error("bcrypt cost must be between 4 and 31, got {0}")]
    InvalidBcryptCost(u32),

    #[error("DATABASE_URL must be set for the postgres storage backend")]
    MissingDatabaseUrl,

    #[error("DATABASE_URL is not a postgres URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("token lifetime must be at least one hour")]
    InvalidTokenTtl,
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
        .with_overrides(|key| env::var(key).ok())
    }

    /// Apply per-key overrides on top of an environment preset.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
            self.database.backend = StorageBackend::Postgres;
        }
        match lookup("STORAGE_BACKEND").as_deref() {
            Some("memory") => self.database.backend = StorageBackend::Memory,
            Some("postgres") => self.database.backend = StorageBackend::Postgres,
            _ => {}
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API
        if let Some(v) = lookup("API_ENABLE_RESPONSE_COMPRESSION") {
            self.api.enable_response_compression = v.parse().unwrap_or(self.api.enable_response_compression);
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Some(v) = lookup("API_RANDOM_SAMPLE_SIZE") {
            self.api.random_sample_size = v.parse().unwrap_or(self.api.random_sample_size);
        }

        // Security
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("SECURITY_TOKEN_TTL_HOURS") {
            self.security.token_ttl_hours = v.parse().unwrap_or(self.security.token_ttl_hours);
        }
        if let Some(v) = lookup("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("SECURITY_REQUIRE_HTTPS") {
            self.security.require_https = v.parse().unwrap_or(self.security.require_https);
        }
        if let (Some(username), Some(password)) = (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            self.security.bootstrap_admin = Some(AdminCredentials { username, password });
        }

        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(self.security.bcrypt_cost));
        }
        if self.security.token_ttl_hours == 0 {
            return Err(ConfigError::InvalidTokenTtl);
        }
        if self.database.backend == StorageBackend::Postgres {
            let raw = self.database.url.as_deref().ok_or(ConfigError::MissingDatabaseUrl)?;
            let parsed = url::Url::parse(raw).map_err(|_| ConfigError::InvalidDatabaseUrl(redact(raw)))?;
            if !matches!(parsed.scheme(), "postgres" | "postgresql") {
                return Err(ConfigError::InvalidDatabaseUrl(redact(raw)));
            }
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.security.token_ttl_hours as i64)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 1234,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                enable_response_compression: false,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                random_sample_size: 40,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                token_ttl_hours: 24 * 7,
                bcrypt_cost: 12,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                require_https: false,
                bootstrap_admin: None,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 1234,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                enable_response_compression: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                random_sample_size: 40,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_ttl_hours: 24 * 7,
                bcrypt_cost: 12,
                cors_origins: vec!["https://staging.example.com".to_string()],
                require_https: true,
                bootstrap_admin: None,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 1234,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                enable_response_compression: true,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                random_sample_size: 40,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_ttl_hours: 24 * 7,
                bcrypt_cost: 12,
                cors_origins: vec!["https://app.example.com".to_string()],
                require_https: true,
                bootstrap_admin: None,
            },
        }
    }
}

/// Strip credentials from a connection string before it reaches logs or errors.
pub fn redact(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable>".to_string(),
    }
}
