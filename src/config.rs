use std::fmt;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/hello_db";
const DEFAULT_DATABASE_NAME: &str = "hello_db";

/// Runtime mode of the service. Only `Development` discloses stack traces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
    Other(String),
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
            Environment::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Memory,
    Mongo { uri: String, database: String },
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPort(String),
    UnknownBackend(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(value) => write!(f, "PORT must be a valid port number, got '{}'", value),
            ConfigError::UnknownBackend(value) => {
                write!(f, "DATABASE_BACKEND must be 'memory' or 'mongo', got '{}'", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable service configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// `None` when neither APP_ENV nor NODE_ENV is set.
    pub environment: Option<Environment>,
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_ORIGIN.to_string()],
            environment: None,
            storage: StorageConfig::Memory,
        }
    }
}

impl AppConfig {
    /// Reads the process environment (after `.env` has been loaded by the caller).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_ORIGIN.to_string()]);

        let environment = lookup("APP_ENV")
            .or_else(|| lookup("NODE_ENV"))
            .filter(|value| !value.trim().is_empty())
            .map(|value| Environment::parse(&value));

        let storage = match lookup("DATABASE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("memory") => StorageConfig::Memory,
            Some("mongo") | Some("mongodb") => StorageConfig::Mongo {
                uri: lookup("MONGODB_URI").unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string()),
                database: lookup("DATABASE_NAME").unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            },
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            host,
            port,
            allowed_origins,
            environment,
            storage,
        })
    }

    /// Name reported by `/health`; an unset environment reads as development.
    pub fn environment_name(&self) -> &str {
        self.environment
            .as_ref()
            .map(Environment::as_str)
            .unwrap_or("development")
    }

    /// Stack traces are only disclosed when development mode was set explicitly.
    pub fn exposes_stack(&self) -> bool {
        matches!(self.environment, Some(Environment::Development))
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
