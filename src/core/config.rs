use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Local, Offset, Utc};

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub queue: QueueConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Where tickets and the department catalog live
#[derive(Debug, Clone)]
pub enum StorageConfig {
    Postgres(DatabaseConfig),
    /// Process-local storage, optionally seeded with a catalog JSON file
    Memory { catalog_seed_file: Option<PathBuf> },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Tuning knobs for the ticketing engine
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Offset used for every "today" decision (allocation, estimation, reset)
    pub utc_offset: FixedOffset,
    pub now_serving_ttl: Duration,
    pub cache_sweep_interval: Duration,
    pub default_service_minutes: f64,
    pub service_history_days: i64,
    pub allocation_max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            queue: QueueConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let backend = env::var("QUEUE_STORAGE").unwrap_or_else(|_| "postgres".to_string());

        match backend.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres(DatabaseConfig::from_env()?)),
            "memory" => Ok(Self::Memory {
                catalog_seed_file: env::var("CATALOG_SEED_FILE")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from),
            }),
            other => Err(format!(
                "QUEUE_STORAGE must be 'postgres' or 'memory', got '{}'",
                other
            )),
        }
    }
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_or("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_or("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_or("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl QueueConfig {
    const DEFAULT_NOW_SERVING_TTL_SECS: u64 = 300; // 5 minutes
    const DEFAULT_CACHE_SWEEP_INTERVAL_SECS: u64 = 60;
    const DEFAULT_SERVICE_MINUTES: f64 = 10.0;
    const DEFAULT_SERVICE_HISTORY_DAYS: i64 = 7;
    const DEFAULT_ALLOCATION_MAX_RETRIES: u32 = 3;

    pub fn from_env() -> Result<Self, String> {
        // Fall back to the server's own offset so "today" matches the wall clock at the counter
        let utc_offset = match env::var("QUEUE_UTC_OFFSET").ok().filter(|s| !s.is_empty()) {
            Some(raw) => parse_utc_offset(&raw)?,
            None => Local::now().offset().fix(),
        };

        let default_service_minutes =
            parse_or("DEFAULT_SERVICE_MINUTES", Self::DEFAULT_SERVICE_MINUTES)?;
        if default_service_minutes <= 0.0 {
            return Err("DEFAULT_SERVICE_MINUTES must be greater than zero".to_string());
        }

        let service_history_days =
            parse_or("SERVICE_HISTORY_DAYS", Self::DEFAULT_SERVICE_HISTORY_DAYS)?;
        if service_history_days < 1 {
            return Err("SERVICE_HISTORY_DAYS must be at least 1".to_string());
        }

        Ok(Self {
            utc_offset,
            now_serving_ttl: positive_secs(
                "NOW_SERVING_TTL_SECS",
                parse_or("NOW_SERVING_TTL_SECS", Self::DEFAULT_NOW_SERVING_TTL_SECS)?,
            )?,
            cache_sweep_interval: positive_secs(
                "CACHE_SWEEP_INTERVAL_SECS",
                parse_or(
                    "CACHE_SWEEP_INTERVAL_SECS",
                    Self::DEFAULT_CACHE_SWEEP_INTERVAL_SECS,
                )?,
            )?,
            default_service_minutes,
            service_history_days,
            allocation_max_retries: parse_or(
                "ALLOCATION_MAX_RETRIES",
                Self::DEFAULT_ALLOCATION_MAX_RETRIES,
            )?,
        })
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            now_serving_ttl: Duration::from_secs(Self::DEFAULT_NOW_SERVING_TTL_SECS),
            cache_sweep_interval: Duration::from_secs(Self::DEFAULT_CACHE_SWEEP_INTERVAL_SECS),
            default_service_minutes: Self::DEFAULT_SERVICE_MINUTES,
            service_history_days: Self::DEFAULT_SERVICE_HISTORY_DAYS,
            allocation_max_retries: Self::DEFAULT_ALLOCATION_MAX_RETRIES,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "City Hall Queue API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Service-counter ticketing and wait-time estimation".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr + ToString,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid number", key))
}

/// Non-zero number of seconds; a zero TTL or sweep interval is a misconfiguration
fn positive_secs(key: &str, secs: u64) -> Result<Duration, String> {
    if secs == 0 {
        return Err(format!("{} must be greater than zero", key));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses offsets written as `+08:00`, `-0530`, `+7` or `Z`
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let invalid = || format!("QUEUE_UTC_OFFSET '{}' is not a valid offset", raw);

    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'+') => (1, &raw[1..]),
        Some(b'-') => (-1, &raw[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
