use std::env;

use bcrypt::DEFAULT_COST;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_AUTHOR_USERNAME: &str = "default_author";
const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Superuser account created at startup when all three fields are configured.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub page_size: usize,
    pub default_author_username: String,
    /// Turns a missing author on post creation into a validation error
    /// instead of walking the fallback chain.
    pub require_explicit_author: bool,
    pub seed_categories: Vec<String>,
    pub admin: Option<AdminSeed>,
}

impl Config {
    /// Defaults for everything except the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            jwt_secret: jwt_secret.into(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            bcrypt_cost: DEFAULT_COST,
            page_size: DEFAULT_PAGE_SIZE,
            default_author_username: DEFAULT_AUTHOR_USERNAME.to_string(),
            require_explicit_author: false,
            seed_categories: Vec::new(),
            admin: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let mut config = Self::new(jwt_secret);

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(raw) = lookup("TOKEN_TTL_HOURS") {
            config.token_ttl_hours = parse("TOKEN_TTL_HOURS", raw)?;
        }
        if let Some(raw) = lookup("BCRYPT_COST") {
            config.bcrypt_cost = parse("BCRYPT_COST", raw)?;
        }
        if let Some(raw) = lookup("PAGE_SIZE") {
            config.page_size = parse("PAGE_SIZE", raw)?;
            if config.page_size == 0 {
                return Err(ConfigError::Invalid {
                    key: "PAGE_SIZE",
                    value: "0".into(),
                });
            }
        }
        if let Some(username) = lookup("DEFAULT_AUTHOR_USERNAME") {
            config.default_author_username = username;
        }
        if let Some(raw) = lookup("REQUIRE_EXPLICIT_AUTHOR") {
            config.require_explicit_author = parse_bool("REQUIRE_EXPLICIT_AUTHOR", raw)?;
        }
        if let Some(raw) = lookup("SEED_CATEGORIES") {
            config.seed_categories = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        config.admin = match (
            lookup("ADMIN_USERNAME"),
            lookup("ADMIN_EMAIL"),
            lookup("ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(AdminSeed {
                username,
                email,
                password,
            }),
            _ => None,
        };

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}

fn parse_bool(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}
