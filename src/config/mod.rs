use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub i18n: I18nConfig,
    pub pagination: PaginationConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_token_lifetime_minutes: i64,
    pub refresh_token_lifetime_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// `None` disables pagination on list actions
    pub page_size: Option<usize>,
    pub max_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Seed accounts for the in-memory provider
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    /// Salted SHA-256 hex digest, see `auth::hash_password`
    pub password_digest: String,
}

impl SeedUser {
    /// Parse `username:digest`
    pub fn parse(entry: &str) -> Option<Self> {
        let (username, digest) = entry.trim().split_once(':')?;
        if username.is_empty() || digest.is_empty() {
            return None;
        }
        Some(Self {
            username: username.to_string(),
            password_digest: digest.to_string(),
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = env::var("API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ISSUER") {
            self.security.jwt_issuer = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_LIFETIME_MINUTES") {
            self.security.access_token_lifetime_minutes =
                v.parse().unwrap_or(self.security.access_token_lifetime_minutes);
        }
        if let Ok(v) = env::var("JWT_REFRESH_LIFETIME_DAYS") {
            self.security.refresh_token_lifetime_days =
                v.parse().unwrap_or(self.security.refresh_token_lifetime_days);
        }

        // Localization
        if let Ok(v) = env::var("APP_LANGUAGE") {
            self.i18n.language = v;
        }

        // Pagination overrides; PAGE_SIZE=0 disables pagination
        if let Ok(v) = env::var("PAGE_SIZE") {
            if let Ok(size) = v.parse::<usize>() {
                self.pagination.page_size = (size > 0).then_some(size);
            }
        }
        if let Ok(v) = env::var("MAX_PAGE_SIZE") {
            self.pagination.max_page_size = v.parse().unwrap_or(self.pagination.max_page_size);
        }

        // Seed accounts
        if let Ok(v) = env::var("AUTH_USERS") {
            self.auth.users = v.split(',').filter_map(SeedUser::parse).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-only-secret".to_string(),
                jwt_issuer: "global-api".to_string(),
                access_token_lifetime_minutes: 60,
                refresh_token_lifetime_days: 7,
            },
            i18n: I18nConfig {
                language: "en".to_string(),
            },
            pagination: PaginationConfig {
                page_size: Some(100),
                max_page_size: 1000,
            },
            auth: AuthConfig { users: Vec::new() },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8000,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_issuer: "global-api".to_string(),
                access_token_lifetime_minutes: 5,
                refresh_token_lifetime_days: 1,
            },
            i18n: I18nConfig {
                language: "en".to_string(),
            },
            pagination: PaginationConfig {
                page_size: Some(50),
                max_page_size: 500,
            },
            auth: AuthConfig { users: Vec::new() },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8000,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_issuer: "global-api".to_string(),
                access_token_lifetime_minutes: 5,
                refresh_token_lifetime_days: 1,
            },
            i18n: I18nConfig {
                language: "en".to_string(),
            },
            pagination: PaginationConfig {
                page_size: Some(20),
                max_page_size: 100,
            },
            auth: AuthConfig { users: Vec::new() },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.pagination.page_size, Some(100));
        assert_eq!(config.i18n.language, "en");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.access_token_lifetime_minutes, 5);
        assert_eq!(config.pagination.max_page_size, 100);
    }

    #[test]
    fn test_seed_user_parsing() {
        assert_eq!(
            SeedUser::parse(" alice:abc123 "),
            Some(SeedUser {
                username: "alice".to_string(),
                password_digest: "abc123".to_string()
            })
        );
        assert_eq!(SeedUser::parse("alice"), None);
        assert_eq!(SeedUser::parse(":abc"), None);
    }
}
