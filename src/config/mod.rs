use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub system_db_name: String,
    pub template_db_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub redis_url: String,
    pub connect_timeout_ms: u64,
    pub retries: usize,
    pub default_ttl_secs: u64,
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiry_hours: u64,
    pub tenant_token_expiry_hours: u64,
    pub refresh_window_days: i64,
    pub allow_registration: bool,
    pub cors_origins: Vec<String>,
    pub google_client_id: Option<String>,
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
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }
        if let Ok(v) = env::var("SYSTEM_DB_NAME") {
            self.database.system_db_name = v;
        }
        if let Ok(v) = env::var("TEMPLATE_DB_NAME") {
            self.database.template_db_name = v;
        }

        // Cache overrides
        if let Ok(v) = env::var("REDIS_URL") {
            self.cache.redis_url = v;
        }
        if let Ok(v) = env::var("CACHE_CONNECT_TIMEOUT_MS") {
            self.cache.connect_timeout_ms = v.parse().unwrap_or(self.cache.connect_timeout_ms);
        }
        if let Ok(v) = env::var("CACHE_DEFAULT_TTL_SECS") {
            self.cache.default_ttl_secs = v.parse().unwrap_or(self.cache.default_ttl_secs);
        }
        if let Ok(v) = env::var("CACHE_SESSION_TTL_SECS") {
            self.cache.session_ttl_secs = v.parse().unwrap_or(self.cache.session_ttl_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_PORT").or_else(|_| env::var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ISSUER") {
            self.security.jwt_issuer = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_TENANT_TOKEN_EXPIRY_HOURS") {
            self.security.tenant_token_expiry_hours =
                v.parse().unwrap_or(self.security.tenant_token_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ALLOW_REGISTRATION") {
            self.security.allow_registration = v.parse().unwrap_or(self.security.allow_registration);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("GOOGLE_CLIENT_ID") {
            self.security.google_client_id = Some(v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                acquire_timeout_secs: 30,
                system_db_name: "erp_main".to_string(),
                template_db_name: "template_erp".to_string(),
            },
            cache: CacheConfig {
                redis_url: "redis://127.0.0.1:6379".to_string(),
                connect_timeout_ms: 200,
                retries: 1,
                default_ttl_secs: 300,
                session_ttl_secs: 60 * 60 * 24,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                default_page_size: 50,
                max_page_size: 1000,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-do-not-use-in-production".to_string(),
                jwt_issuer: "ketoan-api".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                tenant_token_expiry_hours: 24,
                refresh_window_days: 7,
                allow_registration: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                google_client_id: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                acquire_timeout_secs: 10,
                system_db_name: "erp_main".to_string(),
                template_db_name: "template_erp".to_string(),
            },
            cache: CacheConfig {
                redis_url: "redis://127.0.0.1:6379".to_string(),
                connect_timeout_ms: 200,
                retries: 2,
                default_ttl_secs: 300,
                session_ttl_secs: 60 * 60 * 12,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                default_page_size: 50,
                max_page_size: 500,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_issuer: "ketoan-api".to_string(),
                jwt_expiry_hours: 24,
                tenant_token_expiry_hours: 12,
                refresh_window_days: 7,
                allow_registration: true,
                cors_origins: vec!["https://staging.ketoan.example".to_string()],
                google_client_id: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                acquire_timeout_secs: 5,
                system_db_name: "erp_main".to_string(),
                template_db_name: "template_erp".to_string(),
            },
            cache: CacheConfig {
                redis_url: "redis://127.0.0.1:6379".to_string(),
                connect_timeout_ms: 100,
                retries: 2,
                default_ttl_secs: 600,
                session_ttl_secs: 60 * 60 * 8,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                default_page_size: 50,
                max_page_size: 200,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_issuer: "ketoan-api".to_string(),
                jwt_expiry_hours: 8,
                tenant_token_expiry_hours: 4,
                refresh_window_days: 7,
                allow_registration: false,
                cors_origins: vec!["https://app.ketoan.example".to_string()],
                google_client_id: None,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_development_config() {
        let config = AppConfig::development();
        assert!(config.security.allow_registration);
        assert_eq!(config.database.system_db_name, "erp_main");
        assert_eq!(config.api.max_page_size, 1000);
    }

    #[test]
    fn default_production_config() {
        let config = AppConfig::production();
        assert!(!config.security.allow_registration);
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.tenant_token_expiry_hours, 4);
    }
}
