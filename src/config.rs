use std::env;
use std::path::PathBuf;

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    pub fn label(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Process configuration, read from the environment once at startup and
/// passed by reference into the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub serve_frontend: bool,
    pub frontend_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub stock_file: PathBuf,
    pub flowers_dir: PathBuf,
    pub bg_dir: PathBuf,
    pub vision_endpoint: String,
    pub vision_api_key: String,
    pub dalle_endpoint: String,
    pub dalle_api_key: String,
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn env_csv(name: &str, default: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

impl Config {
    pub fn load() -> Result<Self> {
        let environment = Environment::parse(&env_string("APP_ENV", "development"));

        // In development the frontend dev server runs on its own port; in
        // production only an explicitly configured origin is allowed.
        let default_origins = match environment {
            Environment::Development => "http://localhost:3000,http://localhost:3001",
            Environment::Production => "",
        };

        Ok(Config {
            port: env_u16("PORT", 5000),
            environment,
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            cors_origins: env_csv("CORS_ORIGINS", default_origins),
            serve_frontend: env_bool("SERVE_FRONTEND", environment.is_production()),
            frontend_dir: PathBuf::from(env_string("FRONTEND_DIR", "../frontend/dist")),
            upload_dir: PathBuf::from(env_string("UPLOAD_DIR", "uploads")),
            stock_file: PathBuf::from(env_string("STOCK_FILE", "data/flower_stock.csv")),
            flowers_dir: PathBuf::from(env_string("FLOWERS_DIR", "Flowers")),
            bg_dir: PathBuf::from(env_string("BG_DIR", "bg_onam")),
            vision_endpoint: env_string("GPT4_VISION_ENDPOINT", ""),
            vision_api_key: env_string("GPT4_VISION_API_KEY", ""),
            dalle_endpoint: env_string("DALLE_ENDPOINT", ""),
            dalle_api_key: env_string("DALLE_API_KEY", ""),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parse_accepts_aliases() {
        assert!(Environment::parse("production").is_production());
        assert!(Environment::parse("PROD").is_production());
        assert!(!Environment::parse("development").is_production());
        assert!(!Environment::parse("anything-else").is_production());
    }
}
