use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::services::scoring::DEFAULT_TIMEOUT_MS;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub database_url: Option<String>,
    pub scoring_webhook_url: Option<String>,
    pub scoring_timeout: Duration,
    pub vocabulary_path: Option<PathBuf>,
    pub jwt_secret: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_string("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8000);

        let host = env_string("HOST")
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = env_string("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let scoring_timeout_ms = env_string("SCORING_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self {
            host,
            port,
            log_level,
            log_dir: file_logging_enabled()
                .then(|| env_string("LOG_DIR").unwrap_or_else(|| "./logs".to_string()))
                .map(PathBuf::from),
            database_url: env_string("DATABASE_URL"),
            scoring_webhook_url: env_string("SCORING_WEBHOOK_URL")
                .or_else(|| env_string("N8N_WEBHOOK_URL")),
            scoring_timeout: Duration::from_millis(scoring_timeout_ms),
            vocabulary_path: env_string("VOCABULARY_PATH").map(PathBuf::from),
            jwt_secret: env_string("JWT_SECRET"),
            allowed_origins: env_string("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn file_logging_enabled() -> bool {
    env_string("ENABLE_FILE_LOGS").is_some_and(|v| v == "true" || v == "1")
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_drops_blanks() {
        let origins = parse_origins(" https://hogword.site/ ,, http://localhost:3000 ");
        assert_eq!(origins, vec!["https://hogword.site", "http://localhost:3000"]);
    }
}
