//! Server configuration from environment variables.

use adboard_core::sync::DEFAULT_SYNC_WINDOW_DAYS;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub database_path: String,
    pub static_dir: String,
    pub sync_window_days: u32,
    /// Password for the admin session login; login is disabled when unset.
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            listen_addr: env_or("LISTEN_ADDR", "127.0.0.1:8080"),
            database_path: env_or("DATABASE_PATH", "adboard.db"),
            static_dir: env_or("STATIC_DIR", "dist"),
            sync_window_days: parse_window_days(non_empty_env("SYNC_WINDOW_DAYS").as_deref()),
            admin_password: non_empty_env("ADMIN_PASSWORD"),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    non_empty_env(name).unwrap_or_else(|| default.to_string())
}

fn parse_window_days(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.parse::<u32>().ok())
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_SYNC_WINDOW_DAYS)
}
