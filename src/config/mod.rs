//! Configuration module for the announcements backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

/// A teacher to upsert into the directory at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedTeacher {
    pub username: String,
    pub display_name: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Teachers seeded into the directory on startup
    pub seed_teachers: Vec<SeedTeacher>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AddrParseError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("ANNOUNCEMENTS_DB_PATH")
            .unwrap_or_else(|_| "./data/announcements.sqlite".to_string())
            .into();

        let bind_addr = env::var("ANNOUNCEMENTS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let log_level = env::var("ANNOUNCEMENTS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let seed_teachers = env::var("ANNOUNCEMENTS_SEED_TEACHERS")
            .map(|raw| parse_seed_teachers(&raw))
            .unwrap_or_default();

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            seed_teachers,
        })
    }
}

/// Parse a comma-separated list of `username` or `username:Display Name` entries.
pub fn parse_seed_teachers(raw: &str) -> Vec<SeedTeacher> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let (username, display_name) = match entry.split_once(':') {
                Some((username, name)) => (username.trim(), name.trim()),
                None => (entry, ""),
            };
            if username.is_empty() {
                return None;
            }
            let display_name = if display_name.is_empty() {
                username
            } else {
                display_name
            };
            Some(SeedTeacher {
                username: username.to_string(),
                display_name: display_name.to_string(),
            })
        })
        .collect()
}
