use std::net::SocketAddr;

use anyhow::Context;
use uuid::Uuid;

#[derive(Debug)]
pub struct Config {
    /// Seeds the stored server URL when set
    pub server_url: Option<String>,
    /// Seeds the stored API key when set
    pub api_key: Option<String>,
    pub source_id: Uuid,
    pub db_connection_string: String,
    pub bind_addr: String,
}

const DEFAULT_DB_CONNECTION_STRING: &str = "sqlite://db.sqlite?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let source_id = match non_empty_var("SOURCE_ID") {
            Some(raw) => Uuid::parse_str(&raw)
                .with_context(|| format!("Invalid SOURCE_ID: {}", raw))?,
            None => Uuid::nil(),
        };
        Ok(Config {
            server_url: non_empty_var("JELLYFIN_SERVER_URL"),
            api_key: non_empty_var("JELLYFIN_API_KEY"),
            source_id,
            db_connection_string: non_empty_var("DB_CONNECTION_STRING")
                .unwrap_or(DEFAULT_DB_CONNECTION_STRING.into()),
            bind_addr: non_empty_var("BIND_ADDR").unwrap_or(DEFAULT_BIND_ADDR.into()),
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(format!("BIND_ADDR is not a socket address: {}", self.bind_addr));
        }
        if !self.db_connection_string.starts_with("sqlite:") {
            return Err("DB_CONNECTION_STRING must be a sqlite connection string".into());
        }
        Ok(())
    }
}
