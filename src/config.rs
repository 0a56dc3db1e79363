use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Base URL of the stamp-hub RPC service.
    pub hub_url: String,
    /// Per-request timeout for hub calls, in seconds.
    /// Set via STAMP_HUB_TIMEOUT_SECS. Default: 30.
    pub hub_timeout_secs: u64,
    pub admin_key: Option<String>,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let admin_key = std::env::var("STAMP_ADMIN_KEY").ok();
    if admin_key.is_none() {
        let env_mode = std::env::var("STAMP_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!("STAMP_ADMIN_KEY must be set before running in production.");
        }
        eprintln!("⚠️  STAMP_ADMIN_KEY is not set — the management API is unauthenticated.");
    }

    Ok(Config {
        port: std::env::var("STAMP_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        hub_url: std::env::var("STAMP_HUB_URL")
            .unwrap_or_else(|_| "http://localhost:4000".into()),
        hub_timeout_secs: std::env::var("STAMP_HUB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
        admin_key,
    })
}
