// Runtime configuration, loaded with the 'config' crate and 'dotenv'

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Marketplace REST API the client talks to
    pub api_base_url: String,
    // Where the gateway listens
    pub server_address: String,
    pub proxy_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("server_address", "127.0.0.1:8080")?
            .set_default("request_timeout_secs", 30)?
            // Optional config.toml next to the binary
            .add_source(File::with_name("config").required(false))
            // COTECAR_API_BASE_URL, COTECAR_SERVER_ADDRESS, ...
            .add_source(
                Environment::with_prefix("COTECAR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            server_address: "127.0.0.1:8080".to_string(),
            proxy_url: None,
            request_timeout_secs: 30,
        }
    }
}
