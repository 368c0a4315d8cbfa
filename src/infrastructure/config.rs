use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub store_timeout_ms: u64,
    pub max_pool_size: u32,
    #[serde(default)]
    pub critical_max_results: Option<u64>,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Defaults, then `config/velib.*` if present, then the process environment.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    build_app_config(config::Environment::default().try_parsing(true))
}

fn build_app_config(environment: config::Environment) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("mongodb_uri", "mongodb://localhost:27017")?
        .set_default("mongodb_database", "velib_db")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", 3000)?
        .set_default("environment", "development")?
        .set_default("store_timeout_ms", 5000)?
        .set_default("max_pool_size", 10)?
        .add_source(config::File::with_name("config/velib").required(false))
        .add_source(environment)
        .build()?;

    Ok(settings.try_deserialize()?)
}
