use crate::domain::role::Role;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionSettings {
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    #[serde(default = "default_ttl_ms")]
    pub default_ttl_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_ttl_ms() -> u64 {
    3_000
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            default_ttl_ms: default_ttl_ms(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl NotificationSettings {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

/// Load `config/relief.{toml,...}` if present, overridden by `RELIEF__*`
/// environment variables (e.g. `RELIEF__API__BASE_URL`).
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/relief").required(false))
        .add_source(
            config::Environment::with_prefix("RELIEF")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
    build_app_config(builder)
}

fn build_app_config(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AppConfig> {
    let settings = builder.build()?;
    let config: AppConfig = settings.try_deserialize()?;

    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(toml: &str) -> anyhow::Result<AppConfig> {
        build_app_config(config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_defaults_apply() {
        let config = from_toml(
            r#"
            [api]
            base_url = "http://localhost:3000/api"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.session.role, Role::Provincial);
        assert_eq!(config.notifications.default_ttl(), Duration::from_millis(3000));
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_explicit_settings() {
        let config = from_toml(
            r#"
            [api]
            base_url = "https://relief.example.org"
            timeout_ms = 2500

            [session]
            role = "district"

            [notifications]
            default_ttl_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.api.timeout(), Duration::from_millis(2500));
        assert_eq!(config.session.role, Role::District);
        assert_eq!(config.notifications.default_ttl_ms, 5000);
    }

    #[test]
    fn test_base_url_is_required() {
        assert!(from_toml("[session]\nrole = \"national\"").is_err());
        assert!(from_toml("[api]\nbase_url = \"  \"").is_err());
    }
}
