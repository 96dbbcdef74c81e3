use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub log: Log,
    pub store: Store,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    /// MySQL connection URL handed to the pool.
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "mysql"
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_settings_parse_with_known_backend() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        assert!(matches!(settings.store.backend.as_str(), "memory" | "mysql"));
        assert!(!settings.log.filter.is_empty());
        assert!(!settings.database.url.is_empty());
    }

    #[test]
    fn release_settings_parse_with_known_backend() {
        let settings = parse_settings(Some("settings/release.toml")).unwrap();
        assert!(matches!(settings.store.backend.as_str(), "memory" | "mysql"));
    }

    #[test]
    fn settings_without_store_backend_are_rejected() {
        let raw = r#"
[database]
url = "mysql://u:p@localhost/db"
max_connections = 1

[log]
filter = "info"
"#;
        let result: Result<Settings, _> = Config::builder()
            .add_source(File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize();
        assert!(result.is_err());
    }
}
