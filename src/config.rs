use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_CAPACITY: u32 = 20;
pub const DEFAULT_GATE_THRESHOLD_CM: f64 = 20.0;
pub const DEFAULT_STORE_PATH: &str = "data/lot_state.json";
pub const DEFAULT_BROKER_PORT: u16 = 1883;
pub const DEFAULT_ENTRY_TOPIC: &str = "parking/distance";
pub const DEFAULT_EXIT_TOPIC: &str = "parking/exitDistance";
pub const DEFAULT_CLIENT_ID: &str = "lotgate";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub lot: Option<LotSection>,
    #[serde(default)]
    pub store: Option<StoreSection>,
    pub feed: FeedSection,
    #[serde(default)]
    pub server: Option<ServerSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LotSection {
    /// Maximum number of vehicles the lot holds (default: 20)
    pub capacity: Option<u32>,
    /// Proximity threshold in centimetres below which a gate opens (default: 20)
    pub gate_threshold_cm: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSection {
    /// Path of the JSON file holding the persisted occupancy record
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSection {
    pub broker_host: String,
    /// Broker port (default: 1883)
    pub broker_port: Option<u16>,
    /// Topic carrying entry-lane distance readings (default: parking/distance)
    pub entry_topic: Option<String>,
    /// Topic carrying exit-lane distance readings (default: parking/exitDistance)
    pub exit_topic: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

impl Config {
    pub fn capacity(&self) -> u32 {
        self.lot
            .as_ref()
            .and_then(|s| s.capacity)
            .unwrap_or(DEFAULT_CAPACITY)
    }

    pub fn gate_threshold_cm(&self) -> f64 {
        self.lot
            .as_ref()
            .and_then(|s| s.gate_threshold_cm)
            .unwrap_or(DEFAULT_GATE_THRESHOLD_CM)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .as_ref()
            .and_then(|s| s.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }

    pub fn broker_host(&self) -> &str {
        &self.feed.broker_host
    }

    pub fn broker_port(&self) -> u16 {
        self.feed.broker_port.unwrap_or(DEFAULT_BROKER_PORT)
    }

    pub fn entry_topic(&self) -> &str {
        self.feed.entry_topic.as_deref().unwrap_or(DEFAULT_ENTRY_TOPIC)
    }

    pub fn exit_topic(&self) -> &str {
        self.feed.exit_topic.as_deref().unwrap_or(DEFAULT_EXIT_TOPIC)
    }

    pub fn client_id(&self) -> &str {
        self.feed.client_id.as_deref().unwrap_or(DEFAULT_CLIENT_ID)
    }

    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    const MINIMAL_CONFIG: &str = r#"
[app]
name = "lotgate"

[logging]
level = "info"

[feed]
broker_host = "broker.hivemq.com"
"#;

    fn write_temp_config(tag: &str, contents: &str) -> PathBuf {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path = temp_dir.join(format!("lotgate-config-{tag}-{unique}.toml"));
        fs::write(&path, contents).expect("write temp config");
        path
    }

    #[test]
    fn minimal_config_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp_config("minimal", MINIMAL_CONFIG);

        let config = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(config.capacity(), 20);
        assert_eq!(config.gate_threshold_cm(), 20.0);
        assert_eq!(config.store_path(), PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(config.broker_port(), 1883);
        assert_eq!(config.entry_topic(), "parking/distance");
        assert_eq!(config.exit_topic(), "parking/exitDistance");
        assert_eq!(config.client_id(), "lotgate");
        assert_eq!(config.server_port(), DEFAULT_SERVER_PORT);
        Ok(())
    }

    #[test]
    fn explicit_sections_override_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let contents = r#"
[app]
name = "lotgate"

[logging]
level = "debug"

[lot]
capacity = 50
gate_threshold_cm = 35.5

[store]
path = "/var/lib/lotgate/state.json"

[feed]
broker_host = "localhost"
broker_port = 1884
entry_topic = "lot/in"
exit_topic = "lot/out"
client_id = "lotgate-test"

[server]
port = 9090
"#;
        let path = write_temp_config("explicit", contents);

        let config = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(config.capacity(), 50);
        assert_eq!(config.gate_threshold_cm(), 35.5);
        assert_eq!(config.store_path(), PathBuf::from("/var/lib/lotgate/state.json"));
        assert_eq!(config.broker_host(), "localhost");
        assert_eq!(config.broker_port(), 1884);
        assert_eq!(config.entry_topic(), "lot/in");
        assert_eq!(config.exit_topic(), "lot/out");
        assert_eq!(config.client_id(), "lotgate-test");
        assert_eq!(config.server_port(), 9090);
        Ok(())
    }

    #[test]
    fn missing_config_file_returns_read_error() {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path = temp_dir.join(format!("lotgate-config-missing-{unique}.toml"));

        let result = load_from_path(&path);

        assert!(matches!(result, Err(ConfigError::Read(_))));
    }

    #[test]
    fn invalid_toml_returns_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp_config("invalid", "not = [valid");

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        Ok(())
    }

    #[test]
    fn missing_feed_section_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let contents = r#"
[app]
name = "lotgate"

[logging]
level = "info"
"#;
        let path = write_temp_config("no-feed", contents);

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        Ok(())
    }
}
