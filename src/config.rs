use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

const APP_DIR: &str = "book-catalog";
const MIN_JWT_SECRET_BYTES: usize = 32;
/// Upper bound for every configured lifetime: ten years.
pub const MAX_LIFETIME_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

pub const ENV_DATABASE_URL: &str = "BOOK_CATALOG_DATABASE_URL";
pub const ENV_JWT_SECRET: &str = "BOOK_CATALOG_JWT_SECRET";
pub const ENV_PORT: &str = "BOOK_CATALOG_PORT";
pub const ENV_MAIL_DOMAIN: &str = "BOOK_CATALOG_MAIL_DOMAIN";
pub const ENV_LOG_LEVEL: &str = "BOOK_CATALOG_LOG_LEVEL";
pub const ENV_MAIL_TRANSPORT: &str = "BOOK_CATALOG_MAIL_TRANSPORT";
pub const ENV_SMTP_HOST: &str = "BOOK_CATALOG_SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "BOOK_CATALOG_SMTP_PORT";
pub const ENV_SMTP_USERNAME: &str = "BOOK_CATALOG_SMTP_USERNAME";
pub const ENV_SMTP_PASSWORD: &str = "BOOK_CATALOG_SMTP_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub mail: MailConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// `SQLite` connection URL, e.g. `sqlite:data/book-catalog.db`.
    pub database_path: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub log_json: bool,

    /// Tokio worker threads. 0 uses one per core.
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/book-catalog.db".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            worker_threads: 0,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    /// `*` allows any origin.
    pub cors_allowed_origins: Vec<String>,

    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC key for access tokens. At least 32 bytes.
    pub jwt_secret: String,

    pub token_duration_seconds: u64,

    pub activation_otp_ttl_seconds: u64,

    pub reset_otp_ttl_seconds: u64,

    /// How often expired one-time codes are purged from memory.
    pub otp_sweep_interval_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_duration_seconds: 60 * 60,
            activation_otp_ttl_seconds: 48 * 60 * 60,
            reset_otp_ttl_seconds: 60 * 60,
            otp_sweep_interval_seconds: 5 * 60,
        }
    }
}

pub const MAIL_TRANSPORT_LOG: &str = "log";
pub const MAIL_TRANSPORT_SMTP: &str = "smtp";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Public base URL used to build the links in outgoing mail.
    pub domain: String,

    pub from: String,

    /// `log` writes messages to the log, `smtp` relays them.
    pub transport: String,

    pub smtp_host: String,

    pub smtp_port: u16,

    pub smtp_username: String,

    pub smtp_password: String,

    /// Upgrade the connection with STARTTLS. Disable only for local relays.
    pub smtp_starttls: bool,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            domain: "http://localhost:8080".to_string(),
            from: "no-reply@book-catalog.local".to_string(),
            transport: MAIL_TRANSPORT_LOG.to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_starttls: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = HashMap::new();
        labels.insert("app".to_string(), APP_DIR.to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    /// Reads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads an explicit config file, then applies environment overrides.
    pub fn load_with_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_from_path(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    /// Applies `BOOK_CATALOG_*` overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.general.database_path = url;
        }
        if let Some(secret) = lookup(ENV_JWT_SECRET) {
            self.auth.jwt_secret = secret;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .parse()
                .with_context(|| format!("{ENV_PORT} is not a valid port: {port}"))?;
        }
        if let Some(domain) = lookup(ENV_MAIL_DOMAIN) {
            self.mail.domain = domain;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.general.log_level = level;
        }
        if let Some(transport) = lookup(ENV_MAIL_TRANSPORT) {
            self.mail.transport = transport;
        }
        if let Some(host) = lookup(ENV_SMTP_HOST) {
            self.mail.smtp_host = host;
        }
        if let Some(port) = lookup(ENV_SMTP_PORT) {
            self.mail.smtp_port = port
                .parse()
                .with_context(|| format!("{ENV_SMTP_PORT} is not a valid port: {port}"))?;
        }
        if let Some(username) = lookup(ENV_SMTP_USERNAME) {
            self.mail.smtp_username = username;
        }
        if let Some(password) = lookup(ENV_SMTP_PASSWORD) {
            self.mail.smtp_password = password;
        }
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_DIR).join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_DIR}")).join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes a default config with a freshly generated JWT secret.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        let mut config = Self::default();
        config.auth.jwt_secret = generate_secret();
        config.save_to_path(path)?;
        info!("Created default config file: {}", path.display());
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("auth.jwt_secret must be set (or {ENV_JWT_SECRET})");
        }

        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            anyhow::bail!("auth.jwt_secret must be at least {MIN_JWT_SECRET_BYTES} bytes");
        }

        let lifetimes = [
            ("auth.token_duration_seconds", self.auth.token_duration_seconds),
            (
                "auth.activation_otp_ttl_seconds",
                self.auth.activation_otp_ttl_seconds,
            ),
            ("auth.reset_otp_ttl_seconds", self.auth.reset_otp_ttl_seconds),
            (
                "auth.otp_sweep_interval_seconds",
                self.auth.otp_sweep_interval_seconds,
            ),
        ];
        for (name, secs) in lifetimes {
            if !(1..=MAX_LIFETIME_SECONDS).contains(&secs) {
                anyhow::bail!("{name} must be between 1 and {MAX_LIFETIME_SECONDS}, got {secs}");
            }
        }

        if self.mail.domain.trim().is_empty() {
            anyhow::bail!("mail.domain cannot be empty");
        }

        match self.mail.transport.as_str() {
            MAIL_TRANSPORT_LOG => {}
            MAIL_TRANSPORT_SMTP => {
                if self.mail.smtp_host.trim().is_empty() {
                    anyhow::bail!("mail.smtp_host must be set for the smtp transport");
                }
                if self.mail.from.trim().is_empty() {
                    anyhow::bail!("mail.from must be set for the smtp transport");
                }
            }
            other => anyhow::bail!("Unsupported mail transport: {other}"),
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("general.min_db_connections cannot exceed max_db_connections");
        }

        Ok(())
    }

    /// Copy safe to print: the JWT secret and SMTP password are masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.auth.jwt_secret.is_empty() {
            copy.auth.jwt_secret = "<redacted>".to_string();
        }
        if !copy.mail.smtp_password.is_empty() {
            copy.mail.smtp_password = "<redacted>".to_string();
        }
        copy
    }
}

fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_duration_seconds, 3600);
        assert_eq!(config.auth.activation_otp_ttl_seconds, 172_800);
        assert_eq!(config.auth.reset_otp_ttl_seconds, 3600);
        assert_eq!(config.general.database_path, "sqlite:data/book-catalog.db");
    }

    #[test]
    fn test_config_serialization() {
        let config = valid();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[auth]"));
        assert!(toml_str.contains("[mail]"));
        assert!(toml_str.contains("token_duration_seconds"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [server]
            port = 9090

            [auth]
            jwt_secret = "0123456789abcdef0123456789abcdef"
            token_duration_seconds = 600
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.token_duration_seconds, 600);
        assert_eq!(config.auth.reset_otp_ttl_seconds, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_weak_settings() {
        assert!(Config::default().validate().is_err());

        let mut config = valid();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.auth.token_duration_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.auth.reset_otp_ttl_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.mail.domain = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.general.min_db_connections = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_lifetimes() {
        let mut config = valid();
        config.auth.activation_otp_ttl_seconds = MAX_LIFETIME_SECONDS;
        assert!(config.validate().is_ok());

        config.auth.activation_otp_ttl_seconds = u64::MAX;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("auth.activation_otp_ttl_seconds"));

        let mut config = valid();
        config.auth.token_duration_seconds = MAX_LIFETIME_SECONDS + 1;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.auth.otp_sweep_interval_seconds = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_smtp_transport() {
        let mut config = valid();
        config.mail.transport = MAIL_TRANSPORT_SMTP.to_string();
        assert!(config.validate().is_err());

        config.mail.smtp_host = "smtp.example.com".to_string();
        assert!(config.validate().is_ok());

        config.mail.transport = "carrier-pigeon".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_smtp_env_overrides_and_redaction() {
        let mut config = valid();
        let env: HashMap<&str, &str> = [
            (ENV_MAIL_TRANSPORT, "smtp"),
            (ENV_SMTP_HOST, "mail.example.com"),
            (ENV_SMTP_PORT, "2525"),
            (ENV_SMTP_USERNAME, "mailer"),
            (ENV_SMTP_PASSWORD, "hunter22"),
        ]
        .into_iter()
        .collect();

        config
            .apply_overrides(|key| env.get(key).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.mail.transport, MAIL_TRANSPORT_SMTP);
        assert_eq!(config.mail.smtp_host, "mail.example.com");
        assert_eq!(config.mail.smtp_port, 2525);
        assert_eq!(config.mail.smtp_username, "mailer");
        assert_eq!(config.redacted().mail.smtp_password, "<redacted>");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        let env: HashMap<&str, &str> = [
            (ENV_DATABASE_URL, "sqlite::memory:"),
            (ENV_PORT, "9999"),
            (ENV_MAIL_DOMAIN, "https://books.example.com"),
        ]
        .into_iter()
        .collect();

        config
            .apply_overrides(|key| env.get(key).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.general.database_path, "sqlite::memory:");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.mail.domain, "https://books.example.com");

        let err = config.apply_overrides(|key| (key == ENV_PORT).then(|| "http".to_string()));
        assert!(err.is_err());
    }

    #[test]
    fn test_create_default_writes_usable_config() {
        let path = std::env::temp_dir().join(format!("book-catalog-{}.toml", uuid::Uuid::new_v4()));

        assert!(Config::create_default_if_missing(&path).unwrap());
        assert!(!Config::create_default_if_missing(&path).unwrap());

        let loaded = Config::load_from_path(&path).unwrap();
        assert!(loaded.validate().is_ok());
        assert_eq!(loaded.redacted().auth.jwt_secret, "<redacted>");

        std::fs::remove_file(&path).unwrap();
    }
}
