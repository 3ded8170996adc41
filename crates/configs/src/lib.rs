use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(anyhow!("unknown store backend '{other}' (expected memory|file)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SchemaConfig {
    /// Location schema override; the embedded schema is used when unset.
    #[serde(default)]
    pub path: Option<String>,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> String { "data/locations.json".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `CONFIG_PATH` (or `config.toml`), falling back to defaults when the
    /// file is missing, then apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.apply_env()?;
        self.server.normalize()?;
        self.store.apply_env()?;
        self.store.validate()?;
        self.schema.apply_env();
        Ok(())
    }
}

impl ServerConfig {
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.port = port
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT must be a port number, got '{port}'"))?;
        }
        Ok(())
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(backend) = std::env::var("LOCATIONS_STORE_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Ok(path) = std::env::var("LOCATIONS_STORE_PATH") {
            self.path = path;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::File && self.path.trim().is_empty() {
            return Err(anyhow!("store.path is empty; set it in config.toml or LOCATIONS_STORE_PATH"));
        }
        Ok(())
    }
}

impl SchemaConfig {
    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("LOCATION_SCHEMA_PATH") {
            if !path.trim().is_empty() {
                self.path = Some(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() -> Result<()> {
        let cfg = parse("")?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.store.backend, StoreBackend::File);
        assert_eq!(cfg.store.path, "data/locations.json");
        assert!(cfg.schema.path.is_none());
        Ok(())
    }

    #[test]
    fn parses_all_sections() -> Result<()> {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            worker_threads = 0

            [store]
            backend = "memory"

            [schema]
            path = "schemas/custom.json"
            "#,
        )?;
        assert_eq!(cfg.server.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.schema.path.as_deref(), Some("schemas/custom.json"));

        let mut server = cfg.server.clone();
        server.normalize()?;
        assert_eq!(server.worker_threads, Some(4));
        Ok(())
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!("cosmos".parse::<StoreBackend>().is_err());
        assert_eq!(" Memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
    }

    #[test]
    fn rejects_port_zero_and_empty_file_path() {
        let mut server = ServerConfig { port: 0, ..ServerConfig::default() };
        assert!(server.normalize().is_err());

        let store = StoreConfig { path: "  ".into(), ..StoreConfig::default() };
        assert!(store.validate().is_err());
        let memory = StoreConfig { backend: StoreBackend::Memory, path: String::new() };
        assert!(memory.validate().is_ok());
    }
}
