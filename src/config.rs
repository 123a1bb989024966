use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CampusConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// JSON seed fixture loaded at startup
    pub seed: Option<String>,
}

impl CampusConfig {
    /// Config written by `campusdb init`
    pub fn with_defaults() -> Self {
        Self {
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
            seed: None,
        }
    }

    /// Resolve the listen address, preferring explicit overrides
    pub fn listen_addr(&self, host: Option<&str>, port: Option<u16>) -> anyhow::Result<SocketAddr> {
        let host = host.or(self.host.as_deref()).unwrap_or(DEFAULT_HOST);
        let port = port.or(self.port).unwrap_or(DEFAULT_PORT);
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address {}:{}: {}", host, port, e))?;
        Ok(addr)
    }

    /// Seed path, preferring an explicit override
    pub fn seed_path(&self, seed: Option<&Path>) -> Option<PathBuf> {
        seed.map(Path::to_path_buf)
            .or_else(|| self.seed.as_ref().map(PathBuf::from))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("campusdb.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CampusConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CampusConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &CampusConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
