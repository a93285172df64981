use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_PATH: &str = "bootcampPortalDatabase.db";
const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost", "http://localhost:5173"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORTAL_PORT must be a port number, got '{0}'")]
    InvalidPort(String),

    #[error("PORTAL_HOST must be an IP address, got '{0}'")]
    InvalidHost(String),

    #[error("PORTAL_CORS_ORIGINS must list at least one origin")]
    NoOrigins,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    /// Seed document on disk; the bundled one is used when unset.
    pub seed_path: Option<PathBuf>,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests need not touch the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("PORTAL_HOST").unwrap_or_else(|| DEFAULT_HOST.into());
        let ip = host
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(host.clone()))?;
        let port = match lookup("PORTAL_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let addr = SocketAddr::new(ip, port);

        let db_path = lookup("PORTAL_DB_PATH")
            .unwrap_or_else(|| DEFAULT_DB_PATH.into())
            .into();
        let seed_path = lookup("PORTAL_SEED_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let cors_origins = match lookup("PORTAL_CORS_ORIGINS") {
            Some(raw) => {
                let origins: Vec<String> = raw
                    .split(',')
                    .map(|o| o.trim().trim_end_matches('/').to_string())
                    .filter(|o| !o.is_empty())
                    .collect();
                if origins.is_empty() {
                    return Err(ConfigError::NoOrigins);
                }
                origins
            }
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            addr,
            db_path,
            seed_path,
            cors_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_local_development() {
        let cfg = config_from(&[]).unwrap();

        assert_eq!(cfg.addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(cfg.db_path, PathBuf::from("bootcampPortalDatabase.db"));
        assert!(cfg.seed_path.is_none());
        assert_eq!(cfg.cors_origins, vec!["http://localhost", "http://localhost:5173"]);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config_from(&[
            ("PORTAL_HOST", "127.0.0.1"),
            ("PORTAL_PORT", "9090"),
            ("PORTAL_DB_PATH", "/tmp/portal.db"),
            ("PORTAL_SEED_PATH", "seed.json"),
            ("PORTAL_CORS_ORIGINS", " https://portal.example/ , http://localhost:3000"),
        ])
        .unwrap();

        assert_eq!(cfg.addr, "127.0.0.1:9090".parse().unwrap());
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/portal.db"));
        assert_eq!(cfg.seed_path, Some(PathBuf::from("seed.json")));
        assert_eq!(
            cfg.cors_origins,
            vec!["https://portal.example", "http://localhost:3000"]
        );
    }

    #[test]
    fn ipv6_host_is_accepted() {
        let cfg = config_from(&[("PORTAL_HOST", "::"), ("PORTAL_PORT", "8080")]).unwrap();
        assert_eq!(cfg.addr, "[::]:8080".parse().unwrap());

        let cfg = config_from(&[("PORTAL_HOST", "::1")]).unwrap();
        assert_eq!(cfg.addr, "[::1]:8000".parse().unwrap());
    }

    #[test]
    fn host_name_is_an_error() {
        assert!(matches!(
            config_from(&[("PORTAL_HOST", "localhost")]),
            Err(ConfigError::InvalidHost(h)) if h == "localhost"
        ));
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(matches!(
            config_from(&[("PORTAL_PORT", "eighty")]),
            Err(ConfigError::InvalidPort(p)) if p == "eighty"
        ));
    }

    #[test]
    fn blank_origin_list_is_an_error() {
        assert!(matches!(
            config_from(&[("PORTAL_CORS_ORIGINS", " , ")]),
            Err(ConfigError::NoOrigins)
        ));
    }
}
