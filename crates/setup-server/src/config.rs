//! Server Configuration

use std::path::PathBuf;

/// Listener and static file settings, read from the environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            static_dir: lookup("STATIC_DIR").map_or_else(|| PathBuf::from("static"), PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_vars(|_| None);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.static_dir, PathBuf::from("static"));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_vars(|name| match name {
            "BIND_ADDR" => Some("127.0.0.1:8000".into()),
            "STATIC_DIR" => Some("/srv/card-setup".into()),
            _ => None,
        });
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.static_dir, PathBuf::from("/srv/card-setup"));
    }
}
