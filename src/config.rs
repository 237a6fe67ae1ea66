use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const APP_DIR: &str = "rs_webmail";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub session_backend: SessionBackend,
    pub endpoints: Endpoints,
}

/// One URL per remote operation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub auth: String,
    pub register: String,
    pub fetch: String,
    pub send: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    File,
    Keyring,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Config {
    fn template() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            session_backend: SessionBackend::File,
            endpoints: Endpoints {
                auth: "https://mail.example.com/api/auth".to_string(),
                register: "https://mail.example.com/api/register".to_string(),
                fetch: "https://mail.example.com/api/fetch".to_string(),
                send: "https://mail.example.com/api/send".to_string(),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(anyhow!("page_size must be at least 1"));
        }
        let e = &self.endpoints;
        for (name, value) in [
            ("auth", &e.auth),
            ("register", &e.register),
            ("fetch", &e.fetch),
            ("send", &e.send),
        ] {
            let url = Url::parse(value)
                .map_err(|err| anyhow!("endpoints.{name} is not a valid URL '{value}': {err}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow!("endpoints.{name} must be an http(s) URL: {value}"));
            }
        }
        Ok(())
    }
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow!("no config dir available"))?
        .join(APP_DIR))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Reads and validates the config at `path`, writing a template first if there is none.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tom = toml::to_string_pretty(&Config::template())?;
        fs::write(path, tom)?;
        return Err(anyhow!(
            "Created template config at {}; edit the endpoints and run again",
            path.display()
        ));
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config =
        toml::from_str(&s).map_err(|e| anyhow!("invalid config {}: {e}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_writes_a_loadable_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("template"));
        assert!(path.exists());

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg, Config::template());
    }

    #[test]
    fn optional_fields_take_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [endpoints]
            auth = "http://localhost/auth"
            register = "http://localhost/register"
            fetch = "http://localhost/fetch"
            send = "http://localhost/send"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.session_backend, SessionBackend::File);
        cfg.validate().unwrap();
    }

    #[test]
    fn keyring_backend_is_parsed() {
        let cfg: Config = toml::from_str(
            r#"
            session_backend = "keyring"
            [endpoints]
            auth = "http://localhost/auth"
            register = "http://localhost/register"
            fetch = "http://localhost/fetch"
            send = "http://localhost/send"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.session_backend, SessionBackend::Keyring);
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let mut cfg = Config::template();
        cfg.endpoints.send = "ftp://mail.example.com/send".into();
        assert!(cfg.validate().is_err());

        cfg.endpoints.send = "not a url".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut cfg = Config::template();
        cfg.page_size = 0;
        assert!(cfg.validate().is_err());
    }
}
