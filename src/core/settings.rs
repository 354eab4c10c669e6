use serde::Deserialize;
use std::{
    fs,
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use crate::core::cache::{ReloadPolicy, DEFAULT_TTL_SECS};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings file {} could not be read: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("settings file {} is invalid: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("base URL {0:?} must start with http:// or https://")]
    BaseUrl(String),
}

/// Site settings, read from an optional JSON file and overridden from the CLI.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub ip_addr: IpAddr,
    pub port: u16,
    /// Project catalog file.
    pub content_file: PathBuf,
    /// Directory detail references are resolved against. Defaults to the
    /// directory holding `content_file`.
    pub content_root: Option<PathBuf>,
    pub cache_ttl_secs: u64,
    pub reload_policy: ReloadPolicy,
    /// Public URL of the site, used for canonical links and the sitemap.
    pub base_url: String,
}

/// Values given on the command line (or via env). `None` keeps the file value.
#[derive(Debug, Default)]
pub struct SettingsOverrides {
    pub ip_addr: Option<IpAddr>,
    pub port: Option<u16>,
    pub content_file: Option<PathBuf>,
    pub content_root: Option<PathBuf>,
    pub cache_ttl_secs: Option<u64>,
    pub reload_policy: Option<ReloadPolicy>,
    pub base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            ip_addr: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 4010,
            content_file: PathBuf::from("data/projects.json"),
            content_root: None,
            cache_ttl_secs: DEFAULT_TTL_SECS,
            reload_policy: ReloadPolicy::Propagate,
            base_url: "http://localhost:4010".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then the settings file (if any), then overrides.
    pub fn load(path: Option<&Path>, overrides: SettingsOverrides) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Settings::default(),
        };
        settings.apply(overrides);
        settings.base_url = normalize_base_url(&settings.base_url)?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let buffer = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&buffer).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply(&mut self, overrides: SettingsOverrides) {
        if let Some(ip_addr) = overrides.ip_addr {
            self.ip_addr = ip_addr;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(content_file) = overrides.content_file {
            self.content_file = content_file;
        }
        if let Some(content_root) = overrides.content_root {
            self.content_root = Some(content_root);
        }
        if let Some(ttl) = overrides.cache_ttl_secs {
            self.cache_ttl_secs = ttl;
        }
        if let Some(policy) = overrides.reload_policy {
            self.reload_policy = policy;
        }
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip_addr, self.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn content_root(&self) -> PathBuf {
        match &self.content_root {
            Some(root) => root.clone(),
            None => self
                .content_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, SettingsError> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(SettingsError::BaseUrl(url.to_string()));
    }
    Ok(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load(None, SettingsOverrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.content_root(), PathBuf::from("data"));
        assert_eq!(settings.addr().to_string(), "127.0.0.1:4010");
    }

    #[test]
    fn test_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"port": 8080, "base_url": "https://example.com/", "reload_policy": "serve_stale"}"#,
        )
        .unwrap();

        let overrides = SettingsOverrides {
            port: Some(9000),
            content_root: Some(PathBuf::from("content")),
            ..SettingsOverrides::default()
        };
        let settings = Settings::load(Some(&path), overrides).unwrap();

        assert_eq!(settings.port, 9000);
        assert_eq!(settings.base_url, "https://example.com");
        assert_eq!(settings.reload_policy, ReloadPolicy::ServeStale);
        assert_eq!(settings.content_root(), PathBuf::from("content"));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_unknown_setting_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"prot": 1}"#).unwrap();

        let err = Settings::load(Some(&path), SettingsOverrides::default()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_missing_settings_file() {
        let err = Settings::load(Some(Path::new("/nonexistent/settings.json")), SettingsOverrides::default())
            .unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn test_base_url_must_be_http() {
        let overrides = SettingsOverrides {
            base_url: Some("example.com".to_string()),
            ..SettingsOverrides::default()
        };
        let err = Settings::load(None, overrides).unwrap_err();
        assert!(matches!(err, SettingsError::BaseUrl(_)));
    }
}
