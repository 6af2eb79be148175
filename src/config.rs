use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".gatorconfig.json";

#[derive(Debug)]
pub enum ConfigError {
    NoHome,
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Write { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoHome => write!(f, "cannot locate config: neither GATOR_CONFIG nor HOME is set"),
            ConfigError::Read { path, source } => write!(f, "reading config {}: {source}", path.display()),
            ConfigError::Parse { path, source } => write!(f, "parsing config {}: {source}", path.display()),
            ConfigError::Write { path, source } => write!(f, "writing config {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NoHome => None,
            ConfigError::Read { source, .. } | ConfigError::Write { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Contents of `~/.gatorconfig.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_url: Option<String>,
    #[serde(rename = "current_user_name", default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
    #[serde(skip)]
    path: PathBuf,
}

impl Config {
    /// `$GATOR_CONFIG` if set, else `$HOME/.gatorconfig.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Some(p) = std::env::var_os("GATOR_CONFIG") {
            return Ok(PathBuf::from(p));
        }
        let home = std::env::var_os("HOME").ok_or(ConfigError::NoHome)?;
        Ok(Path::new(&home).join(CONFIG_FILE_NAME))
    }

    pub fn read() -> Result<Self, ConfigError> {
        Self::read_from(Self::default_path()?)
    }

    pub fn read_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let bytes = std::fs::read(&path).map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        let mut cfg: Config = serde_json::from_slice(&bytes)
            .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        cfg.path = path;
        Ok(cfg)
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Current user name, treating an empty string as logged out.
    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref().filter(|n| !n.is_empty())
    }

    pub fn set_user(&mut self, name: &str) -> Result<(), ConfigError> {
        self.current_user = Some(name.to_string());
        self.write()
    }

    fn write(&self) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write { path: self.path.clone(), source };
        let json = serde_json::to_vec_pretty(self).map_err(|e| write_err(io::Error::other(e)))?;
        std::fs::write(&self.path, json).map_err(write_err)
    }
}

#[cfg(test)]
impl Config {
    pub(crate) fn for_tests(current_user: Option<&str>) -> Self {
        Config { db_url: None, current_user: current_user.map(str::to_string), path: PathBuf::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_updates_current_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"db_url":"postgres://localhost/gator","current_user_name":""}"#).unwrap();

        let mut cfg = Config::read_from(&path).unwrap();
        assert_eq!(cfg.db_url.as_deref(), Some("postgres://localhost/gator"));
        assert_eq!(cfg.current_user(), None);

        cfg.set_user("kahya").unwrap();
        let reread = Config::read_from(&path).unwrap();
        assert_eq!(reread.current_user(), Some("kahya"));
        assert_eq!(reread.db_url, cfg.db_url);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::read_from(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::read_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("parsing config"));
    }
}
