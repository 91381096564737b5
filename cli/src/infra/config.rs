//! Infrastructure implementations of the `ConfigStore` and `DescriptorStore` ports.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{ConfigStore, DescriptorStore, LocalFs};
use crate::domain::config::parse_config;
use crate::domain::deployment::DESCRIPTOR_FILE;
use crate::domain::error::ConfigError;
use crate::domain::{CognitoTestConfig, RuntimeDescriptor};

/// Config file used when neither `--config` nor `AGENTCORE_CONFIG` is given.
pub const DEFAULT_CONFIG_FILE: &str = "cognito_config.json";

/// `--config` (which clap also fills from `AGENTCORE_CONFIG`), else
/// `./cognito_config.json`.
#[must_use]
pub fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Production `ConfigStore` over a JSON file.
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<CognitoTestConfig> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    path: self.path.display().to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read {}", self.path.display()));
            }
        };
        Ok(parse_config(&self.path.display().to_string(), &content)?)
    }

    fn save(&self, config: &CognitoTestConfig) -> Result<()> {
        let mut content = serde_json::to_string_pretty(config).context("cannot serialize config")?;
        content.push('\n');
        write_atomic(&self.path, content.as_bytes())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

/// Production `DescriptorStore` over `.agentcore.yaml`.
pub struct YamlDescriptorStore {
    path: PathBuf,
}

impl YamlDescriptorStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Descriptor in the current directory.
    #[must_use]
    pub fn in_current_dir() -> Self {
        Self::new(PathBuf::from(DESCRIPTOR_FILE))
    }
}

impl DescriptorStore for YamlDescriptorStore {
    fn load(&self) -> Result<RuntimeDescriptor> {
        if !self.path.exists() {
            return Ok(RuntimeDescriptor::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }

    fn save(&self, descriptor: &RuntimeDescriptor) -> Result<()> {
        let content = serde_yaml::to_string(descriptor).context("cannot serialize descriptor")?;
        write_atomic(&self.path, content.as_bytes())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

/// Filesystem access for the configurator.
pub struct OsFs;

impl LocalFs for OsFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))
    }
}

/// Write to a temp file in the same directory, then rename over `path`.
///
/// Readers see either the old or the new content, never a partial file.
/// The file ends up mode 0600 on unix since it may hold client secrets.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)
        .with_context(|| format!("cannot create temp file in {}", dir.display()))?;
    tmp.write_all(content)
        .with_context(|| format!("cannot write {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("cannot sync {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("cannot set permissions on {}", path.display()))?;
    }

    tmp.persist(path)
        .with_context(|| format!("cannot replace {}", path.display()))?;
    Ok(())
}
