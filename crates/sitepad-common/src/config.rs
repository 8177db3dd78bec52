use miette::Result;
use miette::miette;
use serde::{Deserialize, Serialize};

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the publishing host.
    pub server_url: String,
    /// Domain published sites are served under, as `https://{subdomain}.{site_domain}`.
    pub site_domain: String,
    /// Where the canonical site bundle lives. Either an `http(s)` URL or a local path.
    pub bundle_location: String,
    /// Directory backing the file slot store on native hosts. When `None`, the
    /// CLI keeps its slots in `.sitepad` under the working directory.
    pub storage_dir: Option<PathBuf>,
    /// Slot holding the most recent archive as a data URL.
    pub session_slot: String,
    /// Slot holding the last preview's address/handle pairs.
    pub site_map_slot: String,
    /// Seconds between authentication polls.
    pub poll_interval_secs: u64,
    /// Maximum number of authentication polls before giving up.
    pub max_polls: u32,
}

impl Config {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self> {
        loader
            .load()
            .await
            .map_err(|e| miette!("Failed to load configuration: {e}"))
    }

    /// Loads the configuration, falling back to defaults when the file is missing.
    pub async fn load_or_default(store: &FileStore) -> Result<Self> {
        if !store.path.exists() {
            tracing::debug!(path = %store.path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(store).await
    }

    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<()> {
        saver
            .save(self)
            .await
            .map_err(|e| miette!("Failed to save configuration: {e}"))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for Config {
    /// Creates a new default configuration.
    ///
    /// The default configuration publishes to `https://drifting.ink` and polls
    /// every 5 seconds for at most 15 minutes.
    fn default() -> Self {
        Self {
            server_url: "https://drifting.ink".to_owned(),
            site_domain: "drifting.ink".to_owned(),
            bundle_location: "/rawtastic-main.zip".to_owned(),
            storage_dir: default_storage_dir(),
            session_slot: "rawtastic-main".to_owned(),
            site_map_slot: "siteMap".to_owned(),
            poll_interval_secs: 5,
            max_polls: 180,
        }
    }
}

#[cfg(feature = "native")]
fn default_storage_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("sitepad").join("storage"))
}

#[cfg(not(feature = "native"))]
fn default_storage_dir() -> Option<PathBuf> {
    None
}

#[cfg(feature = "native")]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("./"))
        .join("sitepad")
        .join("config.toml")
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(
        &self,
    ) -> impl Future<
        Output = core::result::Result<Config, Box<dyn std::error::Error + Send + Sync + 'static>>,
    > + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(
        &self,
        config: &Config,
    ) -> impl Future<
        Output = core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>,
    > + Send;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// [`Config`] data will be serialized and deserialized using the file extension.
    /// Only `.json` and `.toml` files are supported.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Loader for FileStore {
    async fn load(
        &self,
    ) -> core::result::Result<Config, Box<dyn std::error::Error + Send + Sync + 'static>> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&std::fs::read_to_string(&self.path)?)?),
            Some("toml") => Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)?),
            _ => Err(miette!("Unsupported file format").into()),
        }
    }
}

impl Saver for FileStore {
    async fn save(
        &self,
        config: &Config,
    ) -> core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(std::fs::write(
                &self.path,
                serde_json::to_string_pretty(config)?,
            )?),
            Some("toml") => Ok(std::fs::write(&self.path, toml::to_string_pretty(config)?)?),
            _ => Err(miette!("Unsupported file format").into()),
        }
    }
}
