/// Application configuration
///
/// Settings are read from `<config dir>/photo-editor/config.json`.
/// Every field is optional; a missing file means "use the defaults".
/// Paths default to the platform's standard directories:
/// - database: `<data dir>/photo-editor/images.db`
/// - working images: `<cache dir>/photo-editor/manipulated`
/// - media library: `<pictures dir>/photo-editor`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::platform::picker::PickerConfig;

const APP_DIR: &str = "photo-editor";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not determine the user {0} directory")]
    NoDirectory(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Override for the record database file
    pub database_path: Option<PathBuf>,
    /// Override for where saved images are copied
    pub media_library_dir: Option<PathBuf>,
    /// Override for where intermediate edits are written
    pub work_dir: Option<PathBuf>,
    /// Aspect ratio the picker crops to, as `[width, height]`
    pub picker_aspect: [u32; 2],
    /// Crop picked images to `picker_aspect`
    pub allow_crop: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            media_library_dir: None,
            work_dir: None,
            picker_aspect: [4, 3],
            allow_crop: true,
        }
    }
}

impl AppConfig {
    /// Load the user's config file, falling back to defaults.
    /// A broken file is reported and ignored rather than stopping the app.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(Some(config)) => {
                log::info!("⚙️  Loaded config from {}", path.display());
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("⚠️  Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Read a config file. `Ok(None)` if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Some(Self::from_json(&contents)?))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Where the config file lives
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Get the path where the database should be stored
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::NoDirectory("data"))?;
        path.push(APP_DIR);
        path.push("images.db");
        Ok(path)
    }

    /// Directory for intermediate filter results and cropped picks
    pub fn work_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.work_dir {
            return Ok(path.clone());
        }
        let mut path = dirs::cache_dir()
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::NoDirectory("cache"))?;
        path.push(APP_DIR);
        path.push("manipulated");
        Ok(path)
    }

    /// Directory saved images are copied into
    pub fn media_library_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.media_library_dir {
            return Ok(path.clone());
        }
        let mut path = dirs::picture_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
            .ok_or(ConfigError::NoDirectory("pictures"))?;
        path.push(APP_DIR);
        Ok(path)
    }

    pub fn picker_config(&self) -> PickerConfig {
        let [width, height] = self.picker_aspect;
        PickerConfig {
            aspect: (width, height),
            allow_crop: self.allow_crop,
            ..PickerConfig::default()
        }
    }
}
