use chrono::Local;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::state::data::Location;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("source image not found: {0}")]
    MissingSource(Location),
    #[error("could not write to the media library: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset path is not a valid location")]
    InvalidAsset,
}

/// An image that now lives in the media library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub location: Location,
}

/// The user's photo library
pub trait MediaLibrary: Send + Sync {
    /// Add a copy of `image` as a new asset
    fn save_asset(&self, image: &Location) -> Result<Asset, MediaError>;
}

/// Media library backed by a plain directory
#[derive(Debug, Clone)]
pub struct DirectoryMediaLibrary {
    root: PathBuf,
}

impl DirectoryMediaLibrary {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// `IMG_<local time>_<short id>.<ext>`, keeping the source extension
    fn asset_name(image: &Location) -> String {
        let extension = image
            .as_path()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "jpg".to_string());
        let id = Uuid::new_v4().simple().to_string();

        format!(
            "IMG_{}_{}.{}",
            Local::now().format("%Y%m%d_%H%M%S"),
            &id[..8],
            extension
        )
    }
}

impl MediaLibrary for DirectoryMediaLibrary {
    fn save_asset(&self, image: &Location) -> Result<Asset, MediaError> {
        if !image.as_path().is_file() {
            return Err(MediaError::MissingSource(image.clone()));
        }

        fs::create_dir_all(&self.root)?;
        let target = self.root.join(Self::asset_name(image));
        fs::copy(image.as_path(), &target)?;

        let location = Location::from_path(&target).ok_or(MediaError::InvalidAsset)?;
        Ok(Asset { location })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_asset_copies_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("edit.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();
        let library = DirectoryMediaLibrary::new(dir.path().join("Pictures"));

        let asset = library
            .save_asset(&Location::from_path(&source).unwrap())
            .unwrap();

        assert!(asset.location.as_path().starts_with(dir.path().join("Pictures")));
        assert!(asset.location.as_str().ends_with(".jpg"));
        assert_eq!(fs::read(asset.location.as_path()).unwrap(), b"jpeg bytes");
        // The working copy stays where it was
        assert!(source.exists());
    }

    #[test]
    fn test_each_save_is_a_new_asset() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("edit.png");
        fs::write(&source, b"png bytes").unwrap();
        let library = DirectoryMediaLibrary::new(dir.path().join("Pictures"));
        let image = Location::from_path(&source).unwrap();

        let first = library.save_asset(&image).unwrap();
        let second = library.save_asset(&image).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let library = DirectoryMediaLibrary::new(dir.path().join("Pictures"));
        let missing = Location::from_path(&dir.path().join("gone.jpg")).unwrap();

        let err = library.save_asset(&missing).unwrap_err();
        assert!(matches!(err, MediaError::MissingSource(_)));
        assert!(!dir.path().join("Pictures").exists());
    }
}
