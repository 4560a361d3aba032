use rfd::FileDialog;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::imaging::manipulate::{crop_to_aspect, write_image, Manipulator};
use crate::imaging::TransformError;
use crate::state::data::Location;
use crate::state::edit::{SaveFormat, SaveOptions};

/// File extensions offered by the picker
pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff"];

#[derive(Debug, Error)]
pub enum PickerError {
    #[error("could not crop the selected image: {0}")]
    Crop(#[from] TransformError),
    #[error("selected path is not a valid location")]
    InvalidSelection,
}

/// Which kinds of media the picker may return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Images,
}

/// How the picker is presented
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerConfig {
    pub media: MediaKind,
    /// Crop aspect ratio `(width, height)`
    pub aspect: (u32, u32),
    /// Output quality for cropped picks, 0.0 to 1.0
    pub quality: f32,
    /// Crop the selection to `aspect` before handing it to the editor
    pub allow_crop: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            media: MediaKind::Images,
            aspect: (4, 3),
            quality: 1.0,
            allow_crop: true,
        }
    }
}

/// Lets the user choose an image
pub trait ImagePicker: Send + Sync {
    /// `Ok(None)` when the user cancels
    fn pick(&self) -> Result<Option<Location>, PickerError>;

    /// Turn a picked location into the image the editor opens.
    /// May decode and encode, so callers run it off the UI thread.
    fn prepare(&self, selection: &Location) -> Result<Location, PickerError> {
        Ok(selection.clone())
    }
}

/// Run [`ImagePicker::prepare`] on the blocking pool
pub async fn prepare_async(
    picker: Arc<dyn ImagePicker>,
    selection: Location,
) -> Result<Location, String> {
    tokio::task::spawn_blocking(move || picker.prepare(&selection).map_err(|e| e.to_string()))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

/// Native file dialog picker
#[derive(Debug, Clone)]
pub struct FileDialogPicker {
    config: PickerConfig,
    work_dir: PathBuf,
}

impl FileDialogPicker {
    /// Cropped picks are written into `work_dir`
    pub fn new(config: PickerConfig, work_dir: PathBuf) -> Self {
        Self { config, work_dir }
    }

    /// Turn a chosen file into the location the editor opens.
    /// With cropping enabled the image is centre-cropped into a new file.
    pub fn prepare_selection(&self, path: &Path) -> Result<Location, PickerError> {
        if !self.config.allow_crop {
            return Location::from_path(path).ok_or(PickerError::InvalidSelection);
        }

        let img = image::open(path).map_err(TransformError::from)?;
        let cropped = crop_to_aspect(&img, self.config.aspect);

        let options = SaveOptions {
            compress: self.config.quality,
            format: SaveFormat::Jpeg,
        };
        let output = Manipulator::new(self.work_dir.clone()).next_output_path(options.format)?;
        write_image(&cropped, &output, options)?;

        log::debug!(
            "✂️  Cropped {} to {}x{}: {}",
            path.display(),
            cropped.width(),
            cropped.height(),
            output.display()
        );
        Location::from_path(&output).ok_or(PickerError::InvalidSelection)
    }
}

impl ImagePicker for FileDialogPicker {
    fn pick(&self) -> Result<Option<Location>, PickerError> {
        let mut dialog = FileDialog::new().set_title("Pick an Image to Edit");

        dialog = match self.config.media {
            MediaKind::Images => dialog.add_filter("Images", &IMAGE_EXTENSIONS[..]),
        };
        if let Some(pictures) = dirs::picture_dir().filter(|dir| dir.is_dir()) {
            dialog = dialog.set_directory(pictures);
        }

        match dialog.pick_file() {
            Some(path) => Location::from_path(&path)
                .map(Some)
                .ok_or(PickerError::InvalidSelection),
            None => {
                log::debug!("Picker canceled");
                Ok(None)
            }
        }
    }

    fn prepare(&self, selection: &Location) -> Result<Location, PickerError> {
        self.prepare_selection(selection.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, RgbImage};

    fn write_image_file(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("pick.png");
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_selection_is_cropped_to_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_image_file(dir.path(), 160, 90);
        let picker = FileDialogPicker::new(PickerConfig::default(), dir.path().join("work"));

        let location = picker.prepare_selection(&source).unwrap();

        assert_ne!(location.as_path(), source.as_path());
        assert!(location.as_path().starts_with(dir.path().join("work")));
        assert_eq!(image::open(location.as_path()).unwrap().dimensions(), (120, 90));
    }

    #[test]
    fn test_selection_passes_through_without_crop() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_image_file(dir.path(), 160, 90);
        let config = PickerConfig {
            allow_crop: false,
            ..PickerConfig::default()
        };
        let picker = FileDialogPicker::new(config, dir.path().join("work"));

        let location = picker.prepare_selection(&source).unwrap();

        assert_eq!(location.as_path(), source.as_path());
    }

    #[tokio::test]
    async fn test_prepare_async_crops_off_the_ui_thread() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_image_file(dir.path(), 90, 160);
        let picker: Arc<dyn ImagePicker> = Arc::new(FileDialogPicker::new(
            PickerConfig::default(),
            dir.path().join("work"),
        ));

        let location = prepare_async(picker, Location::from_path(&source).unwrap())
            .await
            .unwrap();

        assert_eq!(image::open(location.as_path()).unwrap().dimensions(), (90, 67));
    }

    #[tokio::test]
    async fn test_prepare_async_reports_errors_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.jpg");
        std::fs::write(&bogus, b"not an image").unwrap();
        let picker: Arc<dyn ImagePicker> = Arc::new(FileDialogPicker::new(
            PickerConfig::default(),
            dir.path().join("work"),
        ));

        let result = prepare_async(picker, Location::from_path(&bogus).unwrap()).await;

        assert!(result.unwrap_err().contains("crop"));
    }

    #[test]
    fn test_unreadable_selection_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.jpg");
        std::fs::write(&bogus, b"not an image").unwrap();
        let picker = FileDialogPicker::new(PickerConfig::default(), dir.path().join("work"));

        assert!(matches!(
            picker.prepare_selection(&bogus),
            Err(PickerError::Crop(_))
        ));
    }
}
