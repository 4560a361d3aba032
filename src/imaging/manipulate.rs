use image::codecs::jpeg::JpegEncoder;
use image::{imageops::FilterType, DynamicImage};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::state::data::Location;
use crate::state::edit::{FlipAxis, Operation, SaveFormat, SaveOptions};

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to decode or encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported rotation: {0}° (must be a multiple of 90)")]
    UnsupportedRotation(u32),
    #[error("output path is not a valid location")]
    InvalidOutput,
}

/// Image manipulation service.
///
/// Each call decodes the source, applies exactly one [`Operation`] and writes
/// the result as a new, uniquely named file. Sources are never modified.
#[derive(Debug, Clone)]
pub struct Manipulator {
    output_dir: PathBuf,
}

impl Manipulator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Apply `operation` to the image at `source` and return the new image's location
    pub fn manipulate(
        &self,
        source: &Location,
        operation: Operation,
        options: SaveOptions,
    ) -> Result<Location, TransformError> {
        let img = image::open(source.as_path())?;
        let result = apply_operation(img, operation)?;

        let output = self.next_output_path(options.format)?;
        write_image(&result, &output, options)?;

        log::debug!(
            "🎨 {:?} {} -> {} ({}x{})",
            operation,
            source,
            output.display(),
            result.width(),
            result.height()
        );
        Location::from_path(&output).ok_or(TransformError::InvalidOutput)
    }

    /// Fresh file path inside the output directory
    pub fn next_output_path(&self, format: SaveFormat) -> Result<PathBuf, TransformError> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(self
            .output_dir
            .join(format!("{}.{}", Uuid::new_v4(), format.extension())))
    }

    /// Delete files in the output directory that are not in `keep`.
    ///
    /// Intermediate results of abandoned or reset edits are never referenced
    /// again, so this runs at startup with every location the record store
    /// still points at. Returns the number of files removed.
    pub fn remove_unreferenced(&self, keep: &HashSet<PathBuf>) -> Result<usize, TransformError> {
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || keep.contains(&path) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("⚠️  Could not remove {}: {}", path.display(), e),
            }
        }

        log::debug!("🧹 Removed {} unreferenced files from {}", removed, self.output_dir.display());
        Ok(removed)
    }
}

/// Run [`Manipulator::manipulate`] on the blocking pool
pub async fn manipulate_async(
    manipulator: Arc<Manipulator>,
    source: Location,
    operation: Operation,
    options: SaveOptions,
) -> Result<Location, String> {
    // Spawn blocking because decode + encode is CPU-intensive
    tokio::task::spawn_blocking(move || {
        manipulator
            .manipulate(&source, operation, options)
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}

/// Apply one operation to an in-memory image
pub fn apply_operation(img: DynamicImage, operation: Operation) -> Result<DynamicImage, TransformError> {
    let result = match operation {
        Operation::Resize { width, height } => img.resize_exact(width, height, FilterType::Lanczos3),
        Operation::Rotate { degrees } => match degrees % 360 {
            0 => img,
            90 => img.rotate90(),
            180 => img.rotate180(),
            270 => img.rotate270(),
            _ => return Err(TransformError::UnsupportedRotation(degrees)),
        },
        Operation::Flip(FlipAxis::Horizontal) => img.fliph(),
    };
    Ok(result)
}

/// Encode `img` to `path` with the given options
pub fn write_image(img: &DynamicImage, path: &Path, options: SaveOptions) -> Result<(), TransformError> {
    let mut writer = BufWriter::new(File::create(path)?);

    match options.format {
        SaveFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, jpeg_quality(options.compress));
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        }
    }

    Ok(())
}

/// Map a 0.0..=1.0 compression setting onto JPEG quality 1..=100
fn jpeg_quality(compress: f32) -> u8 {
    (compress.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

/// Largest centred rectangle of the given aspect ratio that fits in `width` x `height`.
/// Returns `(x, y, crop_width, crop_height)`.
pub fn centered_crop(width: u32, height: u32, aspect: (u32, u32)) -> (u32, u32, u32, u32) {
    let (aw, ah) = aspect;
    if aw == 0 || ah == 0 || width == 0 || height == 0 {
        return (0, 0, width, height);
    }

    // Compare width/height against aw/ah without floating point
    let (crop_w, crop_h) = if (width as u64) * (ah as u64) > (height as u64) * (aw as u64) {
        // Too wide: keep full height
        (((height as u64) * (aw as u64) / (ah as u64)) as u32, height)
    } else {
        (width, ((width as u64) * (ah as u64) / (aw as u64)) as u32)
    };

    let crop_w = crop_w.max(1);
    let crop_h = crop_h.max(1);
    ((width - crop_w) / 2, (height - crop_h) / 2, crop_w, crop_h)
}

/// Centre-crop an image to `aspect`
pub fn crop_to_aspect(img: &DynamicImage, aspect: (u32, u32)) -> DynamicImage {
    let (x, y, w, h) = centered_crop(img.width(), img.height(), aspect);
    img.crop_imm(x, y, w, h)
}
