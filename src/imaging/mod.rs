/// Image manipulation module
///
/// This module handles:
/// - Applying a single resize / rotate / flip step to an image file
/// - Encoding results at a chosen quality
/// - Centre-cropping picked images to a fixed aspect ratio

pub mod manipulate;

pub use manipulate::{Manipulator, TransformError};
