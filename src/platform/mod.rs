/// Platform services the screens depend on
///
/// Each service is a trait so the screens can be driven by fakes in tests.
/// The desktop implementations are:
/// - `FsPermissions` (permissions.rs) - read/write access checks on directories
/// - `FileDialogPicker` (picker.rs) - native file dialog + optional crop
/// - `DirectoryMediaLibrary` (media_library.rs) - copies into the Pictures folder

pub mod media_library;
pub mod permissions;
pub mod picker;

pub use media_library::{DirectoryMediaLibrary, MediaLibrary};
pub use permissions::{FsPermissions, PermissionService};
pub use picker::{FileDialogPicker, ImagePicker};

use std::sync::Arc;

/// The platform services handed to the screens
#[derive(Clone)]
pub struct Services {
    pub permissions: Arc<dyn PermissionService>,
    pub picker: Arc<dyn ImagePicker>,
    pub media: Arc<dyn MediaLibrary>,
}
