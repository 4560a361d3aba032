use std::fs;
use std::path::PathBuf;

/// Answer to a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// Access to the user's photo library
pub trait PermissionService: Send + Sync {
    /// May the app browse the user's images?
    fn request_read(&self) -> PermissionStatus;
    /// May the app add images to the media library?
    fn request_write(&self) -> PermissionStatus;
}

/// Desktop permissions derived from filesystem access.
///
/// Read is granted when the browse directory can be listed. Write is granted
/// when the media library directory exists (or can be created) and is not
/// read-only.
#[derive(Debug, Clone)]
pub struct FsPermissions {
    browse_dir: Option<PathBuf>,
    library_dir: PathBuf,
}

impl FsPermissions {
    pub fn new(browse_dir: Option<PathBuf>, library_dir: PathBuf) -> Self {
        Self {
            browse_dir,
            library_dir,
        }
    }

    /// Browse the user's Pictures folder (or home if there is none)
    pub fn for_user(library_dir: PathBuf) -> Self {
        Self::new(dirs::picture_dir().or_else(dirs::home_dir), library_dir)
    }
}

impl PermissionService for FsPermissions {
    fn request_read(&self) -> PermissionStatus {
        let Some(dir) = &self.browse_dir else {
            log::warn!("No directory to browse images from");
            return PermissionStatus::Denied;
        };

        match fs::read_dir(dir) {
            Ok(_) => PermissionStatus::Granted,
            Err(e) => {
                log::warn!("Read access to {} denied: {}", dir.display(), e);
                PermissionStatus::Denied
            }
        }
    }

    fn request_write(&self) -> PermissionStatus {
        if let Err(e) = fs::create_dir_all(&self.library_dir) {
            log::warn!("Cannot create {}: {}", self.library_dir.display(), e);
            return PermissionStatus::Denied;
        }

        match fs::metadata(&self.library_dir) {
            Ok(meta) if !meta.permissions().readonly() => PermissionStatus::Granted,
            Ok(_) => {
                log::warn!("{} is read-only", self.library_dir.display());
                PermissionStatus::Denied
            }
            Err(e) => {
                log::warn!("Write access to {} denied: {}", self.library_dir.display(), e);
                PermissionStatus::Denied
            }
        }
    }
}
