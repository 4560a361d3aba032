/// User interface module
///
/// Two screens share one window:
/// - `gallery.rs` - pick an image, browse and delete saved edits
/// - `editor.rs` - apply filters, preview, reset and save
///
/// Screens ask for navigation with a typed [`Route`] instead of passing
/// raw strings around. User-facing notices go through `alert.rs`.

pub mod alert;
pub mod editor;
pub mod gallery;

use crate::state::data::Location;

/// Where the app should go next
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// The list of saved edits (always reloaded on arrival)
    Gallery,
    /// The editor, opened on `image` if there is one
    Editor { image: Option<Location> },
}
