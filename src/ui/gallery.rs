use iced::widget::image::{Handle, Image};
use iced::widget::{button, column, container, scrollable, text, tooltip, Column, Row};
use iced::{Alignment, ContentFit, Element, Length};

use crate::platform::{ImagePicker, PermissionService};
use crate::state::data::{EditedImage, Location};
use crate::state::records::{RecordStore, StoreResult};

/// Thumbnails per grid row
pub const GRID_COLUMNS: usize = 3;

/// Thumbnail edge length in logical pixels
const THUMBNAIL_SIZE: f32 = 100.0;

#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Pick an Image to Edit"
    PickImage,
    /// The picked image is ready for the editor
    Prepared(Result<Location, String>),
    /// User clicked Delete under a thumbnail
    Delete(i64),
}

/// What happened when the user tried to pick an image
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    PermissionDenied,
    Canceled,
    Selected(Location),
    Failed(String),
}

/// The list of saved edits, as last loaded from the store
#[derive(Debug, Default)]
pub struct Gallery {
    records: Vec<EditedImage>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[EditedImage] {
        &self.records
    }

    /// Replace the list with the store's current contents (newest first)
    pub fn reload(&mut self, store: &RecordStore) -> StoreResult<()> {
        self.records = store.list_all()?;
        log::debug!("Loaded {} edited images", self.records.len());
        Ok(())
    }

    /// Delete a record, then reload. The list only changes once the store has
    /// confirmed the delete.
    pub fn delete_image(&mut self, store: &RecordStore, id: i64) -> StoreResult<()> {
        store.delete_by_id(id)?;
        log::info!("🗑️  Deleted edited image {}", id);
        self.reload(store)
    }

    /// Build the gallery screen
    pub fn view(&self) -> Element<'_, Message> {
        let mut grid = Column::new().spacing(10);
        for chunk in self.records.chunks(GRID_COLUMNS) {
            let row = chunk
                .iter()
                .fold(Row::new().spacing(10), |row, record| row.push(thumbnail(record)));
            grid = grid.push(row);
        }

        column![
            text("Image Editor").size(24),
            button(text("Pick an Image to Edit").size(18))
                .on_press(Message::PickImage)
                .padding(15)
                .width(Length::Fill),
            text("Edited Images:").size(18),
            scrollable(grid).height(Length::Fill),
        ]
        .spacing(20)
        .padding(20)
        .into()
    }
}

fn thumbnail(record: &EditedImage) -> Element<'_, Message> {
    let preview = Image::new(Handle::from_path(record.edited.as_path()))
        .width(THUMBNAIL_SIZE)
        .height(THUMBNAIL_SIZE)
        .content_fit(ContentFit::Cover);

    // Hover shows where the edit came from and when it was saved
    let details = container(text(format!(
        "{}\n{}",
        record.original,
        record.timestamp.format("%Y-%m-%d %H:%M")
    )))
    .padding(5)
    .style(container::rounded_box);

    column![
        tooltip(preview, details, tooltip::Position::Bottom),
        button(text("Delete"))
            .style(button::danger)
            .padding(5)
            .on_press(Message::Delete(record.id)),
    ]
    .spacing(5)
    .align_x(Alignment::Center)
    .into()
}

/// Ask for read permission, then open the picker.
/// A denied permission never reaches the picker. The selection still has to
/// go through [`ImagePicker::prepare`] before the editor opens it.
pub fn pick_image(permissions: &dyn PermissionService, picker: &dyn ImagePicker) -> PickOutcome {
    if !permissions.request_read().is_granted() {
        return PickOutcome::PermissionDenied;
    }

    match picker.pick() {
        Ok(Some(location)) => PickOutcome::Selected(location),
        Ok(None) => PickOutcome::Canceled,
        Err(e) => PickOutcome::Failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::permissions::PermissionStatus;
    use crate::platform::picker::PickerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPermissions(PermissionStatus);

    impl PermissionService for FixedPermissions {
        fn request_read(&self) -> PermissionStatus {
            self.0
        }
        fn request_write(&self) -> PermissionStatus {
            self.0
        }
    }

    struct FakePicker {
        choice: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakePicker {
        fn new(choice: Option<&'static str>) -> Self {
            Self {
                choice,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ImagePicker for FakePicker {
        fn pick(&self) -> Result<Option<Location>, PickerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.choice.and_then(Location::new))
        }
    }

    struct BrokenPicker;

    impl ImagePicker for BrokenPicker {
        fn pick(&self) -> Result<Option<Location>, PickerError> {
            Err(PickerError::InvalidSelection)
        }
    }

    fn loc(s: &str) -> Location {
        Location::new(s).unwrap()
    }

    fn store() -> RecordStore {
        let store = RecordStore::open_in_memory().unwrap();
        store.init().unwrap();
        store
    }

    #[test]
    fn test_denied_permission_skips_picker() {
        let picker = FakePicker::new(Some("photo.jpg"));
        let outcome = pick_image(&FixedPermissions(PermissionStatus::Denied), &picker);

        assert_eq!(outcome, PickOutcome::PermissionDenied);
        assert_eq!(picker.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pick_selected_and_canceled() {
        let granted = FixedPermissions(PermissionStatus::Granted);

        let outcome = pick_image(&granted, &FakePicker::new(Some("photo.jpg")));
        assert_eq!(outcome, PickOutcome::Selected(loc("photo.jpg")));

        let outcome = pick_image(&granted, &FakePicker::new(None));
        assert_eq!(outcome, PickOutcome::Canceled);
    }

    #[test]
    fn test_picker_error_is_reported() {
        let outcome = pick_image(&FixedPermissions(PermissionStatus::Granted), &BrokenPicker);
        assert!(matches!(outcome, PickOutcome::Failed(_)));
    }

    #[test]
    fn test_reload_lists_newest_first() {
        let store = store();
        store.insert(&loc("o1"), &loc("e1")).unwrap();
        store.insert(&loc("o2"), &loc("e2")).unwrap();

        let mut gallery = Gallery::new();
        gallery.reload(&store).unwrap();

        let edited: Vec<&str> = gallery.records().iter().map(|r| r.edited.as_str()).collect();
        assert_eq!(edited, vec!["e2", "e1"]);
    }

    #[test]
    fn test_delete_reloads_from_store() {
        let store = store();
        let keep = store.insert(&loc("o1"), &loc("e1")).unwrap();
        let remove = store.insert(&loc("o2"), &loc("e2")).unwrap();

        let mut gallery = Gallery::new();
        gallery.reload(&store).unwrap();
        gallery.delete_image(&store, remove).unwrap();

        let ids: Vec<i64> = gallery.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![keep]);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_failed_delete_leaves_list_alone() {
        let store = store();
        store.insert(&loc("o1"), &loc("e1")).unwrap();

        let mut gallery = Gallery::new();
        gallery.reload(&store).unwrap();
        store.close().unwrap();

        assert!(gallery.delete_image(&store, 1).is_err());
        assert_eq!(gallery.records().len(), 1);
    }
}
