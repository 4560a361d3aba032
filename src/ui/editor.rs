use iced::widget::image::{Handle, Image};
use iced::widget::{button, column, row, scrollable, text, Row};
use iced::{ContentFit, Element, Length};
use std::sync::Arc;

use super::alert::Alert;
use crate::platform::{MediaLibrary, PermissionService, Services};
use crate::state::data::Location;
use crate::state::edit::{EditSession, Filter};
use crate::state::records::RecordStore;

#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked a filter button
    Apply(Filter),
    /// A background filter started by the given editor finished
    FilterApplied(u64, Result<Location, String>),
    /// User clicked Reset
    Reset,
    /// User clicked Save
    Save,
    /// A background save started by the given editor finished
    Saved(u64, SaveOutcome),
    /// User left the editor without saving
    Back,
}

/// Result of a save attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Nothing to save
    Skipped,
    PermissionDenied,
    /// Writing the asset or the record failed. Anything already written
    /// (e.g. the media library copy) is left in place.
    Failed(String),
    Saved { asset: Location },
}

impl SaveOutcome {
    /// The notice to show the user, if any
    pub fn alert(&self) -> Option<Alert> {
        match self {
            SaveOutcome::Skipped => None,
            SaveOutcome::PermissionDenied => Some(Alert::write_permission_required()),
            SaveOutcome::Failed(message) => Some(Alert::save_failed(message)),
            SaveOutcome::Saved { .. } => Some(Alert::saved()),
        }
    }

    /// Only a completed save leaves the editor
    pub fn navigates_back(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// Editor screen state. `None` when opened without an image.
///
/// Every opened editor gets a fresh `id`; background results carry the id of
/// the editor that started them so a later editor never picks them up.
#[derive(Debug, Clone)]
pub struct Editor {
    id: u64,
    session: Option<EditSession>,
}

impl Editor {
    pub fn new(id: u64, image: Option<Location>) -> Self {
        Self {
            id,
            session: image.map(EditSession::new),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Show a filter's output. The previous intermediate image is forgotten.
    pub fn apply_result(&mut self, image: Location) {
        if let Some(session) = &mut self.session {
            session.replace_current(image);
        }
    }

    pub fn reset(&mut self) {
        if let Some(session) = &mut self.session {
            session.reset();
        }
    }

    /// Build the editor screen
    pub fn view(&self) -> Element<'_, Message> {
        let transformed = self.session.as_ref().is_some_and(EditSession::is_transformed);

        let preview: Element<'_, Message> = match &self.session {
            Some(session) => Image::new(Handle::from_path(session.current().as_path()))
                .width(Length::Fill)
                .height(Length::Fixed(300.0))
                .content_fit(ContentFit::Contain)
                .into(),
            None => text("No image selected").into(),
        };

        let filters = Filter::ALL.into_iter().fold(Row::new().spacing(10), |row, filter| {
            row.push(
                button(text(filter.label()))
                    .padding(10)
                    .on_press(Message::Apply(filter)),
            )
        });

        let actions = row![
            button(text("Reset"))
                .style(button::danger)
                .padding(15)
                .width(Length::Fill)
                .on_press_maybe(transformed.then_some(Message::Reset)),
            button(text("Save"))
                .style(button::success)
                .padding(15)
                .width(Length::Fill)
                .on_press(Message::Save),
        ]
        .spacing(10);

        scrollable(
            column![
                button(text("Back"))
                    .style(button::secondary)
                    .on_press(Message::Back),
                text("Edit Image").size(24),
                preview,
                filters,
                actions,
            ]
            .spacing(20)
            .padding(20),
        )
        .into()
    }
}

/// Save the previewed image.
///
/// Steps run in order and stop at the first failure:
/// 1. write permission (denied: nothing is written)
/// 2. copy into the media library
/// 3. insert the original -> edited record
///
/// There is no rollback: if step 3 fails, the copy from step 2 stays.
pub fn save_image(
    session: Option<&EditSession>,
    permissions: &dyn PermissionService,
    media: &dyn MediaLibrary,
    store: &RecordStore,
) -> SaveOutcome {
    let Some(session) = session else {
        return SaveOutcome::Skipped;
    };

    if !permissions.request_write().is_granted() {
        return SaveOutcome::PermissionDenied;
    }

    let asset = match media.save_asset(session.current()) {
        Ok(asset) => asset,
        Err(e) => {
            log::error!("❌ Save error: {}", e);
            return SaveOutcome::Failed(e.to_string());
        }
    };
    log::info!("💾 Saved to media library: {}", asset.location);

    if let Err(e) = store.insert(session.original(), session.current()) {
        log::error!("❌ Save error: {}", e);
        return SaveOutcome::Failed(e.to_string());
    }
    log::info!("💾 Saved record: {} -> {}", session.original(), session.current());

    SaveOutcome::Saved {
        asset: asset.location,
    }
}

/// Run [`save_image`] on the blocking pool
pub async fn save_image_async(
    session: Option<EditSession>,
    services: Services,
    store: Arc<RecordStore>,
) -> SaveOutcome {
    tokio::task::spawn_blocking(move || {
        save_image(
            session.as_ref(),
            services.permissions.as_ref(),
            services.media.as_ref(),
            &store,
        )
    })
    .await
    .unwrap_or_else(|e| SaveOutcome::Failed(format!("Task join error: {}", e)))
}
