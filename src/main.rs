use iced::widget::container;
use iced::{window, Element, Length, Subscription, Task, Theme};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

mod config;
mod imaging;
mod platform;
mod state;
mod ui;

use config::{AppConfig, ConfigError};
use imaging::manipulate::manipulate_async;
use imaging::Manipulator;
use platform::picker::prepare_async;
use platform::{DirectoryMediaLibrary, FileDialogPicker, FsPermissions, Services};
use state::edit::SaveOptions;
use state::records::{RecordStore, StoreError};
use ui::alert::Alert;
use ui::editor::{self, Editor};
use ui::gallery::{self, Gallery, PickOutcome};
use ui::Route;

/// Anything that stops the app from starting
#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open the record store: {0}")]
    Store(#[from] StoreError),
}

/// Long-lived resources, built once before the window opens
struct Context {
    store: Arc<RecordStore>,
    services: Services,
    manipulator: Arc<Manipulator>,
}

impl Context {
    fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let store = RecordStore::open(&config.database_path()?)?;
        store.init()?;
        log::debug!("📁 {} records in store", store.count()?);

        let work_dir = config.work_dir()?;
        let library_dir = config.media_library_dir()?;
        log::info!("🖼️  Media library: {}", library_dir.display());

        let services = Services {
            permissions: Arc::new(FsPermissions::for_user(library_dir.clone())),
            picker: Arc::new(FileDialogPicker::new(config.picker_config(), work_dir.clone())),
            media: Arc::new(DirectoryMediaLibrary::new(library_dir)),
        };

        let manipulator = Manipulator::new(work_dir);
        remove_abandoned_edits(&store, &manipulator);

        Ok(Context {
            store: Arc::new(store),
            services,
            manipulator: Arc::new(manipulator),
        })
    }
}

/// Clear work files left by edits that were never saved.
/// Failures only cost disk space, so they are logged and startup continues.
fn remove_abandoned_edits(store: &RecordStore, manipulator: &Manipulator) {
    let records = match store.list_all() {
        Ok(records) => records,
        Err(e) => {
            log::warn!("⚠️  Skipping work dir cleanup: {}", e);
            return;
        }
    };

    let keep: HashSet<_> = records
        .iter()
        .flat_map(|record| [&record.original, &record.edited])
        .map(|location| location.as_path().to_path_buf())
        .collect();

    match manipulator.remove_unreferenced(&keep) {
        Ok(0) => {}
        Ok(removed) => log::info!("🧹 Removed {} abandoned edits", removed),
        Err(e) => log::warn!("⚠️  Work dir cleanup failed: {}", e),
    }
}

/// Which screen is showing
enum Screen {
    Gallery,
    Editor(Editor),
}

/// Main application state
struct PhotoEditor {
    context: Context,
    /// Saved edits, kept across visits to the editor
    gallery: Gallery,
    screen: Screen,
    /// Id handed to the most recently opened editor
    last_editor_id: u64,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    Gallery(gallery::Message),
    Editor(editor::Message),
    /// The user asked to close the window
    CloseRequested(window::Id),
}

impl PhotoEditor {
    /// Create a new instance of the application
    fn new(context: Context) -> (Self, Task<Message>) {
        let mut gallery = Gallery::new();
        if let Err(e) = gallery.reload(&context.store) {
            log::error!("❌ Failed to load edited images: {}", e);
        }
        log::info!("🎨 Photo Editor initialized with {} edited images", gallery.records().len());

        (
            PhotoEditor {
                context,
                gallery,
                screen: Screen::Gallery,
                last_editor_id: 0,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Gallery(message) => self.update_gallery(message),
            Message::Editor(message) => self.update_editor(message),
            Message::CloseRequested(id) => {
                if let Err(e) = self.context.store.close() {
                    log::error!("❌ Failed to close record store: {}", e);
                }
                window::close(id)
            }
        }
    }

    fn update_gallery(&mut self, message: gallery::Message) -> Task<Message> {
        match message {
            gallery::Message::PickImage => {
                let services = &self.context.services;
                match gallery::pick_image(services.permissions.as_ref(), services.picker.as_ref()) {
                    PickOutcome::PermissionDenied => Alert::read_permission_required().show(),
                    PickOutcome::Canceled => {}
                    PickOutcome::Selected(image) => {
                        log::info!("📷 Picked {}", image);
                        // Cropping decodes the whole image, keep it off the UI thread
                        return Task::perform(
                            prepare_async(services.picker.clone(), image),
                            |result| Message::Gallery(gallery::Message::Prepared(result)),
                        );
                    }
                    PickOutcome::Failed(e) => log::error!("❌ Picker error: {}", e),
                }
            }
            gallery::Message::Prepared(Ok(image)) => {
                if matches!(self.screen, Screen::Gallery) {
                    self.navigate(Route::Editor { image: Some(image) });
                }
            }
            gallery::Message::Prepared(Err(e)) => log::error!("❌ Picker error: {}", e),
            gallery::Message::Delete(id) => {
                if let Err(e) = self.gallery.delete_image(&self.context.store, id) {
                    log::error!("❌ Failed to delete edited image {}: {}", id, e);
                }
            }
        }
        Task::none()
    }

    fn update_editor(&mut self, message: editor::Message) -> Task<Message> {
        // Results that arrive after the editor closed are dropped
        let Screen::Editor(editor) = &mut self.screen else {
            return Task::none();
        };

        match message {
            editor::Message::FilterApplied(id, _) | editor::Message::Saved(id, _)
                if id != editor.id() =>
            {
                log::debug!("Dropping result from closed editor {}", id);
                Task::none()
            }
            editor::Message::Apply(filter) => {
                let Some(session) = editor.session() else {
                    return Task::none();
                };
                log::debug!("Applying {} to {}", filter, session.current());

                let id = editor.id();
                Task::perform(
                    manipulate_async(
                        self.context.manipulator.clone(),
                        session.current().clone(),
                        filter.operation(),
                        SaveOptions::default(),
                    ),
                    move |result| Message::Editor(editor::Message::FilterApplied(id, result)),
                )
            }
            editor::Message::FilterApplied(_, Ok(image)) => {
                editor.apply_result(image);
                Task::none()
            }
            editor::Message::FilterApplied(_, Err(e)) => {
                log::error!("❌ Filter failed: {}", e);
                Task::none()
            }
            editor::Message::Reset => {
                editor.reset();
                Task::none()
            }
            editor::Message::Save => {
                let id = editor.id();
                Task::perform(
                    editor::save_image_async(
                        editor.session().cloned(),
                        self.context.services.clone(),
                        self.context.store.clone(),
                    ),
                    move |outcome| Message::Editor(editor::Message::Saved(id, outcome)),
                )
            }
            editor::Message::Saved(_, outcome) => {
                if let Some(alert) = outcome.alert() {
                    alert.show();
                }
                if outcome.navigates_back() {
                    self.navigate(Route::Gallery);
                }
                Task::none()
            }
            editor::Message::Back => {
                self.navigate(Route::Gallery);
                Task::none()
            }
        }
    }

    fn navigate(&mut self, route: Route) {
        match route {
            Route::Gallery => {
                self.screen = Screen::Gallery;
                if let Err(e) = self.gallery.reload(&self.context.store) {
                    log::error!("❌ Failed to load edited images: {}", e);
                }
            }
            Route::Editor { image } => {
                self.last_editor_id += 1;
                self.screen = Screen::Editor(Editor::new(self.last_editor_id, image));
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let content = match &self.screen {
            Screen::Gallery => self.gallery.view().map(Message::Gallery),
            Screen::Editor(editor) => editor.view().map(Message::Editor),
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        window::close_requests().map(Message::CloseRequested)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load();
    let context = match Context::from_config(&config) {
        Ok(context) => context,
        Err(e) => {
            // The app cannot function without its database
            log::error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    iced::application("Photo Editor", PhotoEditor::update, PhotoEditor::view)
        .theme(PhotoEditor::theme)
        .subscription(PhotoEditor::subscription)
        .window(window::Settings {
            size: iced::Size::new(520.0, 760.0),
            exit_on_close_request: false,
            ..window::Settings::default()
        })
        .centered()
        .run_with(move || PhotoEditor::new(context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::permissions::{PermissionService, PermissionStatus};
    use platform::picker::{ImagePicker, PickerError};
    use state::data::Location;
    use state::edit::EditSession;
    use ui::editor::SaveOutcome;

    struct Granted;

    impl PermissionService for Granted {
        fn request_read(&self) -> PermissionStatus {
            PermissionStatus::Granted
        }
        fn request_write(&self) -> PermissionStatus {
            PermissionStatus::Granted
        }
    }

    struct NoPicker;

    impl ImagePicker for NoPicker {
        fn pick(&self) -> Result<Option<Location>, PickerError> {
            Ok(None)
        }
    }

    fn loc(s: &str) -> Location {
        Location::new(s).unwrap()
    }

    fn app(dir: &std::path::Path) -> PhotoEditor {
        let store = RecordStore::open_in_memory().unwrap();
        store.init().unwrap();
        let context = Context {
            store: Arc::new(store),
            services: Services {
                permissions: Arc::new(Granted),
                picker: Arc::new(NoPicker),
                media: Arc::new(DirectoryMediaLibrary::new(dir.join("library"))),
            },
            manipulator: Arc::new(Manipulator::new(dir.join("work"))),
        };
        PhotoEditor::new(context).0
    }

    fn open_editor(app: &mut PhotoEditor, image: &str) {
        let _ = app.update(Message::Gallery(gallery::Message::Prepared(Ok(loc(image)))));
    }

    fn session(app: &PhotoEditor) -> &EditSession {
        match &app.screen {
            Screen::Editor(editor) => editor.session().unwrap(),
            Screen::Gallery => panic!("expected the editor to be open"),
        }
    }

    fn current_editor_id(app: &PhotoEditor) -> u64 {
        match &app.screen {
            Screen::Editor(editor) => editor.id(),
            Screen::Gallery => panic!("expected the editor to be open"),
        }
    }

    #[test]
    fn test_prepared_pick_opens_editor() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        open_editor(&mut app, "a.jpg");

        assert_eq!(session(&app).original(), &loc("a.jpg"));
        assert_eq!(session(&app).current(), &loc("a.jpg"));
    }

    #[test]
    fn test_filter_result_from_previous_editor_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        open_editor(&mut app, "a.jpg");
        let first = current_editor_id(&app);
        let _ = app.update(Message::Editor(editor::Message::Back));
        open_editor(&mut app, "b.jpg");

        let _ = app.update(Message::Editor(editor::Message::FilterApplied(
            first,
            Ok(loc("rotated-a.jpg")),
        )));

        assert_eq!(session(&app).original(), &loc("b.jpg"));
        assert_eq!(session(&app).current(), &loc("b.jpg"));

        let second = current_editor_id(&app);
        assert_ne!(first, second);
        let _ = app.update(Message::Editor(editor::Message::FilterApplied(
            second,
            Ok(loc("rotated-b.jpg")),
        )));
        assert_eq!(session(&app).current(), &loc("rotated-b.jpg"));
    }

    #[test]
    fn test_save_result_from_previous_editor_keeps_current_edits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        open_editor(&mut app, "a.jpg");
        let first = current_editor_id(&app);
        let _ = app.update(Message::Editor(editor::Message::Back));
        open_editor(&mut app, "b.jpg");
        let second = current_editor_id(&app);
        let _ = app.update(Message::Editor(editor::Message::FilterApplied(
            second,
            Ok(loc("rotated-b.jpg")),
        )));

        let _ = app.update(Message::Editor(editor::Message::Saved(
            first,
            SaveOutcome::Saved {
                asset: loc("library/a.jpg"),
            },
        )));

        assert_eq!(session(&app).current(), &loc("rotated-b.jpg"));
    }

    #[test]
    fn test_prepared_pick_ignored_outside_gallery() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        open_editor(&mut app, "a.jpg");
        open_editor(&mut app, "b.jpg");

        assert_eq!(session(&app).original(), &loc("a.jpg"));
    }

    #[test]
    fn test_cleanup_keeps_files_referenced_by_records() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        let saved = work.join("saved.jpg");
        let abandoned = work.join("abandoned.jpg");
        std::fs::write(&saved, b"x").unwrap();
        std::fs::write(&abandoned, b"x").unwrap();

        let store = RecordStore::open_in_memory().unwrap();
        store.init().unwrap();
        store
            .insert(&loc("photo.jpg"), &Location::from_path(&saved).unwrap())
            .unwrap();

        remove_abandoned_edits(&store, &Manipulator::new(work));

        assert!(saved.exists());
        assert!(!abandoned.exists());
    }
}
