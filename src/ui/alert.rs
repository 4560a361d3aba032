use rfd::{MessageButtons, MessageDialog, MessageLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

/// A plain text notice shown in a native message box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub description: String,
}

impl Alert {
    pub fn new(level: AlertLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn read_permission_required() -> Self {
        Self::new(
            AlertLevel::Warning,
            "Permission required",
            "Permission to access camera roll is required!",
        )
    }

    pub fn write_permission_required() -> Self {
        Self::new(
            AlertLevel::Warning,
            "Permission required",
            "Permission to save to media library is required!",
        )
    }

    pub fn save_failed(message: &str) -> Self {
        Self::new(
            AlertLevel::Error,
            "Error",
            format!("Failed to save image: {}", message),
        )
    }

    pub fn saved() -> Self {
        Self::new(
            AlertLevel::Info,
            "Success",
            "Image saved to gallery successfully!",
        )
    }

    /// Block until the user dismisses the message box
    pub fn show(&self) {
        let level = match self.level {
            AlertLevel::Info => MessageLevel::Info,
            AlertLevel::Warning => MessageLevel::Warning,
            AlertLevel::Error => MessageLevel::Error,
        };

        let _ = MessageDialog::new()
            .set_level(level)
            .set_title(self.title.as_str())
            .set_description(self.description.as_str())
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
