/// Editor state: the filters a user can apply and the transient session
///
/// A session remembers the image the editor was opened with and the image
/// currently previewed. Every filter replaces the current image wholesale;
/// there is no history beyond a single-step reset to the original.

use std::fmt;

use super::data::Location;

/// The four canned filters offered by the editor.
///
/// `Grayscale` and `Brightness` only resize the image; they do not touch
/// colour or luminance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Grayscale,
    Rotate,
    Flip,
    Brightness,
}

impl Filter {
    /// All filters, in the order the editor shows them
    pub const ALL: [Filter; 4] = [
        Filter::Grayscale,
        Filter::Rotate,
        Filter::Flip,
        Filter::Brightness,
    ];

    /// Button label
    pub fn label(self) -> &'static str {
        match self {
            Filter::Grayscale => "Grayscale",
            Filter::Rotate => "Rotate 90°",
            Filter::Flip => "Flip Horizontal",
            Filter::Brightness => "Brightness",
        }
    }

    /// The single manipulation this filter performs
    pub fn operation(self) -> Operation {
        match self {
            Filter::Grayscale => Operation::Resize {
                width: 300,
                height: 300,
            },
            Filter::Rotate => Operation::Rotate { degrees: 90 },
            Filter::Flip => Operation::Flip(FlipAxis::Horizontal),
            Filter::Brightness => Operation::Resize {
                width: 400,
                height: 400,
            },
        }
    }

    fn name(self) -> &'static str {
        match self {
            Filter::Grayscale => "grayscale",
            Filter::Rotate => "rotate",
            Filter::Flip => "flip",
            Filter::Brightness => "brightness",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mirror axis for [`Operation::Flip`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
}

/// One step understood by the image manipulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Resize to exactly `width` x `height` (aspect ratio is not kept)
    Resize { width: u32, height: u32 },
    /// Clockwise rotation; multiples of 90 only
    Rotate { degrees: u32 },
    Flip(FlipAxis),
}

/// Encoding of manipulated images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Jpeg,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Jpeg => "jpg",
        }
    }
}

/// Output settings for a manipulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaveOptions {
    /// Compression quality, 0.0 (smallest) to 1.0 (best)
    pub compress: f32,
    pub format: SaveFormat,
}

impl Default for SaveOptions {
    /// Full quality JPEG, which is what every filter uses
    fn default() -> Self {
        Self {
            compress: 1.0,
            format: SaveFormat::Jpeg,
        }
    }
}

/// Transient editor state for one opened image
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    original: Location,
    current: Location,
}

impl EditSession {
    /// Start editing `image`; current and original both point at it
    pub fn new(image: Location) -> Self {
        Self {
            current: image.clone(),
            original: image,
        }
    }

    pub fn original(&self) -> &Location {
        &self.original
    }

    pub fn current(&self) -> &Location {
        &self.current
    }

    /// Replace the previewed image with a filter's output
    pub fn replace_current(&mut self, image: Location) {
        self.current = image;
    }

    /// Drop every applied filter in one step
    pub fn reset(&mut self) {
        self.current = self.original.clone();
    }

    /// True once at least one filter result is being previewed
    pub fn is_transformed(&self) -> bool {
        self.current != self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Location {
        Location::new(s).unwrap()
    }

    #[test]
    fn test_new_session_is_unedited() {
        let session = EditSession::new(loc("photo.jpg"));
        assert_eq!(session.current(), session.original());
        assert!(!session.is_transformed());
    }

    #[test]
    fn test_reset_restores_original_after_any_sequence() {
        let mut session = EditSession::new(loc("photo.jpg"));
        for step in ["a.jpg", "b.jpg", "c.jpg"] {
            session.replace_current(loc(step));
        }
        assert!(session.is_transformed());
        assert_eq!(session.current(), &loc("c.jpg"));

        session.reset();

        assert_eq!(session.current(), &loc("photo.jpg"));
        assert_eq!(session.original(), &loc("photo.jpg"));
    }

    #[test]
    fn test_resize_only_filters() {
        assert_eq!(
            Filter::Grayscale.operation(),
            Operation::Resize { width: 300, height: 300 }
        );
        assert_eq!(
            Filter::Brightness.operation(),
            Operation::Resize { width: 400, height: 400 }
        );
        assert_eq!(Filter::Rotate.operation(), Operation::Rotate { degrees: 90 });
        assert_eq!(
            Filter::Flip.operation(),
            Operation::Flip(FlipAxis::Horizontal)
        );
    }

    #[test]
    fn test_filters_in_button_order() {
        let labels: Vec<&str> = Filter::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(
            labels,
            vec!["Grayscale", "Rotate 90°", "Flip Horizontal", "Brightness"]
        );
        assert_eq!(Filter::Rotate.to_string(), "rotate");
    }

    #[test]
    fn test_default_save_options() {
        let options = SaveOptions::default();
        assert_eq!(options.compress, 1.0);
        assert_eq!(options.format, SaveFormat::Jpeg);
    }
}
