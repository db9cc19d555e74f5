use std::fmt;
use std::path::Path;

use crate::error::RetimeError;

/// Extensions (lowercase, without the dot) read through the EXIF path
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "avif"];

/// Extensions read through the stream probe
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => f.write_str("image"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// Classify a file by its extension alone. The file is never opened.
pub fn classify(path: &Path) -> Result<MediaKind, RetimeError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        Ok(MediaKind::Video)
    } else {
        Err(RetimeError::UnsupportedFileType {
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", extension)
            },
        })
    }
}
