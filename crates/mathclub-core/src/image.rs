//! Uploaded stage images.
//!
//! Authors may attach one PNG or JPG image to each stage. The bytes stay in
//! memory until a snapshot writes them next to the saved lesson.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result};

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG image format.
    Png,
    /// JPEG image format.
    Jpg,
}

impl ImageFormat {
    /// Attempts to detect image format from file extension.
    ///
    /// Returns `None` if the extension is not an accepted upload type.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            _ => None,
        }
    }

    /// Attempts to detect image format from a file path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// File extension used when the image is written to disk.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// An image attached to a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageImage {
    /// Name of the uploaded file.
    pub file_name: String,

    /// Detected image format.
    pub format: ImageFormat,

    /// Raw image bytes.
    pub data: Vec<u8>,
}

impl StageImage {
    /// Accepts an upload, checking its extension and size.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::UnsupportedImageFormat` for anything but
    /// `.png`/`.jpg`/`.jpeg`, and `LessonError::ImageTooLarge` when `data`
    /// exceeds `max_size` bytes.
    pub fn from_upload(
        file_name: impl Into<String>,
        data: Vec<u8>,
        max_size: usize,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let format = ImageFormat::from_path(Path::new(&file_name))
            .ok_or_else(|| LessonError::unsupported_image(&file_name))?;

        if data.len() > max_size {
            return Err(LessonError::image_too_large(file_name, data.len(), max_size));
        }

        Ok(Self {
            file_name,
            format,
            data,
        })
    }

    /// Reads an upload from disk.
    ///
    /// The format and the file size are checked before the file is read.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::UnsupportedImageFormat`,
    /// `LessonError::ImageTooLarge`, or `LessonError::Io` if the file cannot
    /// be read.
    pub fn load(path: impl AsRef<Path>, max_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());

        if ImageFormat::from_path(path).is_none() {
            return Err(LessonError::unsupported_image(file_name));
        }

        let file_size = std::fs::metadata(path)?.len();
        if file_size > u64::try_from(max_size).unwrap_or(u64::MAX) {
            let size = usize::try_from(file_size).unwrap_or(usize::MAX);
            return Err(LessonError::image_too_large(file_name, size, max_size));
        }

        let data = std::fs::read(path)?;
        Self::from_upload(file_name, data, max_size)
    }

    /// Size of the image in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
