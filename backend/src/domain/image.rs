//! Uploaded image values and their storage layout.
//!
//! Every upload is stored under a freshly generated name plus an extension
//! derived from the file signature, so no two records ever share a file.
//! Client supplied filenames never reach the store.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AccountId;
use super::fields::FieldError;

const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Record family an image belongs to; selects the top-level directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// `plant_image` on a plant record.
    Plant,
    /// `observation_image` on an observation record.
    Observation,
    /// `profile_image` on an account.
    Profile,
}

impl ImageKind {
    /// Directory under the media root holding this kind of image.
    #[must_use]
    pub const fn directory(self) -> &'static str {
        match self {
            Self::Plant => "plants",
            Self::Observation => "observations",
            Self::Profile => "users",
        }
    }

    /// Wire name of the field carrying this kind of image.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Plant => "plant_image",
            Self::Observation => "observation_image",
            Self::Profile => "profile_image",
        }
    }
}

/// Storage-relative path of a stored image, e.g. `plants/<owner>/<uuid>.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePath(String);

impl ImagePath {
    /// Wrap a path previously produced by [`ImageUpload::storage_path`].
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Path segments below the media root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    /// Owner segment of a `{kind}/{owner}/{file}` path.
    #[must_use]
    pub fn owner(&self) -> Option<AccountId> {
        let mut segments = self.segments();
        segments.next()?;
        AccountId::new(segments.next()?).ok()
    }
}

impl AsRef<str> for ImagePath {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated image bytes awaiting storage.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    name: Uuid,
    content: Vec<u8>,
    extension: &'static str,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("len", &self.content.len())
            .field("extension", &self.extension)
            .finish()
    }
}

impl ImageUpload {
    /// Accept `content` for `kind` when its signature is JPEG, PNG, GIF, or WebP.
    ///
    /// # Examples
    /// ```
    /// use greenleaf::domain::{ImageKind, ImageUpload};
    ///
    /// let png = b"\x89PNG\r\n\x1a\n rest".to_vec();
    /// let upload = ImageUpload::from_bytes(ImageKind::Plant, png).unwrap();
    /// assert_eq!(upload.extension(), "png");
    /// assert!(ImageUpload::from_bytes(ImageKind::Plant, b"hello".to_vec()).is_err());
    /// ```
    pub fn from_bytes(kind: ImageKind, content: Vec<u8>) -> Result<Self, FieldError> {
        if content.is_empty() {
            return Err(FieldError::invalid(kind.field(), "The submitted file is empty."));
        }
        let extension = sniff_extension(&content)
            .ok_or_else(|| FieldError::invalid(kind.field(), INVALID_IMAGE))?;
        Ok(Self {
            name: Uuid::new_v4(),
            content,
            extension,
        })
    }

    /// Raw image bytes.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Extension derived from the file signature.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        self.extension
    }

    /// Location for this upload: `{kind}/{owner}/{uuid}.{ext}`.
    ///
    /// The name is fixed when the upload is accepted, so repeated calls agree.
    #[must_use]
    pub fn storage_path(&self, kind: ImageKind, owner: &AccountId) -> ImagePath {
        ImagePath(format!(
            "{}/{}/{}.{}",
            kind.directory(),
            owner,
            self.name.simple(),
            self.extension
        ))
    }
}

/// Requested change to a record's image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageChange {
    /// Leave the current image in place.
    #[default]
    Keep,
    /// Remove the current image.
    Clear,
    /// Store a new image and drop the previous one.
    Replace(ImageUpload),
}

fn sniff_extension(content: &[u8]) -> Option<&'static str> {
    if content.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if content.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if content.starts_with(b"GIF87a") || content.starts_with(b"GIF89a") {
        Some("gif")
    } else if content.starts_with(b"RIFF") && content.get(8..12) == Some(b"WEBP".as_slice()) {
        Some("webp")
    } else {
        None
    }
}

/// Content type for a stored image path, based on its extension.
#[must_use]
pub fn content_type_for(path: &ImagePath) -> &'static str {
    match path.as_ref().rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
