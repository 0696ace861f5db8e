//! Image attachments for the image screen.
//!
//! Attachments are opaque: the bytes are never decoded, only sniffed for a
//! MIME type so the service knows what it is receiving.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur when loading an attachment.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Failed to read image '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{name}' is not a recognised image format")]
    UnknownFormat { name: String },
}

/// One image selected for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    name: String,
    mime_type: &'static str,
    data: Vec<u8>,
}

impl ImageAttachment {
    /// Read an image file from disk.
    pub fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let data = fs::read(path).map_err(|e| AttachmentError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_bytes(name, data)
    }

    /// Wrap in-memory image bytes, detecting the format from its signature.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self, AttachmentError> {
        let name = name.into();
        let format =
            image::guess_format(&data).map_err(|_| AttachmentError::UnknownFormat {
                name: name.clone(),
            })?;

        Ok(Self {
            name,
            mime_type: format.to_mime_type(),
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Ordered images collected before a submission.
///
/// There is no way to remove entries; a new screen starts with an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAttachmentSet {
    images: Vec<ImageAttachment>,
}

impl ImageAttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image: ImageAttachment) {
        self.images.push(image);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageAttachment> {
        self.images.iter()
    }

    pub fn to_vec(&self) -> Vec<ImageAttachment> {
        self.images.clone()
    }
}
