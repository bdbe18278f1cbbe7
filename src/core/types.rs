//! Shared types used across Aura modules
//!
//! Contains the chat turn, its role, and image attachments.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::{AuraError, Result};

/// Text shown for a user turn that carries only an image
pub const IMAGE_ONLY_PLACEHOLDER: &str = "📷 Image uploaded";

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person typing
    User,
    /// Aura
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// An image attached to a user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Create an attachment from bytes already in memory
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read an image file, inferring its MIME type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime_type = mime_type_for(path).ok_or_else(|| {
            AuraError::image(format!(
                "Unsupported image type: {} (expected png, jpeg, webp, gif, heic or heif)",
                path.display()
            ))
        })?;

        let bytes = fs::read(path)
            .map_err(|e| AuraError::image(format!("Failed to read {}: {}", path.display(), e)))?;

        if bytes.is_empty() {
            return Err(AuraError::image(format!("{} is empty", path.display())));
        }

        Ok(Self::new(mime_type, bytes))
    }

    /// Size of the image in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the image has no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Map a file extension to an image MIME type the service accepts
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// One message in the conversation. Never edited after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// Unique identifier
    pub id: String,
    /// Author of the turn
    pub role: Role,
    /// Text shown to the user
    pub text: String,
    /// Attached image (user turns only)
    pub image: Option<ImageAttachment>,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, text: impl Into<String>, image: Option<ImageAttachment>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            image,
            timestamp: Utc::now(),
        }
    }

    /// Create a user turn. An image-only submission gets the placeholder text.
    pub fn user(text: impl Into<String>, image: Option<ImageAttachment>) -> Self {
        let text = text.into();
        let text = if text.is_empty() && image.is_some() {
            IMAGE_ONLY_PLACEHOLDER.to_string()
        } else {
            text
        };
        Self::new(Role::User, text, image)
    }

    /// Create an assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text, None)
    }

    /// Whether this turn was written by the user
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
