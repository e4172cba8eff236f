//! Feed item types.
//!
//! An [`Item`] is the unit that flows through the supply pipeline: it is
//! created once by an item source, then moved between containers until it
//! is recycled or dropped. Items are immutable; the image payload lives in a
//! reference-counted [`Bytes`] buffer and the reference in an `Arc<str>`, so
//! moving or cloning an item for a renderer never copies the image itself.
//! Inline `data:` images keep only their decoded bytes.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Stable identifier of a feed item.
///
/// The same id may legitimately reappear once an item has been recycled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id for items whose source did not provide one.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Loaded image bytes together with the sniffed MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// MIME type, e.g. `image/jpeg`
    pub mime: String,
    /// Raw encoded image bytes
    pub data: Bytes,
}

impl ImagePayload {
    pub fn new(mime: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            mime: mime.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A single displayable image item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Identifier used by renderers and exit detectors
    pub id: ItemId,
    /// Image reference as delivered by the source, `None` for inline data
    pub src: Option<Arc<str>>,
    /// Optional alternative text
    pub alt: Option<String>,
    /// Loaded image, present once the source has preloaded it
    pub payload: Option<ImagePayload>,
}

impl Item {
    /// Create an item that only carries a reference to its image.
    pub fn new(id: impl Into<ItemId>, src: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            src: Some(src.into()),
            alt: None,
            payload: None,
        }
    }

    /// Create an item from image bytes that arrived inline.
    pub fn inline(id: impl Into<ItemId>, payload: ImagePayload) -> Self {
        Self {
            id: id.into(),
            src: None,
            alt: None,
            payload: Some(payload),
        }
    }

    /// Set the alternative text.
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// Attach the loaded image bytes.
    pub fn with_payload(mut self, payload: ImagePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// Whether the image has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.payload.is_some()
    }

    /// Alt text or an empty string, the way an `<img>` would render it.
    pub fn alt_text(&self) -> &str {
        self.alt.as_deref().unwrap_or("")
    }
}
