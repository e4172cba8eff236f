//! Wire shape of an item source response.
//!
//! The image proxy answers `GET /api/dogs?size=N` with a JSON array whose
//! elements are either bare strings (data URIs or URLs), `{id, src, alt}`
//! objects, or `null` for entries the proxy failed to fetch upstream.

use serde::{Deserialize, Serialize};

use super::item::ItemId;

/// One element of a batch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemDescriptor {
    /// A bare image reference (data URI or URL) without metadata
    Bare(String),
    /// A described image
    Described {
        #[serde(default)]
        id: Option<String>,
        src: String,
        #[serde(default)]
        alt: Option<String>,
    },
}

impl ItemDescriptor {
    /// The image reference to load.
    pub fn src(&self) -> &str {
        match self {
            ItemDescriptor::Bare(src) => src,
            ItemDescriptor::Described { src, .. } => src,
        }
    }

    pub fn alt(&self) -> Option<&str> {
        match self {
            ItemDescriptor::Bare(_) => None,
            ItemDescriptor::Described { alt, .. } => alt.as_deref(),
        }
    }

    /// The id carried by the descriptor, or a freshly generated one.
    pub fn id_or_generate(&self) -> ItemId {
        match self {
            ItemDescriptor::Described { id: Some(id), .. } if !id.is_empty() => {
                ItemId::new(id.clone())
            }
            _ => ItemId::generate(),
        }
    }
}

/// Parse a batch response body.
///
/// `null` entries are dropped; anything that is not an array of strings,
/// descriptor objects or nulls is rejected.
pub fn parse_batch(body: &[u8]) -> Result<Vec<ItemDescriptor>, serde_json::Error> {
    let entries: Vec<Option<ItemDescriptor>> = serde_json::from_slice(body)?;
    Ok(entries.into_iter().flatten().collect())
}
