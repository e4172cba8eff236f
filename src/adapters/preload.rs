//! Image preloading.
//!
//! A descriptor only names an image; [`Preloader`] turns it into an [`Item`]
//! whose bytes are already in memory, so nothing enters the pipeline that a
//! renderer would still have to wait for. Data URIs are decoded in place,
//! absolute `http(s)` references are fetched, and relative references are
//! resolved against the source's base URL. Whatever the origin, the bytes
//! must sniff as a known image format.

use base64::Engine;
use bytes::Bytes;

use crate::error::PreloadError;
use crate::models::{ImagePayload, Item, ItemDescriptor};

/// Loads the images named by batch descriptors.
#[derive(Debug, Clone)]
pub struct Preloader {
    client: reqwest::Client,
    base_url: String,
}

impl Preloader {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Load one descriptor into a fully populated item.
    pub async fn load(&self, descriptor: &ItemDescriptor) -> Result<Item, PreloadError> {
        let src = descriptor.src();
        let data = self.load_bytes(src).await?;
        let payload = sniff(data, src)?;

        let id = descriptor.id_or_generate();
        // Inline data is not kept once decoded
        let mut item = if is_data_uri(src) {
            Item::inline(id, payload)
        } else {
            Item::new(id, src).with_payload(payload)
        };
        if let Some(alt) = descriptor.alt() {
            item = item.with_alt(alt);
        }
        Ok(item)
    }

    async fn load_bytes(&self, src: &str) -> Result<Bytes, PreloadError> {
        if is_data_uri(src) {
            return decode_data_uri(src.trim_start());
        }

        let url = resolve_reference(&self.base_url, src)?;
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PreloadError::Fetch {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreloadError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| PreloadError::Fetch {
            url,
            message: e.to_string(),
        })
    }
}

fn is_data_uri(src: &str) -> bool {
    src.trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Decode a `data:` URI into its raw bytes.
///
/// Both base64 and percent-encoded payloads are accepted.
pub fn decode_data_uri(uri: &str) -> Result<Bytes, PreloadError> {
    let malformed = || PreloadError::MalformedDataUri(truncate_for_log(uri));

    let rest = uri
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &uri[5..])
        .ok_or_else(malformed)?;
    let (header, data) = rest.split_once(',').ok_or_else(malformed)?;

    let is_base64 = header
        .rsplit(';')
        .next()
        .is_some_and(|param| param.trim().eq_ignore_ascii_case("base64"));

    if is_base64 {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map(Bytes::from)
            .map_err(|_| malformed())
    } else {
        Ok(Bytes::from(
            urlencoding::decode_binary(data.as_bytes()).into_owned(),
        ))
    }
}

/// Turn an image reference into an absolute `http(s)` URL.
pub fn resolve_reference(base_url: &str, src: &str) -> Result<String, PreloadError> {
    let src = src.trim();
    let lower = src.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(src.to_string());
    }
    if src.is_empty() || src.contains("://") || lower.starts_with("data:") {
        return Err(PreloadError::UnsupportedReference(truncate_for_log(src)));
    }
    if let Some(path) = src.strip_prefix("//") {
        let scheme = if base_url.to_ascii_lowercase().starts_with("https://") {
            "https"
        } else {
            "http"
        };
        return Ok(format!("{scheme}://{path}"));
    }

    let base = base_url.trim_end_matches('/');
    if src.starts_with('/') {
        Ok(format!("{base}{src}"))
    } else {
        Ok(format!("{base}/{src}"))
    }
}

/// Identify the image format from its leading bytes.
pub fn sniff(data: Bytes, src: &str) -> Result<ImagePayload, PreloadError> {
    let format = image::guess_format(&data)
        .map_err(|_| PreloadError::UnrecognizedImage(truncate_for_log(src)))?;
    Ok(ImagePayload::new(format.to_mime_type(), data))
}

// Data URIs can be megabytes long
fn truncate_for_log(s: &str) -> String {
    const MAX: usize = 64;
    match s.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}
