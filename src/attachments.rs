//! Attached-image resolution and retrieval.
//!
//! Attachments come from the user message's content items, or when the
//! message carries none, from the image cards of the previous response.
//! Sources are either regular URLs or inline base64 data URIs.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use futures::future::try_join_all;
use tracing::{instrument, warn};

use crate::cards::{self, Card, ContentItem};
use crate::error::{Error, Result};

/// Name used for attached images the host did not name.
pub const DEFAULT_ATTACHMENT_NAME: &str = "image.png";

/// Name used for images carried over from a previous response.
pub const PRIOR_OUTPUT_NAME: &str = "output.png";

/// An image to feed into an edit request, not yet fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Source URL, either remote or a base64 data URI
    pub url: String,
    /// File name to report upstream
    pub name: String,
}

/// An attachment with its bytes in hand.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// File name to report upstream
    pub name: String,
    /// MIME type, when the source declared one
    pub mime: Option<String>,
}

/// Collect image attachments from a message, falling back to prior cards.
///
/// Message content wins: prior cards are only consulted when the message
/// itself carries no usable image items. Items without a synced URL or an
/// inline base64 copy are skipped.
pub fn gather(message_content: &[ContentItem], prior_cards: &[Card]) -> Vec<ImageAttachment> {
    let mut attachments = Vec::new();

    for item in message_content.iter().filter(|item| item.is_image_file()) {
        let name = item
            .metadata
            .as_ref()
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| DEFAULT_ATTACHMENT_NAME.to_string());

        let url = item
            .sync
            .as_ref()
            .and_then(|s| s.url.clone())
            .or_else(|| item.metadata.as_ref().and_then(|m| m.base64.clone()));

        match url {
            Some(url) => attachments.push(ImageAttachment { url, name }),
            None => warn!(name = %name, "Attached image has no synced URL or inline data, skipping"),
        }
    }

    if attachments.is_empty() {
        for card in prior_cards.iter().filter(|card| card.is_image()) {
            attachments.push(ImageAttachment {
                url: card.image.url.clone(),
                name: PRIOR_OUTPUT_NAME.to_string(),
            });
        }
    }

    attachments
}

/// Fetch all attachments concurrently, preserving input order.
///
/// Fails on the first attachment that cannot be retrieved.
#[instrument(level = "debug", skip(client, attachments), fields(count = attachments.len()))]
pub async fn fetch_all(
    client: &reqwest::Client,
    attachments: &[ImageAttachment],
) -> Result<Vec<FetchedImage>> {
    let fetches = attachments.iter().map(|a| fetch_one(client, a));
    try_join_all(fetches).await
}

async fn fetch_one(
    client: &reqwest::Client,
    attachment: &ImageAttachment,
) -> Result<FetchedImage> {
    if attachment.url.starts_with("data:") {
        return decode_data_uri(attachment);
    }

    let response = client
        .get(&attachment.url)
        .send()
        .await
        .map_err(|e| Error::attachment(&attachment.name, format!("Request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::attachment(
            &attachment.name,
            format!("Failed with status {}", status),
        ));
    }

    let mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::attachment(&attachment.name, format!("Failed to read body: {}", e)))?;

    Ok(FetchedImage {
        bytes: bytes.to_vec(),
        name: attachment.name.clone(),
        mime,
    })
}

fn decode_data_uri(attachment: &ImageAttachment) -> Result<FetchedImage> {
    let (mime, payload) = cards::split_data_uri(&attachment.url)
        .ok_or_else(|| Error::attachment(&attachment.name, "Malformed data URI"))?;

    let bytes = BASE64
        .decode(payload)
        .map_err(|e| Error::attachment(&attachment.name, format!("Invalid base64 data: {}", e)))?;

    Ok(FetchedImage {
        bytes,
        name: attachment.name.clone(),
        mime: Some(mime.to_string()),
    })
}
