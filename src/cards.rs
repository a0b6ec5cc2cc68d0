//! Card and message-content types exchanged with the plugin host.
//!
//! The host hands the server a user message as a list of content items and
//! expects results back as a set of display cards. Field names follow the
//! host's wire format, so `type` is renamed on both shapes.

use serde::{Deserialize, Serialize};

/// Content item type marker for attached image files.
pub const IMAGE_FILE_TYPE: &str = "tm_image_file";

/// Card type marker for image cards.
pub const IMAGE_CARD_TYPE: &str = "image";

/// Data URI prefix for the PNG payloads this server produces.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// One item of a user message's content.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentItem {
    /// Item type marker, e.g. `tm_image_file` for attached images
    #[serde(rename = "type")]
    pub item_type: String,
    /// Synced copy of the file, when the host has uploaded it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncInfo>,
    /// File metadata supplied by the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FileMetadata>,
}

/// Synced-file details of a content item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncInfo {
    /// URL of the synced copy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// File metadata of a content item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileMetadata {
    /// Original file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Inline copy of the file as a data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

impl ContentItem {
    /// Create an attached-image content item from a URL and optional name.
    pub fn image_file(url: impl Into<String>, name: Option<String>) -> Self {
        Self {
            item_type: IMAGE_FILE_TYPE.to_string(),
            sync: Some(SyncInfo {
                url: Some(url.into()),
            }),
            metadata: Some(FileMetadata { name, base64: None }),
        }
    }

    /// Whether this item is an attached image file.
    pub fn is_image_file(&self) -> bool {
        self.item_type == IMAGE_FILE_TYPE
    }
}

/// A display card returned to the host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Card {
    /// Card type marker, `image` for image cards
    #[serde(rename = "type")]
    pub card_type: String,
    /// Image payload of the card
    pub image: ImagePayload,
}

/// Image payload of a card.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagePayload {
    /// Image URL, a data URI for generated images
    pub url: String,
    /// Alt text for the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Whether the host should sync the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<bool>,
}

impl Card {
    /// Create an image card with the given URL and alt text.
    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            card_type: IMAGE_CARD_TYPE.to_string(),
            image: ImagePayload {
                url: url.into(),
                alt: Some(alt.into()),
                sync: Some(true),
            },
        }
    }

    /// Whether this card carries an image.
    pub fn is_image(&self) -> bool {
        self.card_type == IMAGE_CARD_TYPE
    }
}

impl ImagePayload {
    /// Split the URL into (MIME type, base64 payload) if it is a data URI.
    pub fn data_uri_parts(&self) -> Option<(&str, &str)> {
        split_data_uri(&self.url)
    }
}

/// The set of cards produced by one call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CardSet {
    /// Cards in display order
    pub cards: Vec<Card>,
}

/// Wrap a base64 PNG payload as a data URI, leaving the payload untouched.
pub fn png_data_uri(b64: &str) -> String {
    format!("{}{}", PNG_DATA_URI_PREFIX, b64)
}

/// Split a base64 data URI into (MIME type, payload).
///
/// Returns `None` for anything that is not a `data:<mime>;base64,<payload>` URI.
pub fn split_data_uri(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    rest.split_once(";base64,")
}

/// Derive alt text from a prompt by removing literal `[]` sequences.
pub fn alt_text(prompt: &str) -> String {
    prompt.replace("[]", "")
}
