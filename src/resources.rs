//! MCP Resources for the image card server.
//!
//! This module provides resource implementations for:
//! - `image://options` - List the generation settings the server accepts

use serde::Serialize;

use crate::config::{VALID_BACKGROUNDS, VALID_QUALITIES, VALID_RESOLUTIONS};
use crate::handler::{IMAGE_MODEL, OUTPUT_FORMAT};

/// Generation settings accepted by the server.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOptions {
    /// Model identifier
    pub model: &'static str,
    /// Encoding of returned images
    pub output_format: &'static str,
    /// Accepted quality settings
    pub qualities: Vec<&'static str>,
    /// Accepted resolution settings
    pub resolutions: Vec<&'static str>,
    /// Accepted background settings
    pub backgrounds: Vec<&'static str>,
}

/// Describe the settings this server accepts.
pub fn generation_options() -> GenerationOptions {
    GenerationOptions {
        model: IMAGE_MODEL,
        output_format: OUTPUT_FORMAT,
        qualities: VALID_QUALITIES.to_vec(),
        resolutions: VALID_RESOLUTIONS.to_vec(),
        backgrounds: VALID_BACKGROUNDS.to_vec(),
    }
}

/// Get the options resource as JSON string.
pub fn options_resource_json() -> String {
    serde_json::to_string_pretty(&generation_options()).unwrap_or_else(|_| "{}".to_string())
}
