//! Image card generation for the MCP image card server.
//!
//! This module provides the `ImageCardHandler` struct that turns a prompt and
//! optional image attachments into a display card using the OpenAI Images API.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::attachments::{self, FetchedImage, ImageAttachment};
use crate::cards::{self, Card, CardSet, ContentItem};
use crate::config::Config;
use crate::error::{ConfigError, Error, Result};

/// Model used for all generation and edit requests.
pub const IMAGE_MODEL: &str = "gpt-image-1";

/// Image encoding requested from the API.
pub const OUTPUT_FORMAT: &str = "png";

/// Number of images requested per call.
pub const IMAGE_COUNT: u8 = 1;

/// A request to produce an image card.
#[derive(Debug, Clone, Default)]
pub struct CardRequest {
    /// Text prompt describing the desired image
    pub prompt: String,
    /// Content items of the user message
    pub message_content: Vec<ContentItem>,
    /// Cards of the previous response, consulted when the message has no images
    pub prior_cards: Vec<Card>,
}

/// How a request is sent to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Text-to-image via images/generations
    Create,
    /// Image-to-image via images/edits
    Edit,
}

impl GenerationMode {
    /// Pick the mode from the gathered attachments.
    pub fn select(attachments: &[ImageAttachment]) -> Self {
        if attachments.is_empty() {
            Self::Create
        } else {
            Self::Edit
        }
    }
}

/// Image card handler.
///
/// Sends the prompt and any attachments to the OpenAI Images API and wraps
/// the returned image in a display card.
pub struct ImageCardHandler {
    /// Application configuration.
    pub config: Config,
    /// HTTP client for API requests.
    pub http: reqwest::Client,
}

impl ImageCardHandler {
    /// Create a new handler with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Endpoint for text-to-image generation.
    pub fn generations_endpoint(&self) -> String {
        format!("{}/images/generations", self.config.api_base)
    }

    /// Endpoint for image edits.
    pub fn edits_endpoint(&self) -> String {
        format!("{}/images/edits", self.config.api_base)
    }

    /// Produce an image card for the given request.
    ///
    /// Attached images switch the call from generation to editing. The
    /// resulting card carries the image as a PNG data URI with the prompt
    /// as alt text.
    ///
    /// # Returns
    /// * `Ok(CardSet)` - A single image card
    /// * `Err(Error)` - If the key is missing, settings are invalid, an
    ///   attachment cannot be fetched, or the API call fails
    #[instrument(level = "info", name = "generate_card", skip(self, request), fields(prompt_len = request.prompt.len()))]
    pub async fn generate(&self, request: CardRequest) -> Result<CardSet> {
        // An unset key fails here so no request goes out with an empty bearer token.
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::missing_env_var("OPENAI_API_KEY"))?;

        // Validate settings
        self.config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            Error::validation(messages.join("; "))
        })?;

        // Resolve attachments and pick the mode
        let attachments = attachments::gather(&request.message_content, &request.prior_cards);
        let mode = GenerationMode::select(&attachments);

        info!(?mode, attachments = attachments.len(), "Dispatching image request");

        let b64 = match mode {
            GenerationMode::Create => self.create_image(api_key, &request.prompt).await?,
            GenerationMode::Edit => {
                self.edit_image(api_key, &request.prompt, &attachments).await?
            }
        };

        Ok(CardSet {
            cards: vec![Card::image(
                cards::png_data_uri(&b64),
                cards::alt_text(&request.prompt),
            )],
        })
    }

    /// Text-to-image call against the generations endpoint.
    async fn create_image(&self, api_key: &str, prompt: &str) -> Result<String> {
        let endpoint = self.generations_endpoint();
        debug!(endpoint = %endpoint, "Calling image generation API");

        // Build the API request
        let request = CreateImageRequest {
            model: IMAGE_MODEL.to_string(),
            prompt: prompt.to_string(),
            n: IMAGE_COUNT,
            size: self.config.resolution.clone(),
            quality: self.config.quality.clone(),
            output_format: OUTPUT_FORMAT.to_string(),
            background: self.config.background.clone(),
        };

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::api(&endpoint, 0, format!("Request failed: {}", e)))?;

        self.extract_first_image(&endpoint, response).await
    }

    /// Image-to-image call against the edits endpoint.
    ///
    /// All attachments are fetched before anything is sent, so one broken
    /// source fails the whole request.
    async fn edit_image(
        &self,
        api_key: &str,
        prompt: &str,
        attachments: &[ImageAttachment],
    ) -> Result<String> {
        let images = attachments::fetch_all(&self.http, attachments).await?;

        let endpoint = self.edits_endpoint();
        debug!(endpoint = %endpoint, images = images.len(), "Calling image edit API");

        // Build the multipart request
        let mut form = Form::new()
            .text("model", IMAGE_MODEL.to_string())
            .text("prompt", prompt.to_string())
            .text("n", IMAGE_COUNT.to_string())
            .text("size", self.config.resolution.clone())
            .text("quality", self.config.quality.clone())
            .text("output_format", OUTPUT_FORMAT.to_string())
            .text("background", self.config.background.clone());

        for image in images {
            form = form.part("image[]", image_part(image)?);
        }

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::api(&endpoint, 0, format!("Request failed: {}", e)))?;

        self.extract_first_image(&endpoint, response).await
    }

    /// Check the response status and pull out the first base64 image.
    async fn extract_first_image(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<String> {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::InvalidApiKey);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(endpoint, status.as_u16(), body));
        }

        // Parse response
        let api_response: ImagesResponse = response.json().await.map_err(|e| {
            Error::api(
                endpoint,
                status.as_u16(),
                format!("Failed to parse response: {}", e),
            )
        })?;

        api_response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| Error::api(endpoint, 200, "No image returned from API"))
    }
}

/// Build a multipart file part from a fetched attachment.
fn image_part(image: FetchedImage) -> Result<Part> {
    let FetchedImage { bytes, name, mime } = image;

    let mut part = Part::bytes(bytes).file_name(name.clone());
    if let Some(mime) = mime {
        part = part.mime_str(&mime).map_err(|e| {
            Error::attachment(&name, format!("Invalid MIME type '{}': {}", mime, e))
        })?;
    }

    Ok(part)
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// Images API generation request.
#[derive(Debug, Serialize)]
pub struct CreateImageRequest {
    /// Model identifier
    pub model: String,
    /// Text prompt describing the image
    pub prompt: String,
    /// Number of images to generate
    pub n: u8,
    /// Output resolution
    pub size: String,
    /// Rendering quality
    pub quality: String,
    /// Encoding of the returned image
    pub output_format: String,
    /// Background handling
    pub background: String,
}

/// Images API response.
#[derive(Debug, Deserialize)]
pub struct ImagesResponse {
    /// Generated images
    pub data: Vec<ImageData>,
}

/// One generated image in an API response.
#[derive(Debug, Deserialize)]
pub struct ImageData {
    /// Base64-encoded image payload
    pub b64_json: Option<String>,
}
