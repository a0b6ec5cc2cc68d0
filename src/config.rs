//! Configuration module for loading environment variables and settings.

/// Default base URL for the OpenAI API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Valid quality settings for image generation.
pub const VALID_QUALITIES: &[&str] = &["auto", "high", "medium", "low"];

/// Valid resolution settings, in the API's size format.
pub const VALID_RESOLUTIONS: &[&str] = &["auto", "1024x1024", "1536x1024", "1024x1536"];

/// Valid background settings.
pub const VALID_BACKGROUNDS: &[&str] = &["auto", "transparent", "opaque"];

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key. Absence is reported per request, not at startup,
    /// so the server can come up before the key is configured.
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API
    pub api_base: String,
    /// Image quality setting
    pub quality: String,
    /// Output resolution (the API's `size` parameter)
    pub resolution: String,
    /// Background style
    pub background: String,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// Every setting has a default, so loading never fails; a missing or
    /// empty OPENAI_API_KEY surfaces as a per-request configuration error.
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let api_base =
            std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let quality = std::env::var("IMAGE_QUALITY").unwrap_or_else(|_| "auto".to_string());

        let resolution = std::env::var("IMAGE_RESOLUTION").unwrap_or_else(|_| "auto".to_string());

        let background = std::env::var("IMAGE_BACKGROUND").unwrap_or_else(|_| "auto".to_string());

        Self {
            api_key,
            api_base,
            quality,
            resolution,
            background,
        }
    }

    /// Validate the generation settings against their accepted values.
    ///
    /// # Returns
    /// - `Ok(())` if all settings are valid
    /// - `Err(Vec<ValidationError>)` with all validation errors
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !VALID_QUALITIES.contains(&self.quality.as_str()) {
            errors.push(ValidationError {
                field: "quality".to_string(),
                message: format!(
                    "Invalid quality '{}'. Valid options: {}",
                    self.quality,
                    VALID_QUALITIES.join(", ")
                ),
            });
        }

        if !VALID_RESOLUTIONS.contains(&self.resolution.as_str()) {
            errors.push(ValidationError {
                field: "resolution".to_string(),
                message: format!(
                    "Invalid resolution '{}'. Valid options: {}",
                    self.resolution,
                    VALID_RESOLUTIONS.join(", ")
                ),
            });
        }

        if !VALID_BACKGROUNDS.contains(&self.background.as_str()) {
            errors.push(ValidationError {
                field: "background".to_string(),
                message: format!(
                    "Invalid background '{}'. Valid options: {}",
                    self.background,
                    VALID_BACKGROUNDS.join(", ")
                ),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            quality: "auto".to_string(),
            resolution: "auto".to_string(),
            background: "auto".to_string(),
        }
    }
}

/// Validation error details for generation settings.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The setting that failed validation.
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
