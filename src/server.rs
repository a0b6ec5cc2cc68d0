//! MCP Server implementation for the image card server.
//!
//! This module provides the MCP server handler that exposes:
//! - `image_generate` tool for creating images and editing attached ones
//! - `image://options` resource describing the accepted settings

use crate::cards::{CardSet, ContentItem};
use crate::config::Config;
use crate::handler::{CardRequest, ImageCardHandler};
use crate::resources;
use rmcp::{
    model::{
        CallToolResult, Content, ListResourcesResult, ReadResourceResult, ResourceContents,
        ServerCapabilities, ServerInfo,
    },
    ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// MCP Server for image card generation.
#[derive(Clone)]
pub struct ImageCardServer {
    /// Handler for image card operations
    handler: Arc<ImageCardHandler>,
    /// Cards of the most recent successful call
    last_cards: Arc<RwLock<Option<CardSet>>>,
}

/// Tool parameters wrapper for image_generate.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImageGenerateToolParams {
    /// Text prompt describing the image to generate or the edit to apply
    pub prompt: String,
    /// Images to edit; omit to generate from the prompt alone
    #[serde(default)]
    pub images: Option<Vec<ImageInput>>,
}

/// One input image for an edit request.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImageInput {
    /// Image source, a URL or a base64 data URI
    pub url: String,
    /// File name to report upstream
    #[serde(default)]
    pub name: Option<String>,
}

impl From<ImageGenerateToolParams> for CardRequest {
    fn from(params: ImageGenerateToolParams) -> Self {
        let message_content = params
            .images
            .unwrap_or_default()
            .into_iter()
            .map(|image| ContentItem::image_file(image.url, image.name))
            .collect();

        Self {
            prompt: params.prompt,
            message_content,
            prior_cards: Vec::new(),
        }
    }
}

impl ImageCardServer {
    /// Create a new ImageCardServer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            handler: Arc::new(ImageCardHandler::new(config)),
            last_cards: Arc::new(RwLock::new(None)),
        }
    }

    /// Generate or edit an image and return it as card content.
    pub async fn generate_image(
        &self,
        params: ImageGenerateToolParams,
    ) -> Result<CallToolResult, McpError> {
        info!(prompt = %params.prompt, "Generating image card");

        let mut request: CardRequest = params.into();

        // A call without images can still edit: the cards of the previous
        // response stand in as attachments.
        if request.message_content.is_empty() {
            if let Some(last) = self.last_cards.read().await.as_ref() {
                request.prior_cards = last.cards.clone();
            }
        }

        let result = self.handler.generate(request).await.map_err(|e| {
            McpError::internal_error(format!("Image generation failed: {}", e), None)
        })?;

        *self.last_cards.write().await = Some(result.clone());

        let content = card_content(&result)?;
        Ok(CallToolResult::success(content))
    }
}

/// Convert a card set to MCP image content.
fn card_content(result: &CardSet) -> Result<Vec<Content>, McpError> {
    result
        .cards
        .iter()
        .map(|card| {
            let (mime, data) = card
                .image
                .data_uri_parts()
                .ok_or_else(|| McpError::internal_error("Card image is not a data URI", None))?;
            Ok(Content::image(data.to_string(), mime.to_string()))
        })
        .collect()
}

impl ServerHandler for ImageCardServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Image card server backed by the OpenAI Images API. \
                 Use image_generate to create an image from a text prompt, \
                 or pass images to edit them instead. Quality, resolution, \
                 and background are set through environment variables."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_
    {
        async move {
            use rmcp::model::{ListToolsResult, Tool};
            use schemars::schema_for;

            // image_generate tool
            let gen_schema = schema_for!(ImageGenerateToolParams);
            let gen_schema_value = serde_json::to_value(&gen_schema).unwrap_or_default();
            let gen_input_schema = match gen_schema_value {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

            Ok(ListToolsResult {
                tools: vec![Tool {
                    name: Cow::Borrowed("image_generate"),
                    description: Some(Cow::Borrowed(
                        "Generate an image from a text prompt using the OpenAI Images API, \
                         or edit the given images when any are passed. \
                         Returns the result as a base64-encoded PNG image card.",
                    )),
                    input_schema: gen_input_schema,
                    annotations: None,
                    icons: None,
                    meta: None,
                    output_schema: None,
                    title: None,
                }],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            match params.name.as_ref() {
                "image_generate" => {
                    let tool_params: ImageGenerateToolParams = params
                        .arguments
                        .map(|args| serde_json::from_value(serde_json::Value::Object(args)))
                        .transpose()
                        .map_err(|e| {
                            McpError::invalid_params(format!("Invalid parameters: {}", e), None)
                        })?
                        .ok_or_else(|| McpError::invalid_params("Missing parameters", None))?;

                    self.generate_image(tool_params).await
                }
                _ => Err(McpError::invalid_params(
                    format!("Unknown tool: {}", params.name),
                    None,
                )),
            }
        }
    }

    fn list_resources(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            debug!("Listing resources");

            let options_resource = rmcp::model::Resource {
                raw: rmcp::model::RawResource {
                    uri: "image://options".to_string(),
                    name: "Generation Options".to_string(),
                    title: None,
                    description: Some(
                        "Model, output format, and accepted quality, resolution, and background settings"
                            .to_string(),
                    ),
                    mime_type: Some("application/json".to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                },
                annotations: None,
            };

            Ok(ListResourcesResult {
                resources: vec![options_resource],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        params: rmcp::model::ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            let uri = &params.uri;
            debug!(uri = %uri, "Reading resource");

            let content = match uri.as_str() {
                "image://options" => resources::options_resource_json(),
                _ => {
                    return Err(McpError::resource_not_found(
                        format!("Unknown resource: {}", uri),
                        None,
                    ));
                }
            };

            Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(content, uri.clone())],
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Card;

    fn test_config() -> Config {
        Config {
            api_key: Some("sk-test".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_server_info() {
        let server = ImageCardServer::new(test_config());
        let info = server.get_info();
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_tool_params_conversion() {
        let tool_params = ImageGenerateToolParams {
            prompt: "add a hat".to_string(),
            images: Some(vec![ImageInput {
                url: "https://files.example.com/cat.png".to_string(),
                name: Some("cat.png".to_string()),
            }]),
        };

        let request: CardRequest = tool_params.into();
        assert_eq!(request.prompt, "add a hat");
        assert_eq!(request.message_content.len(), 1);
        assert!(request.message_content[0].is_image_file());
        assert!(request.prior_cards.is_empty());
    }

    #[test]
    fn test_tool_params_without_images() {
        let tool_params = ImageGenerateToolParams {
            prompt: "a red circle".to_string(),
            images: None,
        };

        let request: CardRequest = tool_params.into();
        assert_eq!(request.prompt, "a red circle");
        assert!(request.message_content.is_empty());
    }

    #[test]
    fn test_card_content() {
        let result = CardSet {
            cards: vec![Card::image("data:image/png;base64,aGVsbG8=", "alt")],
        };

        let content = card_content(&result).unwrap();
        assert_eq!(content.len(), 1);
    }

    #[test]
    fn test_card_content_rejects_plain_urls() {
        let result = CardSet {
            cards: vec![Card::image("https://example.com/a.png", "alt")],
        };

        assert!(card_content(&result).is_err());
    }
}
