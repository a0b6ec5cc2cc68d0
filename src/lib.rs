//! GPT Image MCP Server Library
//!
//! This library provides image generation and editing as MCP display cards
//! using the OpenAI Images API.

pub mod attachments;
pub mod cards;
pub mod config;
pub mod error;
pub mod handler;
pub mod resources;
pub mod server;
pub mod transport;

#[cfg(test)]
mod attachments_test;

pub use cards::{Card, CardSet};
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use handler::{CardRequest, ImageCardHandler};
pub use server::ImageCardServer;
pub use transport::{ServerError, Transport, TransportArgs, TransportMode, serve};
