//! AImage Creator - embeds AI-generated images into documents
//!
//! Derives a prompt from a document (or asks for one), requests a batch of
//! images from the OpenAI Images API, lets the user pick one (or ask for
//! another batch), stores the pick with the host, and inserts a markdown
//! reference to it.

pub mod ai;
pub mod app;
pub mod cdn;
pub mod error;
pub mod host;
pub mod image;
pub mod models;
pub mod prompts;
pub mod selection;
pub mod settings;

pub use error::{Error, Result};
