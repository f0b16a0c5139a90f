//! CDN-backed attachment storage
//!
//! Stores chosen images in an S3-compatible bucket (e.g. DigitalOcean Spaces)
//! and references them by public URL.

pub mod client;

pub use client::{CdnClient, CdnConfig};
