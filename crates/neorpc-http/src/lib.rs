//! neorpc-http — HTTP protocol client for neorpc services.

pub mod client;

pub use client::{HttpClientConfig, HttpProtocolClient};
