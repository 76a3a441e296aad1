//! Satellite imagery provider abstraction.
//!
//! This module provides the trait and implementations for fetching static
//! satellite images by geographic center, zoom, and pixel size. Any
//! static-imagery HTTP API satisfying that contract is interchangeable.
//!
//! # Factory Pattern
//!
//! For centralized provider creation, use the [`ProviderFactory`]:
//!
//! ```ignore
//! use parkscan::http::AsyncReqwestClient;
//! use parkscan::provider::{ProviderConfig, ProviderFactory};
//!
//! let http_client = AsyncReqwestClient::new()?;
//! let factory = ProviderFactory::new(http_client);
//! let provider = factory.create(&ProviderConfig::azure("KEY"));
//! ```

mod azure;
mod factory;
mod google;
mod types;

pub use azure::AzureMapsProvider;
pub use factory::{AnyProvider, ProviderConfig, ProviderFactory};
pub use google::GoogleStaticProvider;
pub use types::{ImageryProvider, ProviderError, TileImage};
