//! Centralized provider creation.
//!
//! [`ProviderConfig`] describes which imagery provider to use and carries its
//! credentials; [`ProviderFactory`] turns a config into a ready-to-use
//! [`AnyProvider`]. Keeping construction in one place means CLI code and the
//! capture session never match on provider variants themselves.

use crate::http::AsyncHttpClient;
use crate::provider::{
    AzureMapsProvider, GoogleStaticProvider, ImageryProvider, ProviderError,
};
use crate::coord::GeoPoint;

/// Configuration for imagery provider selection.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    /// Azure Maps Render service (subscription key).
    Azure {
        /// Azure Maps subscription key.
        subscription_key: String,
    },
    /// Google Maps Static API (API key).
    Google {
        /// Google Maps Platform API key.
        api_key: String,
    },
}

impl ProviderConfig {
    /// Creates an Azure Maps provider config.
    pub fn azure(subscription_key: impl Into<String>) -> Self {
        Self::Azure {
            subscription_key: subscription_key.into(),
        }
    }

    /// Creates a Google Static Maps provider config.
    pub fn google(api_key: impl Into<String>) -> Self {
        Self::Google {
            api_key: api_key.into(),
        }
    }

    /// Returns the display name of the configured provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Azure { .. } => "Azure Maps",
            Self::Google { .. } => "Google Static Maps",
        }
    }
}

/// A provider of any configured kind, dispatching to the concrete
/// implementation.
pub enum AnyProvider<C: AsyncHttpClient> {
    /// Azure Maps static imagery.
    Azure(AzureMapsProvider<C>),
    /// Google Static Maps imagery.
    Google(GoogleStaticProvider<C>),
}

impl<C: AsyncHttpClient> ImageryProvider for AnyProvider<C> {
    async fn fetch_image(
        &self,
        center: GeoPoint,
        zoom: u8,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ProviderError> {
        match self {
            Self::Azure(p) => p.fetch_image(center, zoom, width, height).await,
            Self::Google(p) => p.fetch_image(center, zoom, width, height).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Azure(p) => p.name(),
            Self::Google(p) => p.name(),
        }
    }

    fn min_zoom(&self) -> u8 {
        match self {
            Self::Azure(p) => p.min_zoom(),
            Self::Google(p) => p.min_zoom(),
        }
    }

    fn max_zoom(&self) -> u8 {
        match self {
            Self::Azure(p) => p.max_zoom(),
            Self::Google(p) => p.max_zoom(),
        }
    }
}

/// Factory for creating imagery providers from configuration.
pub struct ProviderFactory<C: AsyncHttpClient> {
    http_client: C,
}

impl<C: AsyncHttpClient> ProviderFactory<C> {
    /// Creates a factory that will hand its HTTP client to the provider.
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    /// Creates the provider described by `config`, consuming the factory.
    pub fn create(self, config: &ProviderConfig) -> AnyProvider<C> {
        match config {
            ProviderConfig::Azure { subscription_key } => AnyProvider::Azure(
                AzureMapsProvider::new(self.http_client, subscription_key.clone()),
            ),
            ProviderConfig::Google { api_key } => AnyProvider::Google(
                GoogleStaticProvider::new(self.http_client, api_key.clone()),
            ),
        }
    }
}
