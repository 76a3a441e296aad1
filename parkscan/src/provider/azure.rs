//! Azure Maps static imagery provider.
//!
//! Uses the Azure Maps Render service authenticated with a subscription key.
//! Users need an Azure Maps account with the Render API enabled.
//!
//! # API Endpoint
//!
//! `https://atlas.microsoft.com/map/static?api-version=2024-04-01&tilesetId=microsoft.imagery&center={lon},{lat}&zoom={z}&width={w}&height={h}&subscription-key={KEY}`
//!
//! # Coordinate Conventions
//!
//! Azure Maps takes the image center as `lon,lat` (longitude first) and
//! returns a PNG sized to the requested width/height. Zoom levels 0-20 are
//! accepted for the satellite tileset.

use crate::coord::GeoPoint;
use crate::http::AsyncHttpClient;
use crate::provider::{ImageryProvider, ProviderError};

/// Base URL for the Azure Maps static image endpoint.
const AZURE_BASE_URL: &str = "https://atlas.microsoft.com/map/static";

/// Render API version this provider targets.
const AZURE_API_VERSION: &str = "2024-04-01";

/// Minimum zoom level for the imagery tileset.
const MIN_ZOOM: u8 = 1;

/// Maximum zoom level for the imagery tileset.
const MAX_ZOOM: u8 = 20;

/// Azure Maps satellite imagery provider.
///
/// Requires a valid Azure Maps subscription key.
///
/// # Example
///
/// ```ignore
/// use parkscan::http::AsyncReqwestClient;
/// use parkscan::provider::AzureMapsProvider;
///
/// let client = AsyncReqwestClient::new()?;
/// let provider = AzureMapsProvider::new(client, "YOUR_KEY".to_string());
/// ```
pub struct AzureMapsProvider<C: AsyncHttpClient> {
    http_client: C,
    subscription_key: String,
}

impl<C: AsyncHttpClient> AzureMapsProvider<C> {
    /// Creates a new Azure Maps provider with the given subscription key.
    pub fn new(http_client: C, subscription_key: String) -> Self {
        Self {
            http_client,
            subscription_key,
        }
    }

    /// Builds the static image URL for the given center and size.
    ///
    /// Azure expects `center` as `lon,lat` (longitude first).
    fn build_url(&self, center: GeoPoint, zoom: u8, width: u32, height: u32) -> String {
        format!(
            "{}?api-version={}&tilesetId=microsoft.imagery&center={},{}&zoom={}&width={}&height={}&subscription-key={}",
            AZURE_BASE_URL,
            AZURE_API_VERSION,
            center.lon,
            center.lat,
            zoom,
            width,
            height,
            self.subscription_key
        )
    }
}

impl<C: AsyncHttpClient> ImageryProvider for AzureMapsProvider<C> {
    async fn fetch_image(
        &self,
        center: GeoPoint,
        zoom: u8,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ProviderError> {
        if !self.supports_zoom(zoom) {
            return Err(ProviderError::UnsupportedZoom(zoom));
        }

        let url = self.build_url(center, zoom, width, height);
        Ok(self.http_client.get(&url).await?)
    }

    fn name(&self) -> &str {
        "Azure Maps"
    }

    fn min_zoom(&self) -> u8 {
        MIN_ZOOM
    }

    fn max_zoom(&self) -> u8 {
        MAX_ZOOM
    }
}
