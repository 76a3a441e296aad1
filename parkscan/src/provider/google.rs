//! Google Static Maps satellite imagery provider.
//!
//! Uses the Maps Static API with proper authentication via API key. Requires
//! users to have their own Google Cloud Platform account with the Maps
//! Static API enabled.
//!
//! # API Endpoint
//!
//! `https://maps.googleapis.com/maps/api/staticmap?center={lat},{lon}&zoom={z}&size={w}x{h}&maptype=satellite&key={API_KEY}`
//!
//! # Coordinate Conventions
//!
//! Google takes the image center as `lat,lon` (latitude first, the opposite
//! of Azure) and caps the free-tier image size at 640x640, which matches the
//! default tile target.

use crate::coord::GeoPoint;
use crate::http::AsyncHttpClient;
use crate::provider::{ImageryProvider, ProviderError};

/// Base URL for the Maps Static API.
const GOOGLE_BASE_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Minimum zoom level supported by the Static API.
const MIN_ZOOM: u8 = 0;

/// Maximum zoom level with satellite coverage in most areas.
const MAX_ZOOM: u8 = 21;

/// Google Static Maps satellite imagery provider.
///
/// Requires a valid Google Maps Platform API key with the Maps Static API
/// enabled. Google Maps Platform is a paid service; check current pricing at
/// <https://cloud.google.com/maps-platform/pricing>.
pub struct GoogleStaticProvider<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
}

impl<C: AsyncHttpClient> GoogleStaticProvider<C> {
    /// Creates a new Google Static Maps provider with the given API key.
    pub fn new(http_client: C, api_key: String) -> Self {
        Self {
            http_client,
            api_key,
        }
    }

    /// Builds the static map URL for the given center and size.
    ///
    /// Google expects `center` as `lat,lon` (latitude first).
    fn build_url(&self, center: GeoPoint, zoom: u8, width: u32, height: u32) -> String {
        format!(
            "{}?center={},{}&zoom={}&size={}x{}&maptype=satellite&key={}",
            GOOGLE_BASE_URL, center.lat, center.lon, zoom, width, height, self.api_key
        )
    }
}

impl<C: AsyncHttpClient> ImageryProvider for GoogleStaticProvider<C> {
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
        "Google Static Maps"
    }

    fn min_zoom(&self) -> u8 {
        MIN_ZOOM
    }

    fn max_zoom(&self) -> u8 {
        MAX_ZOOM
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockAsyncHttpClient;

    fn provider_with(response: Vec<u8>) -> GoogleStaticProvider<MockAsyncHttpClient> {
        GoogleStaticProvider::new(
            MockAsyncHttpClient {
                response: Ok(response),
            },
            "test_api_key".to_string(),
        )
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider_with(vec![]).name(), "Google Static Maps");
    }

    #[test]
    fn test_zoom_range() {
        let provider = provider_with(vec![]);
        assert_eq!(provider.min_zoom(), 0);
        assert_eq!(provider.max_zoom(), 21);
        assert!(provider.supports_zoom(18));
        assert!(!provider.supports_zoom(22));
    }

    #[test]
    fn test_url_construction() {
        let provider = provider_with(vec![]);

        let url = provider.build_url(GeoPoint::new(47.015, -122.19), 18, 640, 640);
        assert_eq!(
            url,
            "https://maps.googleapis.com/maps/api/staticmap?center=47.015,-122.19&zoom=18&size=640x640&maptype=satellite&key=test_api_key"
        );
    }

    #[test]
    fn test_center_is_lat_lon_order() {
        let provider = provider_with(vec![]);
        let url = provider.build_url(GeoPoint::new(47.5, -122.5), 15, 512, 256);
        assert!(url.contains("center=47.5,-122.5"));
        assert!(url.contains("size=512x256"));
    }

    #[test]
    fn test_api_key_included_in_url() {
        let provider = provider_with(vec![]);
        let url = provider.build_url(GeoPoint::new(10.0, 20.0), 5, 100, 100);
        assert!(url.contains("key=test_api_key"));
    }

    #[tokio::test]
    async fn test_fetch_image_success() {
        let provider = provider_with(vec![1, 2, 3, 4]);
        let result = provider
            .fetch_image(GeoPoint::new(47.0, -122.0), 18, 640, 640)
            .await;
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_fetch_image_unsupported_zoom() {
        let provider = provider_with(vec![]);
        let result = provider
            .fetch_image(GeoPoint::new(47.0, -122.0), 22, 640, 640)
            .await;
        assert!(matches!(result, Err(ProviderError::UnsupportedZoom(22))));
    }
}
