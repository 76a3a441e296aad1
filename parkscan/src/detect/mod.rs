//! Detection service client.
//!
//! Submits one tile's image to the external detection service over HTTP POST
//! and parses the pixel-space results. The service's model is opaque; this
//! module knows only the JSON contract in [`wire`].
//!
//! A detection failure (non-2xx status, timeout, malformed body) is always a
//! per-tile failure: the caller drops that tile and continues with the rest
//! of the run.

mod wire;

pub use wire::{from_data_uri, to_data_uri, DetectRequest, DetectResponse, PixelPoint};

use std::future::Future;

use thiserror::Error;

use crate::http::{AsyncHttpClient, HttpError};
use crate::provider::TileImage;

/// Errors from a detection call, tagged with the tile they belong to.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Transport failure or non-success status from the service.
    #[error("detection request for tile {tile_id} failed: {source}")]
    Http {
        /// Identifier of the tile whose detection failed.
        tile_id: String,
        /// The underlying HTTP failure.
        source: HttpError,
    },

    /// Response body was not valid JSON for the expected contract.
    #[error("malformed detection response for tile {tile_id}: {message}")]
    MalformedResponse {
        /// Identifier of the tile whose detection failed.
        tile_id: String,
        /// Parse failure details.
        message: String,
    },
}

impl DetectError {
    /// The identifier of the tile this error belongs to.
    pub fn tile_id(&self) -> &str {
        match self {
            Self::Http { tile_id, .. } => tile_id,
            Self::MalformedResponse { tile_id, .. } => tile_id,
        }
    }
}

/// Detections for one tile, in that tile's local pixel space.
#[derive(Debug, Clone)]
pub struct TileDetections {
    /// Identifier of the tile the detections belong to.
    pub tile_id: String,
    /// Detected positions, origin top-left of the tile image.
    pub points: Vec<PixelPoint>,
    /// Annotated image echo from the service, as a data URI.
    pub annotated_image: Option<String>,
    /// Incoming image echo from the service, as a data URI.
    pub incoming_image: Option<String>,
}

/// Trait for detection backends.
pub trait Detector: Send + Sync + 'static {
    /// Runs detection on one tile image.
    fn detect(
        &self,
        image: TileImage,
    ) -> impl Future<Output = Result<TileDetections, DetectError>> + Send;
}

/// HTTP detection client POSTing to a configured endpoint.
pub struct HttpDetector<C: AsyncHttpClient> {
    http_client: C,
    endpoint: String,
}

impl<C: AsyncHttpClient> HttpDetector<C> {
    /// Creates a detector targeting `endpoint` (e.g.
    /// `http://127.0.0.1:5000/process-image`).
    pub fn new(http_client: C, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<C: AsyncHttpClient> Detector for HttpDetector<C> {
    async fn detect(&self, image: TileImage) -> Result<TileDetections, DetectError> {
        let tile_id = image.tile_id;
        let request = DetectRequest {
            image: to_data_uri(&image.data),
            subsection_id: tile_id.clone(),
        };

        // DetectRequest is two strings; serialization cannot fail.
        let body = serde_json::to_value(&request).map_err(|e| DetectError::MalformedResponse {
            tile_id: tile_id.clone(),
            message: e.to_string(),
        })?;

        let raw = self
            .http_client
            .post_json(&self.endpoint, &body)
            .await
            .map_err(|source| DetectError::Http {
                tile_id: tile_id.clone(),
                source,
            })?;

        let response: DetectResponse =
            serde_json::from_slice(&raw).map_err(|e| DetectError::MalformedResponse {
                tile_id: tile_id.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            tile_id = %tile_id,
            detections = response.marker_coordinates.len(),
            "detection completed"
        );

        Ok(TileDetections {
            tile_id,
            points: response.marker_coordinates,
            annotated_image: response.annotated_image,
            incoming_image: response.incoming_image,
        })
    }
}
