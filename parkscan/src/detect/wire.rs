//! Wire types for the detection service's JSON contract.
//!
//! The service accepts `{"image": <data URI>, "subsection_id": <tile id>}`
//! and answers with pixel-space marker coordinates plus optional annotated
//! and incoming image echoes. Images travel in both directions framed as
//! `data:image/png;base64,` data URIs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Data URI prefix used for image payloads.
const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Request body for a detection call.
#[derive(Debug, Serialize)]
pub struct DetectRequest {
    /// The tile image as a base64 data URI.
    pub image: String,
    /// The tile identifier, echoed back for correlation.
    pub subsection_id: String,
}

/// A detection position in pixel space.
///
/// Origin is the top-left of the submitted image; x grows rightward, y grows
/// downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal pixel offset from the left edge.
    pub x: f64,
    /// Vertical pixel offset from the top edge.
    pub y: f64,
}

/// Response body from a detection call.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectResponse {
    /// Detected positions within the submitted image. Absent means none.
    #[serde(default)]
    pub marker_coordinates: Vec<PixelPoint>,

    /// The submitted image with detection markers drawn on it, as a data URI.
    #[serde(default)]
    pub annotated_image: Option<String>,

    /// The image as the service received it (post-resize), as a data URI.
    #[serde(default)]
    pub incoming_image: Option<String>,
}

/// Encodes raw image bytes as a PNG data URI.
pub fn to_data_uri(bytes: &[u8]) -> String {
    format!("{}{}", DATA_URI_PREFIX, BASE64.encode(bytes))
}

/// Decodes a data URI back into raw image bytes.
///
/// Accepts any `data:*;base64,` framing: everything before the first comma
/// is treated as the header, matching how the service itself splits the
/// payload.
pub fn from_data_uri(uri: &str) -> Option<Vec<u8>> {
    let encoded = uri.split_once(',').map(|(_, rest)| rest)?;
    BASE64.decode(encoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_roundtrip() {
        let bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x00, 0xFF];
        let uri = to_data_uri(&bytes);

        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(from_data_uri(&uri).unwrap(), bytes);
    }

    #[test]
    fn test_from_data_uri_rejects_missing_comma() {
        assert!(from_data_uri("data:image/png;base64").is_none());
    }

    #[test]
    fn test_from_data_uri_rejects_bad_base64() {
        assert!(from_data_uri("data:image/png;base64,!!!not-base64!!!").is_none());
    }

    #[test]
    fn test_request_serializes_expected_fields() {
        let request = DetectRequest {
            image: "data:image/png;base64,AAAA".to_string(),
            subsection_id: "1-2".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["image"], "data:image/png;base64,AAAA");
        assert_eq!(value["subsection_id"], "1-2");
    }

    #[test]
    fn test_response_parses_full_body() {
        let body = r#"{
            "marker_coordinates": [{"x": 320.0, "y": 320.0}, {"x": 10.5, "y": 20.25}],
            "annotated_image": "data:image/png;base64,QQ==",
            "incoming_image": "data:image/png;base64,Ug=="
        }"#;

        let response: DetectResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.marker_coordinates.len(), 2);
        assert_eq!(response.marker_coordinates[0], PixelPoint { x: 320.0, y: 320.0 });
        assert!(response.annotated_image.is_some());
        assert!(response.incoming_image.is_some());
    }

    #[test]
    fn test_response_parses_minimal_body() {
        // All fields defaulted: an empty object is a valid "no detections"
        // response.
        let response: DetectResponse = serde_json::from_str("{}").unwrap();
        assert!(response.marker_coordinates.is_empty());
        assert!(response.annotated_image.is_none());
        assert!(response.incoming_image.is_none());
    }

    #[test]
    fn test_response_rejects_malformed_coordinates() {
        let body = r#"{"marker_coordinates": [{"x": "not-a-number"}]}"#;
        assert!(serde_json::from_str::<DetectResponse>(body).is_err());
    }
}
