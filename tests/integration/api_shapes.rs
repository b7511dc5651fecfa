//! Tests for the wire-format decoding the HTTP layer performs before
//! handing work to the store and pipeline.

use automuse::server::decode_data_url;
use serde_json::json;

use crate::common::fixtures::{black_pixel, data_url};

#[test]
fn test_canvas_data_url_decodes_to_original_png() {
    let png = black_pixel();
    let url = data_url(&png);
    assert_eq!(decode_data_url(&url).unwrap(), png);
}

#[test]
fn test_save_request_wire_shape() {
    let req: automuse::server::SaveRequest = serde_json::from_value(json!({
        "parentId": null,
        "image": data_url(&black_pixel()),
        "config": { "palette": ["#102030", "#aabbcc"], "density": 0.8 }
    }))
    .unwrap();

    assert_eq!(req.parent_id, None);
    assert_eq!(req.config["density"], json!(0.8));
    decode_data_url(&req.image).unwrap();
}

#[test]
fn test_render_request_defaults() {
    let req: automuse::server::RenderRequest = serde_json::from_value(json!({
        "frames": [data_url(&black_pixel())],
        "id": "v1",
        "format": "gif"
    }))
    .unwrap();

    assert_eq!(req.fps, None);
    assert_eq!(req.frames.len(), 1);
}

#[test]
fn test_truncated_payload_is_a_decode_error() {
    let err = decode_data_url("data:image/png;base64,").unwrap_err();
    assert_eq!(err.kind(), "decode_error");

    let err = decode_data_url("data:image/png;base64,@@@").unwrap_err();
    assert_eq!(err.kind(), "decode_error");
}
