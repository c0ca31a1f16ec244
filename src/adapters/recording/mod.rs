//! Recording adapters that capture interactions to cassettes.

pub mod generation_service;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::cassette::recorder::CassetteRecorder;
use crate::encoding::EncodedImage;
use crate::error::DesignError;

/// Record a `Result<T, DesignError>` interaction using the Ok/Err convention.
///
/// Errors keep their category so they replay as the same variant.
pub(crate) fn record_result<T: Serialize>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: serde_json::Value,
    result: &Result<T, DesignError>,
) {
    let output = match result {
        Ok(v) => match serde_json::to_value(v) {
            Ok(inner) => json!({ "Ok": inner }),
            Err(e) => {
                warn!(port, method, "Skipping unserializable recording: {e}");
                return;
            }
        },
        Err(e) => json!({ "Err": { "kind": e.category(), "message": e.to_string() } }),
    };

    match recorder.lock() {
        Ok(mut guard) => guard.record(port, method, input, output),
        Err(e) => warn!(port, method, "Recorder lock poisoned: {e}"),
    }
}

/// Cassette summary of an inline image; the payload itself is not stored.
pub(crate) fn image_summary(image: &EncodedImage) -> serde_json::Value {
    json!({ "mime_type": image.mime_type, "base64_len": image.data.len() })
}
