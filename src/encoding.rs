//! Turns an uploaded image into the base64 payload the service expects.

use base64::Engine;

use crate::error::DesignError;
use crate::session::ImageHandle;

/// MIME type sent for every uploaded image, whatever its real format.
pub const UPLOAD_MIME_TYPE: &str = "image/jpeg";

/// A base64-encoded image ready to inline in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Base64 text without any `data:` prefix.
    pub data: String,
    /// MIME type declared to the service.
    pub mime_type: &'static str,
}

/// Read and encode the image behind `handle`.
///
/// # Errors
///
/// Returns [`DesignError::Encoding`] if the file cannot be read, the data URI
/// is malformed, or the bytes are not a recognizable image.
pub async fn encode_image(handle: &ImageHandle) -> Result<EncodedImage, DesignError> {
    let data = match handle {
        ImageHandle::File(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                DesignError::Encoding(format!("Failed to read {}: {e}", path.display()))
            })?;
            ensure_image(&bytes)?;
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        }
        ImageHandle::DataUri(uri) => {
            let payload = strip_data_uri(uri)?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| DesignError::Encoding(format!("Invalid base64 in data URI: {e}")))?;
            ensure_image(&bytes)?;
            payload.to_string()
        }
    };
    Ok(EncodedImage { data, mime_type: UPLOAD_MIME_TYPE })
}

/// Strip a `data:<mime>;base64,` prefix, returning the payload.
///
/// Text without a `data:` prefix is returned unchanged.
///
/// # Errors
///
/// Returns [`DesignError::Encoding`] if a data URI has no `,` separator.
pub fn strip_data_uri(text: &str) -> Result<&str, DesignError> {
    if !text.starts_with("data:") {
        return Ok(text);
    }
    text.split_once(',')
        .map(|(_, payload)| payload)
        .ok_or_else(|| DesignError::Encoding("Data URI has no payload".to_string()))
}

fn ensure_image(bytes: &[u8]) -> Result<(), DesignError> {
    if bytes.is_empty() {
        return Err(DesignError::Encoding("Image is empty".to_string()));
    }
    image::guess_format(bytes)
        .map(|_| ())
        .map_err(|e| DesignError::Encoding(format!("Not a readable image: {e}")))
}
