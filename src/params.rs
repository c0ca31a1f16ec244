//! Validation of render and output parameters.

use crate::model::ImageBackend;

/// Aspect ratio used when the config does not name one.
pub const DEFAULT_ASPECT_RATIO: &str = "4:3";

/// Validate that an aspect ratio is supported by the given image backend.
///
/// # Errors
///
/// Returns an error if the ratio is not recognized.
pub fn validate_aspect_ratio(ratio: &str, backend: ImageBackend) -> Result<(), String> {
    let valid_imagen = ["1:1", "3:4", "4:3", "9:16", "16:9"];
    let valid_gemini = ["1:1", "2:3", "3:2", "3:4", "4:3", "4:5", "5:4", "9:16", "16:9", "21:9"];

    let valid = match backend {
        ImageBackend::Imagen => &valid_imagen[..],
        ImageBackend::GeminiNative => &valid_gemini[..],
    };

    if valid.contains(&ratio) {
        Ok(())
    } else {
        Err(format!("Unsupported aspect ratio '{ratio}' for {backend:?}. Valid: {valid:?}"))
    }
}

/// Validate the output format parameter.
///
/// # Errors
///
/// Returns an error if the format is not recognized.
pub fn validate_format(format: &str) -> Result<(), String> {
    match format {
        "jpeg" | "png" | "webp" => Ok(()),
        _ => Err(format!("Unsupported format '{format}'. Valid: jpeg, png, webp")),
    }
}

/// Get the file extension for an output format.
#[must_use]
pub fn format_extension(format: &str) -> &'static str {
    match format {
        "png" => "png",
        "webp" => "webp",
        _ => "jpg",
    }
}
