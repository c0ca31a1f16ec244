//! Saving renderings and the room analysis to disk.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::DesignError;
use crate::params::format_extension;
use crate::ports::GeneratedImage;

/// Name a rendering after the uploaded image: `<stem>-redesign-<unix-ts>.<ext>`.
#[must_use]
pub fn auto_filename(image_stem: &str, format: &str) -> String {
    let stem = sanitize_for_filename(image_stem, 40);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    format!("{stem}-redesign-{timestamp}.{}", format_extension(format))
}

/// Lowercase kebab-case, at most `max_len` bytes, `room` when nothing survives.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut pending_hyphen = false;

    for ch in input.chars() {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !result.is_empty() {
                result.push('-');
            }
            pending_hyphen = false;
            result.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if result.is_empty() {
        "room".to_string()
    } else {
        result
    }
}

/// Resolve the output path: use explicit path or auto-generate.
#[must_use]
pub fn resolve_output_path(explicit: Option<&Path>, image_stem: &str, format: &str) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(auto_filename(image_stem, format)), Path::to_path_buf)
}

/// Save a rendering, converting it when its MIME type differs from `target_format`.
///
/// # Errors
///
/// Returns an error if the file cannot be written or conversion fails.
pub fn save_image(
    image: &GeneratedImage,
    target_format: &str,
    output_path: &Path,
) -> Result<(), DesignError> {
    if mime_matches_format(&image.mime_type, target_format) {
        std::fs::write(output_path, &image.data).map_err(DesignError::Io)
    } else {
        convert_and_save(&image.data, target_format, output_path)
    }
}

/// Write the room analysis text for later use.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_analysis(text: &str, output_path: &Path) -> Result<(), DesignError> {
    let mut contents = text.to_string();
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    std::fs::write(output_path, contents).map_err(DesignError::Io)
}

fn mime_matches_format(mime: &str, format: &str) -> bool {
    matches!((mime, format), ("image/jpeg", "jpeg") | ("image/png", "png") | ("image/webp", "webp"))
}

fn convert_and_save(data: &[u8], target_format: &str, output_path: &Path) -> Result<(), DesignError> {
    let img = image::load_from_memory(data)
        .map_err(|e| DesignError::ImageConversion(format!("Failed to decode image: {e}")))?;

    let image_format = match target_format {
        "jpeg" => image::ImageFormat::Jpeg,
        "png" => image::ImageFormat::Png,
        "webp" => image::ImageFormat::WebP,
        other => {
            return Err(DesignError::ImageConversion(format!("Unsupported format: {other}")));
        }
    };

    img.save_with_format(output_path, image_format).map_err(|e| {
        DesignError::ImageConversion(format!("Failed to save as {target_format}: {e}"))
    })
}
