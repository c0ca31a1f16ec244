//! Model name resolution and image backend detection.

/// Default model for room analysis and the design conversation.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";
/// Default model for turning a conversation into an image prompt.
pub const DEFAULT_PROMPT_MODEL: &str = "gemini-2.5-pro";
/// Default model for rendering the redesigned room.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// How an image model is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBackend {
    /// Imagen models, served through `:predict`.
    Imagen,
    /// Gemini models with native image output, served through `:generateContent`.
    GeminiNative,
}

/// Short name aliases for the models roomcraft uses.
const ALIASES: &[(&str, &str)] = &[
    ("flash", DEFAULT_CHAT_MODEL),
    ("pro", DEFAULT_PROMPT_MODEL),
    ("imagen-4", DEFAULT_IMAGE_MODEL),
    ("imagen-4-ultra", "imagen-4.0-ultra-generate-001"),
    ("imagen-4-fast", "imagen-4.0-fast-generate-001"),
    ("nano-banana", "gemini-2.5-flash-image"),
];

/// Resolve a model name (alias or exact) to the full model identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    ALIASES
        .iter()
        .find(|&&(alias, _)| alias == name)
        .map_or_else(|| name.to_string(), |&(_, full)| full.to_string())
}

/// Detect how to call a resolved image model.
///
/// # Errors
///
/// Returns an error if the model name doesn't match a known image backend.
pub fn detect_image_backend(model: &str) -> Result<ImageBackend, String> {
    if model.starts_with("imagen") {
        Ok(ImageBackend::Imagen)
    } else if model.starts_with("gemini") {
        Ok(ImageBackend::GeminiNative)
    } else {
        Err(format!(
            "Unknown image backend for model '{model}'. Expected 'imagen-*' or 'gemini-*'."
        ))
    }
}

/// The three models used across one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSet {
    /// Fast multimodal model for analysis and chat.
    pub chat: String,
    /// Higher-capability model for prompt synthesis.
    pub prompt: String,
    /// Image model for rendering.
    pub image: String,
}

impl ModelSet {
    /// Resolve aliases for all three models.
    #[must_use]
    pub fn resolve(chat: &str, prompt: &str, image: &str) -> Self {
        Self { chat: resolve_model(chat), prompt: resolve_model(prompt), image: resolve_model(image) }
    }
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            chat: DEFAULT_CHAT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT_MODEL.to_string(),
            image: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}
