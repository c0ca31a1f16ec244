//! Generation service port for the hosted multimodal API.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::encoding::EncodedImage;
use crate::error::DesignError;
use crate::session::{Citation, Message};

/// A rendered image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Raw image bytes (decoded from base64).
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the image (e.g., `"image/jpeg"`).
    pub mime_type: String,
}

impl GeneratedImage {
    /// Display reference as a `data:` URI.
    #[must_use]
    pub fn data_uri(&self) -> String {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{encoded}", self.mime_type)
    }
}

/// The design assistant's answer to a chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignReply {
    /// Reply text.
    pub text: String,
    /// Grounding references; empty when the service sent none.
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Boxed future returned by every [`GenerationService`] method.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DesignError>> + Send + 'a>>;

/// The four round trips the controller makes to the hosted API.
///
/// Implementations are stateless per call; the transcript and image are
/// passed in full every time.
pub trait GenerationService: Send + Sync {
    /// Describe the interior design of the room in `image`.
    fn analyze_image(&self, image: &EncodedImage) -> ServiceFuture<'_, String>;

    /// Answer the latest user turn, grounded on web search.
    fn continue_conversation(
        &self,
        transcript: &[Message],
        image: &EncodedImage,
    ) -> ServiceFuture<'_, DesignReply>;

    /// Turn the conversation into a single-paragraph image prompt.
    fn synthesize_prompt(
        &self,
        transcript: &[Message],
        image: &EncodedImage,
    ) -> ServiceFuture<'_, String>;

    /// Render exactly one image for `prompt`.
    ///
    /// Returns [`DesignError::EmptyResult`] if the call succeeds without images.
    fn generate_image(&self, prompt: &str) -> ServiceFuture<'_, GeneratedImage>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
