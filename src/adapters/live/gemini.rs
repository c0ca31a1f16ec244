//! Live adapter for the Gemini and Imagen REST APIs.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::encoding::EncodedImage;
use crate::error::DesignError;
use crate::model::{ImageBackend, ModelSet};
use crate::ports::{DesignReply, GeneratedImage, GenerationService, ServiceFuture};
use crate::session::{flatten_transcript, Citation, CitationKind, Message, Sender};

/// Instruction sent alongside the uploaded photo.
const ANALYSIS_INSTRUCTION: &str = "Analyze this room's interior design. Provide a concise, \
bulleted list covering:
- Overall Style (e.g., Modern, Minimalist, Traditional)
- Color Palette
- Key Furniture Pieces
- Lighting
- Potential areas for improvement.
Keep the analysis brief and to the point.";

/// System instruction for the prompt synthesis model.
const PROMPT_SYSTEM_INSTRUCTION: &str = "You are an expert interior designer and a creative \
writer. Your task is to transform a conversation about redesigning a room into a vivid, highly \
detailed, and photorealistic prompt for an advanced AI image generation model. The prompt must be \
a single paragraph.

Key elements to include:
- **Style & Mood:** Clearly define the overall aesthetic (e.g., \"A cozy Scandinavian living \
room,\" \"A sleek, minimalist home office\").
- **Lighting:** Describe the lighting in detail (e.g., \"bathed in warm, afternoon sunlight \
streaming through large windows,\" \"soft, ambient light from a modern floor lamp\").
- **Furniture & Decor:** Be specific about key pieces mentioned in the conversation. Describe \
their materials, colors, and placement (e.g., \"a deep blue velvet sofa,\" \"a rustic oak coffee \
table,\" \"potted fiddle-leaf fig tree in a ceramic pot\").
- **Colors & Textures:** Mention the color palette and textures to create a rich visual (e.g., \
\"walls painted a soft sage green,\" \"a plush wool rug,\" \"smooth marble countertops\").
- **Camera View:** Specify the perspective (e.g., \"wide-angle shot,\" \"view from the \
doorway,\" \"eye-level view\").
- **Photorealistic Details:** Add keywords that enhance realism like \"photorealistic,\" \
\"hyper-detailed,\" \"4K,\" \"interior design photography.\"";

/// MIME type requested for rendered images.
const RENDER_MIME_TYPE: &str = "image/jpeg";

/// Endpoint and model settings for [`GeminiService`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Base URL that `/{model}:{method}` is appended to.
    pub base_url: String,
    /// Models for each stage.
    pub models: ModelSet,
    /// How the image model is called.
    pub image_backend: ImageBackend,
    /// Aspect ratio of rendered images.
    pub aspect_ratio: String,
}

/// Live generation service that calls the Google AI API.
pub struct GeminiService {
    client: Client,
    api_key: String,
    settings: ServiceSettings,
}

impl GeminiService {
    /// Create a new service with the given API key and settings.
    #[must_use]
    pub fn new(api_key: String, settings: ServiceSettings) -> Self {
        Self { client: Client::new(), api_key, settings }
    }

    async fn post(&self, model: &str, method: &str, body: &Value) -> Result<String, DesignError> {
        let url = format!("{}/{model}:{method}", self.settings.base_url.trim_end_matches('/'));
        debug!(%model, method, "Calling generation service");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(DesignError::Api { status: status.as_u16(), message: response_text });
        }
        Ok(response_text)
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &Value,
    ) -> Result<GeminiResponse, DesignError> {
        let text = self.post(model, "generateContent", body).await?;
        serde_json::from_str(&text)
            .map_err(|e| DesignError::MalformedResponse(format!("Failed to parse response: {e}")))
    }

    async fn render_with_imagen(&self, prompt: &str) -> Result<GeneratedImage, DesignError> {
        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": self.settings.aspect_ratio,
                "outputOptions": { "mimeType": RENDER_MIME_TYPE }
            }
        });
        let text = self.post(&self.settings.models.image, "predict", &body).await?;
        let parsed: PredictResponse = serde_json::from_str(&text)
            .map_err(|e| DesignError::MalformedResponse(format!("Failed to parse response: {e}")))?;
        image_from_predictions(parsed, &text)
    }

    async fn render_with_gemini(&self, prompt: &str) -> Result<GeneratedImage, DesignError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": self.settings.aspect_ratio }
            }
        });
        let parsed = self.generate_content(&self.settings.models.image, &body).await?;
        image_from_candidates(parsed)
    }
}

impl GenerationService for GeminiService {
    fn analyze_image(&self, image: &EncodedImage) -> ServiceFuture<'_, String> {
        let image = image.clone();
        Box::pin(async move {
            let body = json!({
                "contents": [{
                    "role": "user",
                    "parts": [inline_image(&image), { "text": ANALYSIS_INSTRUCTION }]
                }]
            });
            let response = self.generate_content(&self.settings.models.chat, &body).await?;
            response_text(&response)
        })
    }

    fn continue_conversation(
        &self,
        transcript: &[Message],
        image: &EncodedImage,
    ) -> ServiceFuture<'_, DesignReply> {
        let contents = conversation_contents(transcript, image);
        Box::pin(async move {
            let body = json!({
                "contents": contents,
                "tools": [{ "google_search": {} }]
            });
            let response = self.generate_content(&self.settings.models.chat, &body).await?;
            let text = response_text(&response)?;
            Ok(DesignReply { text, citations: citations(&response) })
        })
    }

    fn synthesize_prompt(
        &self,
        transcript: &[Message],
        image: &EncodedImage,
    ) -> ServiceFuture<'_, String> {
        let request = prompt_request(transcript);
        let image = image.clone();
        Box::pin(async move {
            let body = json!({
                "systemInstruction": { "parts": [{ "text": PROMPT_SYSTEM_INSTRUCTION }] },
                "contents": [{
                    "role": "user",
                    "parts": [inline_image(&image), { "text": request }]
                }]
            });
            let response = self.generate_content(&self.settings.models.prompt, &body).await?;
            Ok(response_text(&response)?.trim().to_string())
        })
    }

    fn generate_image(&self, prompt: &str) -> ServiceFuture<'_, GeneratedImage> {
        let prompt = prompt.to_string();
        Box::pin(async move {
            match self.settings.image_backend {
                ImageBackend::Imagen => self.render_with_imagen(&prompt).await,
                ImageBackend::GeminiNative => self.render_with_gemini(&prompt).await,
            }
        })
    }
}

fn inline_image(image: &EncodedImage) -> Value {
    json!({ "inlineData": { "mimeType": image.mime_type, "data": image.data } })
}

/// Map the transcript to `contents`, attaching the image to the last user turn.
fn conversation_contents(transcript: &[Message], image: &EncodedImage) -> Vec<Value> {
    let last_user = transcript.iter().rposition(|m| m.sender == Sender::User);
    transcript
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let role = match message.sender {
                Sender::User => "user",
                Sender::Assistant => "model",
            };
            let mut parts = Vec::with_capacity(2);
            if last_user == Some(i) {
                parts.push(inline_image(image));
            }
            parts.push(json!({ "text": message.text }));
            json!({ "role": role, "parts": parts })
        })
        .collect()
}

fn prompt_request(transcript: &[Message]) -> String {
    format!(
        "Based on the user's room and the following conversation, create a photorealistic, \
detailed prompt for an image generation model.

Conversation:
---
{}
---

The prompt should describe the final designed room, including furniture, colors, lighting, \
materials, and overall style. The final output should be ONLY the prompt itself.",
        flatten_transcript(transcript)
    )
}

/// Concatenated text of the first candidate, skipping thought parts.
fn response_text(response: &GeminiResponse) -> Result<String, DesignError> {
    let text: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(DesignError::MalformedResponse("Response contained no text".to_string()));
    }
    Ok(text)
}

fn citations(response: &GeminiResponse) -> Vec<Citation> {
    let Some(metadata) = response.candidates.first().and_then(|c| c.grounding_metadata.as_ref())
    else {
        return Vec::new();
    };
    metadata
        .grounding_chunks
        .iter()
        .filter_map(|chunk| {
            let (kind, source) = match (&chunk.web, &chunk.maps) {
                (Some(web), _) => (CitationKind::Web, web),
                (None, Some(maps)) => (CitationKind::Maps, maps),
                (None, None) => return None,
            };
            Some(Citation { kind, uri: source.uri.clone(), title: source.title.clone() })
        })
        .collect()
}

/// First Imagen prediction carrying image bytes.
///
/// Safety-filtered predictions come back without `bytesBase64Encoded`.
fn image_from_predictions(
    response: PredictResponse,
    raw_body: &str,
) -> Result<GeneratedImage, DesignError> {
    let (data, mime_type) = response
        .predictions
        .into_iter()
        .find_map(|p| p.bytes_base64_encoded.map(|data| (data, p.mime_type)))
        .ok_or_else(|| {
            DesignError::EmptyResult(format!(
                "Image generation failed, no images were returned. Body: {}",
                truncate_body(raw_body)
            ))
        })?;

    Ok(GeneratedImage {
        data: decode_base64(&data)?,
        mime_type: mime_type.unwrap_or_else(|| RENDER_MIME_TYPE.to_string()),
    })
}

/// First inline image across all candidates of a Gemini-native response.
fn image_from_candidates(response: GeminiResponse) -> Result<GeneratedImage, DesignError> {
    let inline = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.inline_data)
        .ok_or_else(|| {
            DesignError::EmptyResult("Image generation failed, no images were returned.".to_string())
        })?;

    Ok(GeneratedImage { data: decode_base64(&inline.data)?, mime_type: inline.mime_type })
}

fn decode_base64(data: &str) -> Result<Vec<u8>, DesignError> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| DesignError::MalformedResponse(format!("Failed to decode base64: {e}")))
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() > 500 {
        format!("{}...", body.chars().take(500).collect::<String>())
    } else {
        body.to_string()
    }
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<GroundingSource>,
    maps: Option<GroundingSource>,
}

#[derive(Deserialize)]
struct GroundingSource {
    #[serde(default)]
    uri: String,
    #[serde(default)]
    title: String,
}

// --- Imagen API response types ---

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}
