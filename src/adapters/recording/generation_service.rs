//! Recording adapter for the `GenerationService` port.

use std::sync::{Arc, Mutex};

use serde_json::json;

use super::{image_summary, record_result};
use crate::cassette::recorder::CassetteRecorder;
use crate::encoding::EncodedImage;
use crate::ports::{DesignReply, GeneratedImage, GenerationService, ServiceFuture};
use crate::session::Message;

const PORT: &str = "generation_service";

/// Records service interactions while delegating to an inner implementation.
pub struct RecordingGenerationService {
    inner: Box<dyn GenerationService>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingGenerationService {
    /// Creates a new recording service wrapping the given implementation.
    pub fn new(inner: Box<dyn GenerationService>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl GenerationService for RecordingGenerationService {
    fn analyze_image(&self, image: &EncodedImage) -> ServiceFuture<'_, String> {
        let image = image.clone();
        Box::pin(async move {
            let result = self.inner.analyze_image(&image).await;
            let input = json!({ "image": image_summary(&image) });
            record_result(&self.recorder, PORT, "analyze_image", input, &result);
            result
        })
    }

    fn continue_conversation(
        &self,
        transcript: &[Message],
        image: &EncodedImage,
    ) -> ServiceFuture<'_, DesignReply> {
        let transcript = transcript.to_vec();
        let image = image.clone();
        Box::pin(async move {
            let result = self.inner.continue_conversation(&transcript, &image).await;
            let input = json!({ "transcript": transcript, "image": image_summary(&image) });
            record_result(&self.recorder, PORT, "continue_conversation", input, &result);
            result
        })
    }

    fn synthesize_prompt(
        &self,
        transcript: &[Message],
        image: &EncodedImage,
    ) -> ServiceFuture<'_, String> {
        let transcript = transcript.to_vec();
        let image = image.clone();
        Box::pin(async move {
            let result = self.inner.synthesize_prompt(&transcript, &image).await;
            let input = json!({ "transcript": transcript, "image": image_summary(&image) });
            record_result(&self.recorder, PORT, "synthesize_prompt", input, &result);
            result
        })
    }

    fn generate_image(&self, prompt: &str) -> ServiceFuture<'_, GeneratedImage> {
        let prompt = prompt.to_string();
        Box::pin(async move {
            let result = self.inner.generate_image(&prompt).await;
            record_result(&self.recorder, PORT, "generate_image", json!({ "prompt": prompt }), &result);
            result
        })
    }
}
