//! Replaying adapter for the `GenerationService` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::encoding::EncodedImage;
use crate::ports::{DesignReply, GeneratedImage, GenerationService, ServiceFuture};
use crate::session::Message;

const PORT: &str = "generation_service";

/// Serves recorded service results from a cassette.
pub struct ReplayingGenerationService {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingGenerationService {
    /// Create a replaying service backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }

    fn replay<T>(&self, method: &'static str) -> ServiceFuture<'_, T>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        let result = next_output(&self.replayer, PORT, method).and_then(replay_result::<T>);
        Box::pin(async move { result })
    }
}

impl GenerationService for ReplayingGenerationService {
    fn analyze_image(&self, _image: &EncodedImage) -> ServiceFuture<'_, String> {
        self.replay("analyze_image")
    }

    fn continue_conversation(
        &self,
        _transcript: &[Message],
        _image: &EncodedImage,
    ) -> ServiceFuture<'_, DesignReply> {
        self.replay("continue_conversation")
    }

    fn synthesize_prompt(
        &self,
        _transcript: &[Message],
        _image: &EncodedImage,
    ) -> ServiceFuture<'_, String> {
        self.replay("synthesize_prompt")
    }

    fn generate_image(&self, _prompt: &str) -> ServiceFuture<'_, GeneratedImage> {
        self.replay("generate_image")
    }
}
