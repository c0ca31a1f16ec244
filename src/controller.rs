//! Orchestration of the upload, chat and visualize intents.
//!
//! The controller owns the [`Session`] and publishes every change through a
//! `watch` channel, so front-ends can show progress without polling. Each
//! intent runs to completion before the next one can start (`&mut self`), and
//! every exit path returns the session to [`Phase::Idle`].

use tokio::sync::watch;
use tracing::{info, warn};

use crate::encoding::encode_image;
use crate::error::DesignError;
use crate::ports::{GeneratedImage, GenerationService};
use crate::session::{ImageHandle, Message, Phase, Session, Visualization};

/// Status shown while the room is analyzed.
pub const STATUS_ANALYZING: &str = "Analyzing your room...";
/// Status shown while the design assistant answers.
pub const STATUS_THINKING: &str = "Thinking of design ideas...";
/// Status shown while the prompt is synthesized.
pub const STATUS_GENERATING: &str = "Generating your new room... This might take a minute.";
/// Status shown once the prompt is ready and rendering starts.
pub const STATUS_RENDERING: &str = "Prompt generated. Creating image...";

/// Error shown when the upload analysis fails.
pub const ERROR_ANALYZE: &str = "Failed to analyze the image. Please try again.";
/// Error shown when a chat turn fails.
pub const ERROR_CHAT: &str = "Failed to get a response from the design assistant.";
/// Error shown when visualization fails.
pub const ERROR_VISUALIZE: &str =
    "Failed to generate the image. Please try again or adjust your design request.";

/// Number of messages a fresh upload leaves in the transcript.
const INITIAL_MESSAGES: usize = 2;

/// How an intent ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The intent ran and succeeded.
    Applied,
    /// The intent ran and failed; the session carries the error text.
    Failed,
    /// The intent was not allowed in the current state and changed nothing.
    Skipped,
}

/// Sequences generation service calls in response to user intents.
pub struct DesignController {
    service: Box<dyn GenerationService>,
    state: watch::Sender<Session>,
}

impl DesignController {
    /// Create a controller with an empty session.
    #[must_use]
    pub fn new(service: Box<dyn GenerationService>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { service, state }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Subscribe to session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Whether a chat message would be accepted.
    #[must_use]
    pub fn can_chat(&self) -> bool {
        let session = self.state.borrow();
        session.original_image.is_some() && !session.is_loading()
    }

    /// Whether a visualization request would be accepted.
    #[must_use]
    pub fn can_visualize(&self) -> bool {
        let session = self.state.borrow();
        session.original_image.is_some()
            && !session.is_loading()
            && session.transcript.len() > INITIAL_MESSAGES
    }

    /// Start a new conversation about `image`.
    ///
    /// On success the transcript is `[analysis, greeting]`; on failure it is
    /// empty and the error is set. The image stays loaded either way.
    pub async fn upload_image(&mut self, image: ImageHandle) -> Outcome {
        let label = image.label();
        info!(image = %label, "Image uploaded");
        self.update(|s| {
            s.original_image = Some(image.clone());
            s.original_image_label = Some(label);
            s.generated_image = None;
            s.error = None;
            s.transcript = vec![Message::greeting()];
            s.phase = Phase::AnalyzingImage;
            s.loading_status = STATUS_ANALYZING.to_string();
        });

        let result = self.analyze(&image).await;

        let outcome = match result {
            Ok(analysis) => {
                self.update(|s| s.transcript.insert(0, Message::analysis(&analysis)));
                Outcome::Applied
            }
            Err(e) => {
                report("upload", &e);
                self.update(|s| {
                    s.transcript.clear();
                    s.error = Some(ERROR_ANALYZE.to_string());
                });
                Outcome::Failed
            }
        };
        self.finish();
        outcome
    }

    /// Send a chat message to the design assistant.
    ///
    /// The user message is appended before the service call starts. A failed
    /// call appends a fallback reply and sets the error, leaving the rest of the
    /// conversation intact.
    pub async fn send_message(&mut self, text: &str) -> Outcome {
        let text = text.trim();
        let Some(image) = self.state.borrow().original_image.clone() else {
            return Outcome::Skipped;
        };
        if text.is_empty() {
            return Outcome::Skipped;
        }

        self.update(|s| {
            s.transcript.push(Message::user(text));
            s.phase = Phase::AwaitingChatResponse;
            s.loading_status = STATUS_THINKING.to_string();
            s.error = None;
        });

        let transcript = self.state.borrow().transcript.clone();
        let result = async {
            let encoded = encode_image(&image).await?;
            self.service.continue_conversation(&transcript, &encoded).await
        }
        .await;

        let outcome = match result {
            Ok(reply) => {
                self.update(|s| s.transcript.push(Message::assistant(reply.text, reply.citations)));
                Outcome::Applied
            }
            Err(e) => {
                report("chat", &e);
                self.update(|s| {
                    s.transcript.push(Message::fallback());
                    s.error = Some(ERROR_CHAT.to_string());
                });
                Outcome::Failed
            }
        };
        self.finish();
        outcome
    }

    /// Render the redesigned room from the conversation so far.
    ///
    /// Requires a loaded image and at least one exchange beyond the initial
    /// analysis and greeting. A failure leaves any previous rendering in place.
    pub async fn visualize(&mut self) -> Outcome {
        let (image, transcript) = {
            let session = self.state.borrow();
            match &session.original_image {
                Some(image) if session.transcript.len() > INITIAL_MESSAGES => {
                    (image.clone(), session.transcript.clone())
                }
                _ => return Outcome::Skipped,
            }
        };

        self.update(|s| {
            s.phase = Phase::GeneratingVisualization;
            s.loading_status = STATUS_GENERATING.to_string();
            s.error = None;
        });

        let result = self.render(&image, &transcript).await;

        let outcome = match result {
            Ok((image, prompt)) => {
                self.update(|s| s.generated_image = Some(Visualization { image, prompt }));
                Outcome::Applied
            }
            Err(e) => {
                report("visualize", &e);
                self.update(|s| s.error = Some(ERROR_VISUALIZE.to_string()));
                Outcome::Failed
            }
        };
        self.finish();
        outcome
    }

    async fn analyze(&self, image: &ImageHandle) -> Result<String, DesignError> {
        let encoded = encode_image(image).await?;
        self.service.analyze_image(&encoded).await
    }

    async fn render(
        &self,
        image: &ImageHandle,
        transcript: &[Message],
    ) -> Result<(GeneratedImage, String), DesignError> {
        let encoded = encode_image(image).await?;
        let prompt = self.service.synthesize_prompt(transcript, &encoded).await?;
        self.update(|s| s.loading_status = STATUS_RENDERING.to_string());
        let image = self.service.generate_image(&prompt).await?;
        Ok((image, prompt))
    }

    fn update(&self, modify: impl FnOnce(&mut Session)) {
        self.state.send_modify(modify);
    }

    fn finish(&self) {
        self.update(|s| {
            s.phase = Phase::Idle;
            s.loading_status.clear();
        });
    }
}

fn report(intent: &str, error: &DesignError) {
    warn!(intent, kind = error.category(), "{error}");
}
