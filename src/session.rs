//! Session state for one redesign conversation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ports::GeneratedImage;

/// Text of the greeting shown once an image has been uploaded.
pub const GREETING: &str = "Hello! I've analyzed your room. How would you like to redesign it? \
For example, you could say 'make it more modern', 'add a plant in the corner', or 'change the \
sofa to a blue one'.";

/// Prefix that marks the room analysis message.
pub const ANALYSIS_HEADING: &str = "**Room Analysis:**";

/// Reply appended when the design assistant call fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error. Could you try rephrasing your request?";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person redesigning their room.
    User,
    /// The design assistant.
    Assistant,
}

impl Sender {
    /// Label used when flattening a transcript to plain text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Source of a grounding reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    /// A web search result.
    Web,
    /// A maps result.
    Maps,
}

/// A grounding reference attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Where the reference came from.
    pub kind: CitationKind,
    /// Target URI.
    pub uri: String,
    /// Display title, possibly empty.
    #[serde(default)]
    pub title: String,
}

impl Citation {
    /// Display label: the title, or the URI's host when the title is empty.
    #[must_use]
    pub fn label(&self) -> String {
        if !self.title.trim().is_empty() {
            return self.title.clone();
        }
        reqwest::Url::parse(&self.uri)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.uri.clone())
    }
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the turn.
    pub sender: Sender,
    /// Body text.
    pub text: String,
    /// Grounding references, in the order the service returned them.
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Set on the room analysis so front-ends can offer to copy it.
    #[serde(default)]
    pub analysis: bool,
}

impl Message {
    /// A message typed by the user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self { sender: Sender::User, text: text.into(), citations: Vec::new(), analysis: false }
    }

    /// An assistant reply with its citations.
    #[must_use]
    pub fn assistant(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self { sender: Sender::Assistant, text: text.into(), citations, analysis: false }
    }

    /// The greeting that opens every conversation.
    #[must_use]
    pub fn greeting() -> Self {
        Self::assistant(GREETING, Vec::new())
    }

    /// The room analysis, headed and tagged.
    #[must_use]
    pub fn analysis(analysis: &str) -> Self {
        Self {
            sender: Sender::Assistant,
            text: format!("{ANALYSIS_HEADING}\n{analysis}"),
            citations: Vec::new(),
            analysis: true,
        }
    }

    /// The apology shown when a chat turn fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self::assistant(FALLBACK_REPLY, Vec::new())
    }
}

/// Flatten a transcript into `sender: text` lines.
#[must_use]
pub fn flatten_transcript(transcript: &[Message]) -> String {
    transcript
        .iter()
        .map(|m| format!("{}: {}", m.sender.label(), m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reference to the image the user uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHandle {
    /// An image file on disk.
    File(PathBuf),
    /// An inline `data:` URI.
    DataUri(String),
}

impl ImageHandle {
    /// Interpret a user-supplied argument as a data URI or a file path.
    #[must_use]
    pub fn parse(arg: &str) -> Self {
        if arg.starts_with("data:") {
            Self::DataUri(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Human-readable reference for display.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::DataUri(_) => "inline image".to_string(),
        }
    }

    /// Stem used to name files derived from this image.
    #[must_use]
    pub fn stem(&self) -> String {
        match self {
            Self::File(path) => path
                .file_stem()
                .map_or_else(|| "room".to_string(), |s| s.to_string_lossy().into_owned()),
            Self::DataUri(_) => "room".to_string(),
        }
    }
}

/// A rendered redesign together with the prompt that produced it.
#[derive(Debug, Clone)]
pub struct Visualization {
    /// The rendered image.
    pub image: GeneratedImage,
    /// Prompt sent to the image model.
    pub prompt: String,
}

/// What the controller is currently waiting on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Waiting for the room analysis.
    AnalyzingImage,
    /// Waiting for the design assistant's reply.
    AwaitingChatResponse,
    /// Synthesizing a prompt and rendering the redesign.
    GeneratingVisualization,
}

/// The mutable state of one visit.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// The uploaded image, if any.
    pub original_image: Option<ImageHandle>,
    /// Display reference for the uploaded image.
    pub original_image_label: Option<String>,
    /// Most recent successful rendering.
    pub generated_image: Option<Visualization>,
    /// Conversation in chronological order.
    pub transcript: Vec<Message>,
    /// Current phase; anything other than `Idle` means loading.
    pub phase: Phase,
    /// Progress text for the current phase, empty when idle.
    pub loading_status: String,
    /// Last user-visible error.
    pub error: Option<String>,
}

impl Session {
    /// Whether an intent is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// The room analysis message, if the last upload produced one.
    #[must_use]
    pub fn analysis(&self) -> Option<&Message> {
        self.transcript.iter().find(|m| m.analysis)
    }
}
