//! Plain-text rendering of transcript messages.

use crate::session::{Message, Sender};

/// Render one message, followed by its numbered sources.
#[must_use]
pub fn render_message(message: &Message) -> String {
    let who = match message.sender {
        Sender::User => "You",
        Sender::Assistant => "Designer",
    };
    let mut out = format!("{who}: {}", message.text);

    if !message.citations.is_empty() {
        out.push_str("\n  Sources:");
        for (i, citation) in message.citations.iter().enumerate() {
            out.push_str(&format!("\n  {}. {} <{}>", i + 1, citation.label(), citation.uri));
        }
    }
    out
}

/// Tracks which transcript messages have already been printed.
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    shown: usize,
}

impl TranscriptPrinter {
    /// Forget what was shown; the next call renders the whole transcript.
    pub fn reset(&mut self) {
        self.shown = 0;
    }

    /// Render messages not yet shown.
    pub fn render_new(&mut self, transcript: &[Message]) -> Vec<String> {
        let start = self.shown.min(transcript.len());
        self.shown = transcript.len();
        transcript[start..].iter().map(render_message).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Citation, CitationKind};

    #[test]
    fn user_message() {
        assert_eq!(render_message(&Message::user("add a plant")), "You: add a plant");
    }

    #[test]
    fn sources_fall_back_to_host() {
        let message = Message::assistant(
            "Try rattan.",
            vec![
                Citation {
                    kind: CitationKind::Web,
                    uri: "https://www.rattan.example/chairs".into(),
                    title: String::new(),
                },
                Citation {
                    kind: CitationKind::Web,
                    uri: "https://guide.example".into(),
                    title: "Rattan guide".into(),
                },
            ],
        );
        let rendered = render_message(&message);
        assert!(rendered.starts_with("Designer: Try rattan.\n  Sources:"));
        assert!(rendered.contains("1. www.rattan.example <https://www.rattan.example/chairs>"));
        assert!(rendered.contains("2. Rattan guide <https://guide.example>"));
    }

    #[test]
    fn printer_only_renders_new_messages() {
        let mut printer = TranscriptPrinter::default();
        let mut transcript = vec![Message::analysis("ok"), Message::greeting()];
        assert_eq!(printer.render_new(&transcript).len(), 2);

        transcript.push(Message::user("brighter"));
        let new = printer.render_new(&transcript);
        assert_eq!(new, vec!["You: brighter".to_string()]);
        assert!(printer.render_new(&transcript).is_empty());

        printer.reset();
        assert_eq!(printer.render_new(&transcript).len(), 3);
    }

    #[test]
    fn printer_survives_shrinking_transcript() {
        let mut printer = TranscriptPrinter::default();
        printer.render_new(&[Message::greeting(), Message::greeting()]);
        assert!(printer.render_new(&[]).is_empty());
    }
}
