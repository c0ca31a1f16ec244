//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::Parser;

/// Conversational room redesign: analyze a photo, talk through changes,
/// render the result.
#[derive(Parser, Debug)]
#[command(name = "roomcraft", version, about)]
pub struct Cli {
    /// Photo of the room: a file path or a `data:` URI.
    pub image: String,

    /// Design request to send after the analysis (repeatable, sent in order).
    #[arg(short, long = "message", value_name = "TEXT")]
    pub messages: Vec<String>,

    /// Render the redesigned room once the messages are sent.
    #[arg(long)]
    pub visualize: bool,

    /// Read further requests from stdin (`/visualize`, `/upload <path>`,
    /// `/iterate`, `/save <path>`, `/quit`).
    #[arg(short, long)]
    pub interactive: bool,

    /// Where to save the rendering (auto-generated if not specified).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Save the room analysis text to this file.
    #[arg(long, value_name = "PATH")]
    pub save_analysis: Option<PathBuf>,

    /// Image model name or alias (overrides config).
    #[arg(long)]
    pub image_model: Option<String>,

    /// Aspect ratio of the rendering (overrides config).
    #[arg(short, long)]
    pub aspect_ratio: Option<String>,

    /// Saved image format: jpeg, png, webp (overrides config).
    #[arg(short, long)]
    pub format: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// A line typed in interactive mode.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Send a chat message.
    Say(String),
    /// Render the redesign.
    Visualize,
    /// Start over with another image.
    Upload(String),
    /// Start over from the latest rendering.
    Iterate,
    /// Save the latest rendering to a path.
    Save(PathBuf),
    /// Leave the session.
    Quit,
    /// Blank line or unknown command.
    Ignore(String),
}

impl Command {
    /// Parse one input line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match head {
            "" => Self::Ignore(String::new()),
            "/visualize" => Self::Visualize,
            "/iterate" => Self::Iterate,
            "/quit" | "/exit" => Self::Quit,
            "/upload" if !rest.is_empty() => Self::Upload(rest.to_string()),
            "/save" if !rest.is_empty() => Self::Save(PathBuf::from(rest)),
            _ if head.starts_with('/') => Self::Ignore(line.to_string()),
            _ => Self::Say(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_only() {
        let cli = Cli::parse_from(["roomcraft", "room.jpg"]);
        assert_eq!(cli.image, "room.jpg");
        assert!(cli.messages.is_empty());
        assert!(!cli.visualize);
        assert!(!cli.interactive);
        assert!(cli.output.is_none());
        assert!(cli.image_model.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn scripted_session() {
        let cli = Cli::parse_from([
            "roomcraft",
            "-m",
            "make it more modern",
            "--message",
            "add a plant",
            "--visualize",
            "-o",
            "out.png",
            "-f",
            "png",
            "-a",
            "16:9",
            "--image-model",
            "nano-banana",
            "--save-analysis",
            "analysis.md",
            "-v",
            "room.jpg",
        ]);
        assert_eq!(cli.messages, vec!["make it more modern", "add a plant"]);
        assert!(cli.visualize);
        assert_eq!(cli.output, Some(PathBuf::from("out.png")));
        assert_eq!(cli.format.as_deref(), Some("png"));
        assert_eq!(cli.aspect_ratio.as_deref(), Some("16:9"));
        assert_eq!(cli.image_model.as_deref(), Some("nano-banana"));
        assert_eq!(cli.save_analysis, Some(PathBuf::from("analysis.md")));
        assert!(cli.verbose);
    }

    #[test]
    fn image_is_required() {
        assert!(Cli::try_parse_from(["roomcraft"]).is_err());
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("  make it cozy "), Command::Say("make it cozy".into()));
        assert_eq!(Command::parse("/visualize"), Command::Visualize);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/iterate"), Command::Iterate);
        assert_eq!(Command::parse("/upload  rooms/den.jpg"), Command::Upload("rooms/den.jpg".into()));
        assert_eq!(Command::parse("/save out.png"), Command::Save(PathBuf::from("out.png")));
        assert_eq!(Command::parse(""), Command::Ignore(String::new()));
        assert_eq!(Command::parse("/upload"), Command::Ignore("/upload".into()));
        assert_eq!(Command::parse("/dance"), Command::Ignore("/dance".into()));
    }
}
