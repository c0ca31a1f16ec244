//! Terminal front-end: forwards intents to the controller and prints the
//! session as it changes.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cli::Command;
use crate::controller::{DesignController, Outcome};
use crate::error::DesignError;
use crate::output::{resolve_output_path, save_analysis, save_image};
use crate::session::{ImageHandle, Session};
use crate::view::TranscriptPrinter;

/// Where and how to write files produced by a session.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Explicit rendering path; auto-generated when absent.
    pub output: Option<PathBuf>,
    /// Format for saved renderings.
    pub format: String,
    /// Where to write the room analysis after each successful upload.
    pub analysis: Option<PathBuf>,
}

/// Drives one [`DesignController`] from the terminal.
pub struct Frontend {
    controller: DesignController,
    printer: TranscriptPrinter,
    save: SaveOptions,
}

impl Frontend {
    /// Wrap a controller.
    #[must_use]
    pub fn new(controller: DesignController, save: SaveOptions) -> Self {
        Self { controller, printer: TranscriptPrinter::default(), save }
    }

    /// Print loading status lines to stderr until the controller is dropped.
    ///
    /// Best effort: the watch channel keeps only the latest session, so a
    /// phase that ends before this task runs prints nothing.
    #[must_use]
    pub fn spawn_progress(&self) -> JoinHandle<()> {
        let mut rx: watch::Receiver<Session> = self.controller.subscribe();
        tokio::spawn(async move {
            let mut last = String::new();
            while rx.changed().await.is_ok() {
                let status = rx.borrow_and_update().loading_status.clone();
                if !status.is_empty() && status != last {
                    eprintln!("... {status}");
                }
                last = status;
            }
        })
    }

    /// Upload an image and print the analysis.
    pub async fn upload(&mut self, image: ImageHandle) -> bool {
        self.printer.reset();
        let outcome = self.controller.upload_image(image).await;
        if let Some(label) = &self.controller.session().original_image_label {
            eprintln!("Room: {label}");
        }
        self.show(outcome);

        if outcome != Outcome::Applied {
            return false;
        }
        match self.save.analysis.clone() {
            Some(path) => self.write_analysis(&path),
            None => true,
        }
    }

    /// Send one chat message. Blank messages are ignored.
    pub async fn say(&mut self, text: &str) -> bool {
        if !self.controller.can_chat() {
            eprintln!("Upload an image to start.");
            return false;
        }
        let outcome = self.controller.send_message(text).await;
        self.show(outcome);
        outcome != Outcome::Failed
    }

    /// Render the redesign and save it.
    pub async fn visualize(&mut self) -> bool {
        if !self.controller.can_visualize() {
            eprintln!("Nothing to visualize yet: describe at least one change first.");
            return false;
        }
        let outcome = self.controller.visualize().await;
        if outcome != Outcome::Applied {
            self.show(outcome);
            return false;
        }
        if let Some(visualization) = &self.controller.session().generated_image {
            debug!(prompt = %visualization.prompt, "Rendered redesign");
        }
        self.save_rendering(None)
    }

    /// Start a new conversation from the latest rendering.
    pub async fn iterate(&mut self) -> bool {
        let Some(visualization) = self.controller.session().generated_image else {
            eprintln!("No rendering to iterate on yet.");
            return false;
        };
        self.upload(ImageHandle::DataUri(visualization.image.data_uri())).await
    }

    /// Save the latest rendering, if any.
    pub fn save_rendering(&self, path: Option<&Path>) -> bool {
        let session = self.controller.session();
        let Some(visualization) = &session.generated_image else {
            eprintln!("No rendering to save yet.");
            return false;
        };
        let stem = session.original_image.as_ref().map_or_else(|| "room".to_string(), ImageHandle::stem);
        let path = resolve_output_path(path.or(self.save.output.as_deref()), &stem, &self.save.format);

        match save_image(&visualization.image, &self.save.format, &path) {
            Ok(()) => {
                eprintln!("Saved: {}", path.display());
                true
            }
            Err(e) => {
                eprintln!("Error: {e}");
                false
            }
        }
    }

    /// Read commands until `/quit` or end of input.
    ///
    /// Returns whether every command succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub async fn interactive<R>(&mut self, input: R) -> Result<bool, DesignError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut all_ok = true;
        while let Some(line) = lines.next_line().await? {
            let ok = match Command::parse(&line) {
                Command::Say(text) => self.say(&text).await,
                Command::Visualize => self.visualize().await,
                Command::Upload(arg) => self.upload(ImageHandle::parse(&arg)).await,
                Command::Iterate => self.iterate().await,
                Command::Save(path) => self.save_rendering(Some(&path)),
                Command::Quit => break,
                Command::Ignore(line) => {
                    if !line.is_empty() {
                        eprintln!(
                            "Unknown command '{line}'. Try /visualize, /upload <path>, /iterate, /save <path> or /quit."
                        );
                    }
                    true
                }
            };
            all_ok &= ok;
        }
        Ok(all_ok)
    }

    fn show(&mut self, outcome: Outcome) {
        let session = self.controller.session();
        for line in self.printer.render_new(&session.transcript) {
            println!("{line}\n");
        }
        if outcome == Outcome::Failed {
            if let Some(error) = &session.error {
                eprintln!("Error: {error}");
            }
        }
    }

    fn write_analysis(&self, path: &Path) -> bool {
        let session = self.controller.session();
        let Some(analysis) = session.analysis() else {
            eprintln!("No analysis to save.");
            return false;
        };
        match save_analysis(&analysis.text, path) {
            Ok(()) => {
                eprintln!("Analysis saved: {}", path.display());
                true
            }
            Err(e) => {
                eprintln!("Error: {e}");
                false
            }
        }
    }
}
