//! Service context that selects the live, recording or replaying service.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::gemini::{GeminiService, ServiceSettings};
use crate::adapters::recording::generation_service::RecordingGenerationService;
use crate::adapters::replaying::generation_service::ReplayingGenerationService;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::Config;
use crate::error::DesignError;
use crate::ports::GenerationService;

/// Environment variable naming a cassette to replay.
pub const REPLAY_ENV: &str = "ROOMCRAFT_REPLAY";
/// Environment variable that turns on recording.
pub const RECORD_ENV: &str = "ROOMCRAFT_REC";

/// Bundles the port trait objects the controller needs.
pub struct ServiceContext {
    /// Generation service port.
    pub service: Box<dyn GenerationService>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette to disk.
    ///
    /// Call this after the controller (and the service it owns) is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context calling the Gemini API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not configured.
    pub fn live(settings: ServiceSettings, config: &Config) -> Result<Self, DesignError> {
        let key = config.gemini_key().ok_or(DesignError::MissingApiKey {
            provider: "Gemini".into(),
            env_var: "GEMINI_API_KEY".into(),
        })?;
        Ok(Self { service: Box::new(GeminiService::new(key, settings)) })
    }

    /// Create a recording context that wraps the live service with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live service cannot be created.
    pub fn recording(
        settings: ServiceSettings,
        config: &Config,
    ) -> Result<(Self, RecordingSession), DesignError> {
        let live_ctx = Self::live(settings, config)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".roomcraft/cassettes")
            .join(&timestamp)
            .join("generation_service.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-generation_service"),
            get_commit_hash(),
        )));

        let service = RecordingGenerationService::new(live_ctx.service, Arc::clone(&recorder));
        Ok((Self { service: Box::new(service) }, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, DesignError> {
        let replayer = load_cassette(path)
            .map_err(|e| DesignError::Config(format!("Failed to load cassette: {e}")))?;
        let service = ReplayingGenerationService::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { service: Box::new(service) })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
