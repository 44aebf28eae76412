//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::command_share::CommandShare;
use crate::adapters::live::gemini::GeminiTextGenerator;
use crate::adapters::recording::text_generator::RecordingTextGenerator;
use crate::adapters::replaying::text_generator::ReplayingTextGenerator;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::{Config, GEMINI_KEY_ENV};
use crate::error::SlideError;
use crate::ports::{ShareTarget, TextGenerator};

/// Environment variable naming a cassette to replay instead of calling the provider.
pub const REPLAY_ENV: &str = "CAROSELLO_REPLAY";

/// Environment variable that turns on cassette recording.
pub const RECORD_ENV: &str = "CAROSELLO_REC";

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Text generator port.
    pub generator: Box<dyn TextGenerator>,
}

/// Handle to a recording session that must be finished after use.
#[derive(Clone)]
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    fn start() -> Self {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".carosello/cassettes")
            .join(&timestamp)
            .join("text_generator.cassette.yaml");
        let recorder = CassetteRecorder::new(
            path,
            format!("{timestamp}-text_generator"),
            get_commit_hash(),
        );
        tracing::info!(path = %recorder.path().display(), "recording cassette");
        Self { recorder: Arc::new(Mutex::new(recorder)) }
    }

    fn wrap(&self, live: Box<dyn TextGenerator>) -> Box<dyn TextGenerator> {
        Box::new(RecordingTextGenerator::new(live, Arc::clone(&self.recorder)))
    }

    /// Finish the recording and write cassette files to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let mut recorder =
            self.recorder.lock().map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.write().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

/// Whether `CAROSELLO_REC` asks for recording.
#[must_use]
pub fn recording_requested() -> bool {
    std::env::var(RECORD_ENV).is_ok_and(|v| v == "true" || v == "1")
}

/// Build the live Gemini generator, resolving the key now.
fn live_generator(config: &Config) -> Result<Box<dyn TextGenerator>, SlideError> {
    let key = config
        .gemini_key()
        .ok_or_else(|| SlideError::MissingApiKey { env_var: GEMINI_KEY_ENV.into() })?;
    Ok(Box::new(GeminiTextGenerator::new(key)))
}

impl ServiceContext {
    /// Create a live context.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not configured.
    pub fn live(config: &Config) -> Result<Self, SlideError> {
        Ok(Self { generator: live_generator(config)? })
    }

    /// Create a recording context that wraps a live adapter with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not configured.
    pub fn recording(config: &Config) -> Result<(Self, RecordingSession), SlideError> {
        let live = live_generator(config)?;
        let session = RecordingSession::start();
        Ok((Self { generator: session.wrap(live) }, session))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, SlideError> {
        let replayer = load_replayer(path)?;
        Ok(Self { generator: Box::new(ReplayingTextGenerator::new(replayer)) })
    }

    /// Pick live, recording or replaying mode from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen mode cannot be set up.
    pub fn from_env(config: &Config) -> Result<(Self, Option<RecordingSession>), SlideError> {
        if let Ok(cassette) = std::env::var(REPLAY_ENV) {
            tracing::info!(cassette = %cassette, "replaying text generator");
            Ok((Self::replaying(Path::new(&cassette))?, None))
        } else if recording_requested() {
            tracing::info!("recording text generator interactions");
            let (ctx, session) = Self::recording(config)?;
            Ok((ctx, Some(session)))
        } else {
            Ok((Self::live(config)?, None))
        }
    }
}

fn load_replayer(path: &Path) -> Result<Arc<Mutex<CassetteReplayer>>, SlideError> {
    let replayer = CassetteReplayer::load(path)
        .map_err(|e| SlideError::Config(format!("Failed to load cassette: {e}")))?;
    tracing::debug!(
        name = replayer.name(),
        interactions = replayer.remaining(),
        "cassette ready"
    );
    Ok(Arc::new(Mutex::new(replayer)))
}

/// Where a long-running server gets a generator for each request.
///
/// Live sources resolve the API key per request, so a missing key is reported
/// on the request that needs it rather than at startup.
#[derive(Clone)]
pub enum GeneratorSource {
    /// Call Gemini with the key found at request time.
    Live(Arc<Config>),
    /// Call Gemini and record every interaction.
    Recording(Arc<Config>, RecordingSession),
    /// Serve a shared cassette.
    Replay(Arc<Mutex<CassetteReplayer>>),
    /// Always use this generator.
    #[cfg(test)]
    Fixed(Arc<dyn TextGenerator>),
}

impl GeneratorSource {
    /// Pick a source from the environment, like [`ServiceContext::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if a replay cassette cannot be loaded.
    pub fn from_env(config: Config) -> Result<Self, SlideError> {
        let config = Arc::new(config);
        if let Ok(cassette) = std::env::var(REPLAY_ENV) {
            tracing::info!(cassette = %cassette, "replaying text generator");
            Ok(Self::Replay(load_replayer(Path::new(&cassette))?))
        } else if recording_requested() {
            tracing::info!("recording text generator interactions");
            Ok(Self::Recording(config, RecordingSession::start()))
        } else {
            Ok(Self::Live(config))
        }
    }

    /// The recording session, if this source records.
    #[must_use]
    pub fn recording_session(&self) -> Option<RecordingSession> {
        match self {
            Self::Recording(_, session) => Some(session.clone()),
            _ => None,
        }
    }

    /// A generator for one request.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::MissingApiKey`] when a live source has no key.
    pub fn resolve(&self) -> Result<Box<dyn TextGenerator>, SlideError> {
        match self {
            Self::Live(config) => live_generator(config),
            Self::Recording(config, session) => Ok(session.wrap(live_generator(config)?)),
            Self::Replay(replayer) => {
                Ok(Box::new(ReplayingTextGenerator::new(Arc::clone(replayer))))
            }
            #[cfg(test)]
            Self::Fixed(generator) => Ok(Box::new(SharedGenerator(Arc::clone(generator)))),
        }
    }
}

#[cfg(test)]
struct SharedGenerator(Arc<dyn TextGenerator>);

#[cfg(test)]
impl TextGenerator for SharedGenerator {
    fn generate(
        &self,
        request: &crate::ports::TextRequest,
    ) -> crate::ports::text_generator::GenerateFuture<'_> {
        self.0.generate(request)
    }
}

/// The configured share target, if any.
#[must_use]
pub fn share_target(config: &Config) -> Option<Box<dyn ShareTarget>> {
    let command = config.share.command.as_deref()?;
    let staging = std::env::temp_dir().join("carosello-share");
    let share = CommandShare::from_command_line(command, staging)?;
    tracing::debug!(staging = %share.staging_dir().display(), "share command configured");
    Some(Box::new(share) as Box<dyn ShareTarget>)
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
