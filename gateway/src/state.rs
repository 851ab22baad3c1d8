use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::ServerConfig;
use crate::core::{
    BoxedSynthesizer, ElevenLabsTTS, ElevenLabsTTSConfig, KeyLocks, ObjectStorage,
    PipelineSettings, StorageError, TTSError, VoiceoverPipeline,
};

/// Startup failures while wiring the application state.
#[derive(Debug, Error)]
pub enum StateInitError {
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Synthesis(#[from] TTSError),
}

/// Shared state handed to every handler.
///
/// Immutable after startup apart from the per-key locks inside the pipeline.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub pipeline: VoiceoverPipeline,
}

impl AppState {
    /// Build the production clients from configuration.
    ///
    /// Fails when the ElevenLabs or storage credentials are missing, so the
    /// process never starts half-configured.
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, StateInitError> {
        config
            .require_speech_credentials()
            .map_err(StateInitError::MissingCredentials)?;
        config
            .require_storage_credentials()
            .map_err(StateInitError::MissingCredentials)?;

        let storage = ObjectStorage::from_config(&config.storage)?;
        let synthesizer: BoxedSynthesizer = Arc::new(ElevenLabsTTS::new(
            ElevenLabsTTSConfig::from_server_config(&config)?,
        )?);

        info!(
            "Using bucket {} and {} voice {}",
            storage.bucket(),
            synthesizer.provider_name(),
            config.voice_id
        );

        Ok(Self::with_clients(config, storage, synthesizer))
    }

    /// Build state around caller-provided clients.
    pub fn with_clients(
        config: ServerConfig,
        storage: ObjectStorage,
        synthesizer: BoxedSynthesizer,
    ) -> Arc<Self> {
        let pipeline = VoiceoverPipeline::new(
            storage,
            synthesizer,
            KeyLocks::new(),
            PipelineSettings::from_config(&config),
        );

        Arc::new(Self { config, pipeline })
    }
}
