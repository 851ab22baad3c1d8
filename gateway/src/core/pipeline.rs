//! Script → speech → bucket orchestration.
//!
//! [`VoiceoverPipeline`] owns the collaborators needed by both operations and is
//! shared by the HTTP handlers and the CLI.

use std::path::{Path, PathBuf};

use futures::TryStreamExt;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::locks::KeyLocks;
use super::storage::{ObjectStorage, StorageError};
use super::tts::{
    BoxedSynthesizer, ElevenLabsOutputFormat, SpeechSynthesizer, SynthesisRequest, TTSError,
};
use crate::config::ServerConfig;
use crate::utils::temp::{scoped_temp_file, write_stream_to_file};

/// Content type of stored scripts.
pub const SCRIPT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Failures of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("script '{key}' is empty")]
    EmptyScript { key: String },

    #[error(transparent)]
    Synthesis(#[from] TTSError),

    #[error("synthesis produced no audio")]
    EmptyAudio,

    #[error("local file error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result of a successful synthesis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedAudio {
    pub key: String,
    pub bytes: u64,
}

/// Result of a successful script upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedScript {
    pub key: String,
    pub bucket: String,
    pub bytes: u64,
}

/// Keys, voice and scratch settings used by every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub script_key: String,
    pub audio_key: String,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
    pub temp_dir: PathBuf,
}

impl PipelineSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            script_key: config.script_key.clone(),
            audio_key: config.audio_key.clone(),
            voice_id: config.voice_id.clone(),
            model_id: config.model_id.clone(),
            output_format: config.output_format.clone(),
            temp_dir: config.temp_dir(),
        }
    }

    /// Extension for scratch audio files, `bin` for unknown formats
    fn audio_extension(&self) -> &'static str {
        ElevenLabsOutputFormat::parse(&self.output_format)
            .map(|f| f.extension())
            .unwrap_or("bin")
    }

    /// Content type the audio artifact is stored with.
    pub fn audio_content_type(&self) -> &'static str {
        ElevenLabsOutputFormat::parse(&self.output_format)
            .map(|f| f.content_type())
            .unwrap_or("application/octet-stream")
    }
}

/// Synthesize `request` into `file`, rejecting empty output.
///
/// The whole vendor stream is drained before returning.
pub async fn synthesize_to_file(
    synthesizer: &dyn SpeechSynthesizer,
    request: &SynthesisRequest,
    file: &NamedTempFile,
) -> PipelineResult<u64> {
    let audio = synthesizer.synthesize(request).await?;
    let written = write_stream_to_file(audio.map_err(PipelineError::from), file).await?;

    if written == 0 {
        warn!("{} returned an empty audio stream", synthesizer.provider_name());
        return Err(PipelineError::EmptyAudio);
    }

    debug!("Buffered {} bytes of audio at {}", written, file.path().display());
    Ok(written)
}

#[derive(Clone)]
pub struct VoiceoverPipeline {
    storage: ObjectStorage,
    synthesizer: BoxedSynthesizer,
    locks: KeyLocks,
    settings: PipelineSettings,
}

impl std::fmt::Debug for VoiceoverPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceoverPipeline")
            .field("storage", &self.storage)
            .field("synthesizer", &self.synthesizer.provider_name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl VoiceoverPipeline {
    pub fn new(
        storage: ObjectStorage,
        synthesizer: BoxedSynthesizer,
        locks: KeyLocks,
        settings: PipelineSettings,
    ) -> Self {
        if let Ok(format) = ElevenLabsOutputFormat::parse(&settings.output_format) {
            let matches = Path::new(&settings.audio_key)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(format.extension()));
            if !matches {
                warn!(
                    "Audio key '{}' does not match output format '{}' (expected .{} extension)",
                    settings.audio_key,
                    settings.output_format,
                    format.extension()
                );
            }
        }

        Self {
            storage,
            synthesizer,
            locks,
            settings,
        }
    }

    pub fn storage(&self) -> &ObjectStorage {
        &self.storage
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Create a scratch file in the configured temp directory.
    pub fn scratch_file(&self, extension: &str) -> PipelineResult<NamedTempFile> {
        Ok(scoped_temp_file(&self.settings.temp_dir, extension)?)
    }

    /// Read the stored script, synthesize it and store the audio.
    ///
    /// The script and audio keys stay locked for the whole run so the audio
    /// written always belongs to the script that was read. Nothing is
    /// uploaded unless the vendor stream was drained completely and produced
    /// at least one byte.
    pub async fn generate_audio(&self) -> PipelineResult<GeneratedAudio> {
        let settings = &self.settings;
        let _guards = self
            .locks
            .lock_all(&[settings.script_key.as_str(), settings.audio_key.as_str()])
            .await;

        let text = self.storage.fetch_text(&settings.script_key).await?;
        if text.trim().is_empty() {
            warn!("Script {} is empty, refusing to synthesize", settings.script_key);
            return Err(PipelineError::EmptyScript {
                key: settings.script_key.clone(),
            });
        }

        let request = SynthesisRequest::new(
            text,
            settings.voice_id.clone(),
            settings.model_id.clone(),
            settings.output_format.clone(),
        );

        let scratch = self.scratch_file(settings.audio_extension())?;
        let written = synthesize_to_file(self.synthesizer.as_ref(), &request, &scratch).await?;

        let bytes = self
            .storage
            .store(
                scratch.path(),
                &settings.audio_key,
                settings.audio_content_type(),
            )
            .await?;
        info!(
            "Generated {} bytes of audio from {} into {}",
            written, settings.script_key, settings.audio_key
        );

        Ok(GeneratedAudio {
            key: settings.audio_key.clone(),
            bytes,
        })
    }

    /// Store a local file as the script, overwriting the previous one.
    ///
    /// Empty files are accepted.
    pub async fn upload_script(&self, local_path: &Path) -> PipelineResult<UploadedScript> {
        let key = &self.settings.script_key;
        let _guard = self.locks.lock(key).await;

        let bytes = self
            .storage
            .store(local_path, key, SCRIPT_CONTENT_TYPE)
            .await?;

        Ok(UploadedScript {
            key: key.clone(),
            bucket: self.storage.bucket().to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tts::{AudioStream, TTSResult};
    use async_trait::async_trait;
    use bytes::Bytes;
    use object_store::memory::InMemory;
    use std::sync::Arc;
    use object_store::{Attribute, AttributeValue, ObjectStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    /// Returns fixed chunks, optionally failing after them.
    struct ScriptedSynthesizer {
        chunks: Vec<&'static [u8]>,
        fail_after: Option<TTSError>,
        calls: AtomicUsize,
    }

    impl ScriptedSynthesizer {
        fn new(chunks: Vec<&'static [u8]>) -> Self {
            Self {
                chunks,
                fail_after: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for ScriptedSynthesizer {
        fn provider_name(&self) -> &'static str {
            "scripted"
        }

        async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<AudioStream> {
            request.validate()?;
            self.calls.fetch_add(1, Ordering::SeqCst);

            let mut items: Vec<TTSResult<Bytes>> = self
                .chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(c)))
                .collect();
            if let Some(err) = &self.fail_after {
                items.push(Err(err.clone()));
            }
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    /// Parks inside `synthesize` until released, then echoes the text.
    #[derive(Default)]
    struct GatedSynthesizer {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl SpeechSynthesizer for GatedSynthesizer {
        fn provider_name(&self) -> &'static str {
            "gated"
        }

        async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<AudioStream> {
            self.entered.notify_one();
            self.release.notified().await;

            let chunks: Vec<TTSResult<Bytes>> = vec![Ok(Bytes::from(request.text.clone()))];
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    fn pipeline(synth: BoxedSynthesizer, temp_dir: &Path) -> VoiceoverPipeline {
        let mut config = ServerConfig::default();
        config.temp_dir = Some(temp_dir.to_path_buf());
        VoiceoverPipeline::new(
            ObjectStorage::new(Arc::new(InMemory::new()), "pitchbox"),
            synth,
            KeyLocks::new(),
            PipelineSettings::from_config(&config),
        )
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_generate_audio_uploads_artifact() {
        let dir = TempDir::new().unwrap();
        let synth = Arc::new(ScriptedSynthesizer::new(vec![b"ID3", b"frames"]));
        let pipeline = pipeline(synth.clone(), dir.path());
        pipeline
            .storage()
            .put_bytes("script.txt", Bytes::from_static(b"Hello investors."))
            .await
            .unwrap();

        let generated = pipeline.generate_audio().await.unwrap();

        assert_eq!(
            generated,
            GeneratedAudio {
                key: "output.mp3".to_string(),
                bytes: 9
            }
        );
        let stored = pipeline.storage().fetch_bytes("output.mp3").await.unwrap();
        assert_eq!(&stored[..], b"ID3frames");
        assert_eq!(synth.calls.load(Ordering::SeqCst), 1);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_missing_script() {
        let dir = TempDir::new().unwrap();
        let synth = Arc::new(ScriptedSynthesizer::new(vec![b"ID3"]));
        let pipeline = pipeline(synth.clone(), dir.path());

        let err = pipeline.generate_audio().await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Storage(StorageError::NotFound { .. })
        ));
        assert_eq!(synth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_script_fails_before_synthesis() {
        let dir = TempDir::new().unwrap();
        let synth = Arc::new(ScriptedSynthesizer::new(vec![b"ID3"]));
        let pipeline = pipeline(synth.clone(), dir.path());
        pipeline
            .storage()
            .put_bytes("script.txt", Bytes::from_static(b"  \n"))
            .await
            .unwrap();

        let err = pipeline.generate_audio().await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyScript { .. }));
        assert_eq!(synth.calls.load(Ordering::SeqCst), 0);
        assert!(!pipeline.storage().exists("output.mp3").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_byte_audio_is_not_uploaded() {
        let dir = TempDir::new().unwrap();
        let synth = Arc::new(ScriptedSynthesizer::new(Vec::new()));
        let pipeline = pipeline(synth, dir.path());
        pipeline
            .storage()
            .put_bytes("script.txt", Bytes::from_static(b"Hello"))
            .await
            .unwrap();

        let err = pipeline.generate_audio().await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyAudio));
        assert!(!pipeline.storage().exists("output.mp3").await.unwrap());
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_interrupted_stream_is_not_uploaded() {
        let dir = TempDir::new().unwrap();
        let mut synth = ScriptedSynthesizer::new(vec![b"ID3partial"]);
        synth.fail_after = Some(TTSError::StreamInterrupted("reset".to_string()));
        let pipeline = pipeline(Arc::new(synth), dir.path());
        pipeline
            .storage()
            .put_bytes("script.txt", Bytes::from_static(b"Hello"))
            .await
            .unwrap();

        let err = pipeline.generate_audio().await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Synthesis(TTSError::StreamInterrupted(_))
        ));
        assert!(!pipeline.storage().exists("output.mp3").await.unwrap());
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_upload_script_accepts_empty_file() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(Arc::new(ScriptedSynthesizer::new(Vec::new())), dir.path());

        let local = dir.path().join("empty.txt");
        std::fs::write(&local, b"").unwrap();

        let uploaded = pipeline.upload_script(&local).await.unwrap();
        assert_eq!(
            uploaded,
            UploadedScript {
                key: "script.txt".to_string(),
                bucket: "pitchbox".to_string(),
                bytes: 0
            }
        );
        assert_eq!(pipeline.storage().fetch_text("script.txt").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_upload_waits_for_generation_in_flight() {
        let dir = TempDir::new().unwrap();
        let synth = Arc::new(GatedSynthesizer::default());
        let pipeline = pipeline(synth.clone(), dir.path());
        pipeline
            .storage()
            .put_bytes("script.txt", Bytes::from_static(b"Version 1"))
            .await
            .unwrap();

        let generating = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.generate_audio().await })
        };
        synth.entered.notified().await;

        let local = dir.path().join("next.txt");
        std::fs::write(&local, b"Version 2").unwrap();

        let upload = pipeline.upload_script(&local);
        tokio::pin!(upload);
        let early = tokio::time::timeout(Duration::from_millis(100), &mut upload).await;
        assert!(early.is_err(), "upload finished while generation held the script");

        synth.release.notify_one();
        generating.await.unwrap().unwrap();
        upload.await.unwrap();

        let audio = pipeline.storage().fetch_bytes("output.mp3").await.unwrap();
        assert_eq!(&audio[..], b"Version 1");
        assert_eq!(
            pipeline.storage().fetch_text("script.txt").await.unwrap(),
            "Version 2"
        );
    }

    #[tokio::test]
    async fn test_artifacts_carry_content_types() {
        let dir = TempDir::new().unwrap();
        let memory = Arc::new(InMemory::new());
        let mut config = ServerConfig::default();
        config.temp_dir = Some(dir.path().to_path_buf());
        let pipeline = VoiceoverPipeline::new(
            ObjectStorage::new(memory.clone(), "pitchbox"),
            Arc::new(ScriptedSynthesizer::new(vec![b"ID3frames"])),
            KeyLocks::new(),
            PipelineSettings::from_config(&config),
        );

        let local = dir.path().join("script.txt");
        std::fs::write(&local, b"Hello investors.").unwrap();
        pipeline.upload_script(&local).await.unwrap();
        pipeline.generate_audio().await.unwrap();

        for (key, expected) in [
            ("script.txt", "text/plain; charset=utf-8"),
            ("output.mp3", "audio/mpeg"),
        ] {
            let stored = memory.get(&key.into()).await.unwrap();
            assert_eq!(
                stored.attributes.get(&Attribute::ContentType),
                Some(&AttributeValue::from(expected)),
                "{key}"
            );
        }
    }

    #[tokio::test]
    async fn test_synthesize_to_file_writes_all_chunks() {
        let dir = TempDir::new().unwrap();
        let synth = ScriptedSynthesizer::new(vec![b"ID3", b"abc", b"def"]);
        let request = SynthesisRequest::new("Hello", "voice", "model", "mp3_44100_128");
        let file = scoped_temp_file(dir.path(), "mp3").unwrap();

        let written = synthesize_to_file(&synth, &request, &file).await.unwrap();

        assert_eq!(written, 9);
        assert_eq!(std::fs::read(file.path()).unwrap(), b"ID3abcdef");
    }

    #[test]
    fn test_audio_extension() {
        let mut settings = PipelineSettings::from_config(&ServerConfig::default());
        assert_eq!(settings.audio_extension(), "mp3");
        settings.output_format = "pcm_16000".to_string();
        assert_eq!(settings.audio_extension(), "pcm");
        assert_eq!(settings.audio_content_type(), "audio/pcm");
        settings.output_format = "mystery".to_string();
        assert_eq!(settings.audio_extension(), "bin");
        assert_eq!(settings.audio_content_type(), "application/octet-stream");
    }
}
