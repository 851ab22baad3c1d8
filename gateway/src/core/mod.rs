pub mod locks;
pub mod pipeline;
pub mod storage;
pub mod tts;
pub mod voices;

// Re-export commonly used types for convenience
pub use locks::{KeyGuards, KeyLocks};
pub use pipeline::{
    GeneratedAudio, PipelineError, PipelineResult, PipelineSettings, UploadedScript,
    VoiceoverPipeline, synthesize_to_file,
};
pub use storage::{ObjectStorage, StorageError, StorageResult};
pub use tts::{
    AudioStream, BoxedSynthesizer, ElevenLabsTTS, ElevenLabsTTSConfig, SpeechSynthesizer,
    SynthesisRequest, TTSError, TTSResult,
};
pub use voices::{
    ElevenLabsVoices, VoiceError, VoiceProfile, VoiceRegistrar, VoiceRegistration, VoiceResult,
    parse_label,
};
