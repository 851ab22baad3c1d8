mod base;
pub mod elevenlabs;

pub use base::{
    AudioStream, BoxedSynthesizer, SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult,
};
pub use elevenlabs::{
    AudioCodec, ELEVENLABS_API_URL, ElevenLabsOutputFormat, ElevenLabsTTS, ElevenLabsTTSConfig,
};
