//! Voice registration (instant voice cloning).
//!
//! A voice profile is created once from sample recordings and then referenced
//! by the synthesis pipeline only through its voice id (`VOICE_ID`).

mod base;
mod elevenlabs;
mod format;

pub use base::{
    VoiceError, VoiceProfile, VoiceRegistrar, VoiceRegistration, VoiceResult, parse_label,
};
pub use elevenlabs::ElevenLabsVoices;
pub use format::detect_audio_format;
