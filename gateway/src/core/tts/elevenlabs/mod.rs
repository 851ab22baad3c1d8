//! ElevenLabs TTS provider module.
//!
//! Converts text to speech through the ElevenLabs REST API and hands the
//! audio back as a byte stream.
//!
//! # API Reference
//!
//! - Endpoint: `POST {base}/v1/text-to-speech/{voice_id}?output_format={format}`
//! - Auth: `xi-api-key` header
//! - Body: `{"text": ..., "model_id": ...}`
//!
//! # Output Formats
//!
//! `{codec}_{sample_rate}[_{bitrate}]`, e.g. `mp3_44100_128`, `pcm_16000`, `ulaw_8000`
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use voiceover_gateway::core::tts::{
//!     ElevenLabsTTS, ElevenLabsTTSConfig, SpeechSynthesizer, SynthesisRequest,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let tts = ElevenLabsTTS::new(ElevenLabsTTSConfig::new("sk_..."))?;
//! let request = SynthesisRequest::new(
//!     "Hello, world!",
//!     "JBFqnCBsd6RMkjVDRZzb",
//!     "eleven_multilingual_v2",
//!     "mp3_44100_128",
//! );
//!
//! let mut audio = tts.synthesize(&request).await?;
//! while let Some(chunk) = audio.next().await {
//!     println!("Received {} bytes", chunk?.len());
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod provider;


pub use config::{AudioCodec, ElevenLabsOutputFormat, ElevenLabsTTSConfig};
pub use provider::{ELEVENLABS_API_URL, ElevenLabsTTS};
pub(crate) use provider::body_snippet;
