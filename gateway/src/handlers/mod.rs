//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `audio` - Script-to-speech generation
//! - `scripts` - Script upload

pub mod api;
pub mod audio;
pub mod scripts;

pub use audio::generate_audio;
pub use scripts::upload_script;
