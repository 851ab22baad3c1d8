// =============================================================================
// Audio Format Detection
// =============================================================================

/// Detect audio format from magic bytes.
///
/// Returns `(mime_type, extension)`. Unrecognized data of a plausible length
/// is sent as WAV, which the vendor accepts and probes itself.
pub fn detect_audio_format(data: &[u8]) -> (&'static str, &'static str) {
    if data.len() < 12 {
        return ("application/octet-stream", "bin");
    }

    if data.starts_with(b"ID3") || (data[0] == 0xFF && (data[1] & 0xE0) == 0xE0) {
        return ("audio/mpeg", "mp3");
    }
    if data.starts_with(b"RIFF") && &data[8..12] == b"WAVE" {
        return ("audio/wav", "wav");
    }
    if &data[4..8] == b"ftyp" {
        return ("audio/mp4", "m4a");
    }
    if data.starts_with(b"OggS") {
        return ("audio/ogg", "ogg");
    }
    if data.starts_with(b"fLaC") {
        return ("audio/flac", "flac");
    }

    ("audio/wav", "wav")
}
