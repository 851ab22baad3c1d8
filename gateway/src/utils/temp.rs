//! Scoped local scratch files.
//!
//! Every request gets its own uniquely named file. The file is removed when the
//! returned [`NamedTempFile`] is dropped, on success and failure alike.

use std::io;
use std::path::Path;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

const TEMP_PREFIX: &str = "voiceover-";

/// Create a uniquely named file in `dir`, e.g. `voiceover-a1B2c3.mp3`.
pub fn scoped_temp_file(dir: &Path, extension: &str) -> io::Result<NamedTempFile> {
    let suffix = if extension.is_empty() {
        String::new()
    } else {
        format!(".{extension}")
    };

    tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(&suffix)
        .tempfile_in(dir)
}

/// Drain `stream` into `file`, returning the number of bytes written.
///
/// The first stream error aborts the copy. Bytes received before it are
/// flushed; removing the partial file is left to the caller's guard.
pub async fn write_stream_to_file<S, E>(stream: S, file: &NamedTempFile) -> Result<u64, E>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: From<io::Error>,
{
    let mut out = tokio::fs::File::from_std(file.as_file().try_clone()?);
    let mut stream = std::pin::pin!(stream);
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                out.flush().await?;
                return Err(e);
            }
        };
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    out.flush().await?;
    Ok(written)
}
