use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::{
    Json,
    extract::{Multipart, State},
};
use futures::TryStreamExt;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::temp::write_stream_to_file;

/// Multipart field carrying the script
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadScriptResponse {
    pub message: String,
}

/// Handler for POST /upload-tigris
///
/// Accepts a multipart form and stores the `file` field (or the first field
/// with a filename) as the script. The body is spooled to a scoped temporary
/// file chunk by chunk, so memory use does not grow with the upload.
///
/// # Response
///
/// ```json
/// { "message": "script.txt uploaded successfully to pitchbox" }
/// ```
pub async fn upload_script(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadScriptResponse>> {
    let mut multipart = multipart.map_err(|e| AppError::BadUpload(e.body_text()))?;

    let scratch = state.pipeline.scratch_file("txt")?;
    let mut received = None;

    while let Some(field) = multipart.next_field().await? {
        let is_file = field.name() == Some(FILE_FIELD) || field.file_name().is_some();
        if !is_file {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let written = write_stream_to_file(field.map_err(AppError::from), &scratch).await?;
        received = Some((file_name, written));
        break;
    }

    let Some((file_name, written)) = received else {
        return Err(AppError::BadUpload("missing 'file' field".to_string()));
    };

    info!(
        "Received script upload {:?} ({} bytes)",
        file_name.as_deref().unwrap_or("<unnamed>"),
        written
    );

    let uploaded = state.pipeline.upload_script(scratch.path()).await?;

    Ok(Json(UploadScriptResponse {
        message: format!(
            "{} uploaded successfully to {}",
            uploaded.key, uploaded.bucket
        ),
    }))
}
