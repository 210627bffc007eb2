use crate::AppState;
use crate::api::error::AppError;
use crate::utils::naming::{output_name, sanitize_original, stored_input_name};
use axum::{
    Json,
    extract::{Multipart, State},
};
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::io::StreamReader;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub output_path: String,
}

struct StoredUpload {
    original: String,
    input_name: String,
}

/// Receive one image, hand it to the external processor, and answer with
/// the processed file's location. The stored input is deleted once the
/// processor has resolved, whatever the outcome; the retention sweeper
/// covers anything this leaves behind.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(
        content = String,
        description = "multipart/form-data body with an `image` file field",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 200, description = "Image processed", body = UploadResponse),
        (status = 400, description = "No image file provided"),
        (status = 500, description = "Processing failed or produced no output")
    ),
    tag = "processing"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut stored: Option<StoredUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name != "image" {
            continue;
        }

        let original = sanitize_original(field.file_name().unwrap_or("unnamed"));
        let input_name = stored_input_name(&original);

        // Stream the field straight to disk, never buffering the whole
        // body in memory.
        let body_with_io_error =
            field.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err));
        let reader = StreamReader::new(body_with_io_error);

        let written = state.store.put_stream(&input_name, Box::new(reader)).await?;
        tracing::info!("📥 Stored upload {} ({} bytes)", input_name, written);

        stored = Some(StoredUpload {
            original,
            input_name,
        });
        break;
    }

    let upload = stored.ok_or_else(|| AppError::BadRequest("No image file provided.".to_string()))?;

    let input_path = state.store.path_of(&upload.input_name);
    let out_name = output_name(&upload.original);
    let output_path = state.store.path_of(&out_name);

    let run_result = state.processor.run(&input_path, &output_path).await;

    // The input is no longer needed whatever happened. The sweeper may have
    // raced us to it; a failed delete here is logged, never escalated.
    if let Err(e) = state.store.delete(&upload.input_name).await {
        tracing::warn!("Failed to delete input {}: {}", upload.input_name, e);
    }

    let exit = run_result?;
    if !exit.success {
        tracing::warn!(
            "Processor exited with {:?} for {}",
            exit.code,
            upload.input_name
        );
        return Err(AppError::ProcessingFailed);
    }

    if !state.store.exists(&out_name).await? {
        tracing::warn!(
            "Processor exited cleanly but produced no {} for {}",
            out_name,
            upload.input_name
        );
        return Err(AppError::MissingOutput);
    }

    tracing::info!("📤 Processed {} -> {}", upload.input_name, out_name);
    Ok(Json(UploadResponse {
        success: true,
        output_path: output_path.to_string_lossy().into_owned(),
    }))
}
