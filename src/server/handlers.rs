//! Route handlers.

use super::{ApiError, AppState};
use crate::models::{DirectoryStatus, HealthResponse, MessageResponse, ProcessCloudResponse};
use crate::pipeline::{validate_content_type, validate_size, Upload};
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

const UPLOAD_FIELD: &str = "file";

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "SkyGram AI Backend is running!".to_string(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.pipeline.store();
    Json(HealthResponse {
        status: "healthy".to_string(),
        services: state.services.clone(),
        directories: DirectoryStatus {
            uploads: store.uploads_dir().display().to_string(),
            generated: store.generated_dir().display().to_string(),
        },
    })
}

/// Run an uploaded cloud photo through the full pipeline.
///
/// Expects a multipart body with the image in the `file` field. The content
/// type is checked before the file body is read.
pub async fn process_cloud(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessCloudResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        validate_content_type(content_type.as_deref())?;

        let bytes = field.bytes().await?;
        validate_size(bytes.len())?;

        let response = state
            .pipeline
            .process(Upload {
                content_type,
                bytes: bytes.to_vec(),
            })
            .await?;
        return Ok(Json(response));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

pub async fn original_image(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.pipeline.store().read_original(&session_id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}

pub async fn generated_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.pipeline.store().read_generated(&filename).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

pub async fn download_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.pipeline.store().read_generated(&filename).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, attachment_disposition(&filename)),
        ],
        bytes,
    ))
}

/// `attachment` disposition with an ASCII `filename` fallback and the exact
/// name in RFC 5987 `filename*` form.
fn attachment_disposition(filename: &str) -> String {
    let name = format!("cloud-art-{}", filename);
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(&name)
    )
}
