use axum::{
    body::Body,
    extract::{Path, State},
    response::Response,
};

use crate::{error::ApiError, state::AppState};

/// Serves stored blobs (avatars, task attachments) by storage key.
/// Public, like the CDN the source system delegated to.
pub async fn serve(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    // Keys are server-generated uuid paths; anything else is rejected.
    if key.split('/').any(|segment| segment.is_empty() || segment == "..") {
        return Err(ApiError::BadRequest("Invalid file key".to_string()));
    }

    let contents = state.storage.read(&key).await?;

    Ok(Response::builder()
        .header("Content-Type", "application/octet-stream")
        .body(Body::from(contents))
        .unwrap())
}
