use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    backend::{Credential, RoomForm},
    error::AppError,
    utils::success_to_api_response,
    validation::validate_room,
};

#[axum::debug_handler]
pub async fn create_room(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Json(req): Json<RoomForm>,
) -> Result<impl IntoResponse, AppError> {
    validate_room(&req)?;

    let room = state.backend.create_room(&credential, &req).await?;
    tracing::info!("Created room {} ({} {})", room.id, room.building, room.room_number);

    Ok((StatusCode::CREATED, success_to_api_response(room)))
}
