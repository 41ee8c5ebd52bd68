use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    backend::{Credential, GroupForm},
    eligibility::{ensure_valid_parent, parent_group_candidates},
    error::AppError,
    models::GroupId,
    utils::success_to_api_response,
    validation::normalize_group,
};

#[axum::debug_handler]
pub async fn parent_candidates(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Path(group_id): Path<GroupId>,
) -> Result<impl IntoResponse, AppError> {
    let groups = state.backend.list_groups(&credential).await?;
    if !groups.iter().any(|group| group.id == group_id) {
        return Err(AppError::NotFound(format!("群组 {} 不存在", group_id)));
    }

    let candidates = parent_group_candidates(&groups, Some(group_id))
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, success_to_api_response(candidates)))
}

#[axum::debug_handler]
pub async fn update_group(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Path(group_id): Path<GroupId>,
    Json(req): Json<GroupForm>,
) -> Result<impl IntoResponse, AppError> {
    let form = normalize_group(req)?;
    ensure_valid_parent(group_id, form.parent_id)?;

    let group = state
        .backend
        .update_group(&credential, group_id, &form)
        .await?;
    tracing::info!("Updated group {} ({})", group.id, group.name);

    Ok((StatusCode::OK, success_to_api_response(group)))
}
