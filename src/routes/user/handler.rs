use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    AppState,
    assignment::{AssignmentPlan, AssignmentSnapshot, plan_user_assignments},
    backend::{BatchReport, Credential},
    error::AppError,
    models::UserId,
    utils::success_to_api_response,
    validation::{FormMode, validate_user},
};

use super::model::{AssignmentRequest, AssignmentResponse, UserRequest, UserResponse};

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Json(req): Json<UserRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_user(&req.user, FormMode::Create)?;

    // 授权人是当前操作员，先确认会话有效再创建用户
    let operator = state.backend.current_user(&credential).await?;
    let user = state.backend.create_user(&credential, &req.user).await?;
    tracing::info!("Created user {} ({})", user.id, user.username);

    let plan = plan_user_assignments(
        &AssignmentSnapshot::empty(user.id),
        req.assignments.groups,
        req.assignments.rooms,
        operator.id,
        Utc::now(),
    );
    let report = apply_plan(&state, &credential, &plan).await?;

    Ok((
        StatusCode::CREATED,
        success_to_api_response(UserResponse { user, plan, report }),
    ))
}

/// 先保存用户资料，再按勾选结果调整群组和房间
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Path(user_id): Path<UserId>,
    Json(req): Json<UserRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_user(&req.user, FormMode::Edit)?;

    let user = state
        .backend
        .update_user(&credential, user_id, &req.user)
        .await?;
    tracing::info!("Updated user {} ({})", user.id, user.username);

    let plan = plan_for(&state, &credential, user_id, req.assignments).await?;
    let report = apply_plan(&state, &credential, &plan).await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(UserResponse { user, plan, report }),
    ))
}

#[axum::debug_handler]
pub async fn preview_assignments(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Path(user_id): Path<UserId>,
    Json(req): Json<AssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let plan = plan_for(&state, &credential, user_id, req).await?;
    Ok((StatusCode::OK, success_to_api_response(plan)))
}

#[axum::debug_handler]
pub async fn update_assignments(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Path(user_id): Path<UserId>,
    Json(req): Json<AssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let plan = plan_for(&state, &credential, user_id, req).await?;
    let report = apply_plan(&state, &credential, &plan).await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(AssignmentResponse { plan, report }),
    ))
}

async fn apply_plan(
    state: &AppState,
    credential: &Credential,
    plan: &AssignmentPlan,
) -> Result<BatchReport, AppError> {
    if plan.is_empty() {
        return Ok(BatchReport::default());
    }
    state.backend.apply(credential, plan).await.into_result()
}

async fn plan_for(
    state: &AppState,
    credential: &Credential,
    user_id: UserId,
    req: AssignmentRequest,
) -> Result<AssignmentPlan, AppError> {
    let (operator, snapshot) = tokio::try_join!(
        state.backend.current_user(credential),
        state.backend.snapshot(credential, user_id),
    )?;

    Ok(plan_user_assignments(
        &snapshot,
        req.groups,
        req.rooms,
        operator.id,
        Utc::now(),
    ))
}
