use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::AppState;
use crate::utils::success_to_api_response;

#[derive(Debug, Serialize)]
pub struct PingResponse {
    /// 后端可达时为 ok，否则为 degraded
    pub status: &'static str,
    pub backend_reachable: bool,
    pub timestamp: i64,
}

/// 健康检查。服务本身存活就返回 200，后端状态放在响应体里
pub async fn ping(State(state): State<AppState>) -> impl IntoResponse {
    let backend_reachable = match state.backend.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Backend {} unreachable: {}", state.config.backend_url, e);
            false
        }
    };

    (
        StatusCode::OK,
        success_to_api_response(PingResponse {
            status: if backend_reachable { "ok" } else { "degraded" },
            backend_reachable,
            timestamp: chrono::Utc::now().timestamp(),
        }),
    )
}
