use axum::{
    body::{Body, to_bytes},
    http::{Request, header::CONTENT_LENGTH},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::error;

const MAX_LOGGED_BODY: usize = 4096;

/// 只取信封里的错误码和消息，`resp_data` 不记录
#[derive(Deserialize)]
struct ErrorEnvelope {
    code: i32,
    msg: String,
}

/// 记录 5xx 响应。批量失败 (502) 也走这里，便于和后端日志对照
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("{} {} -> {}, body unreadable: {}", method, uri, parts.status, e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
        Ok(envelope) => error!(
            "{} {} -> {} code={} msg={}",
            method, uri, parts.status, envelope.code, envelope.msg
        ),
        Err(_) => error!(
            "{} {} -> {} body={}",
            method,
            uri,
            parts.status,
            String::from_utf8_lossy(&bytes)
        ),
    }

    // body 已被读出，长度以新 body 为准
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
