use axum::{body::Body, http::Request, middleware::Next, response::Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{backend::Credential, error::AppError};

/// 取出 bearer 凭据放进请求扩展，后续转发给后端。
///
/// 这里不校验令牌，由后端负责鉴权。
pub async fn auth_middleware(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().trim().to_string())
        .filter(|token| !token.is_empty());

    match bearer {
        Some(token) => {
            req.extensions_mut().insert(Credential::new(token));
            Ok(next.run(req).await)
        }
        None => {
            tracing::warn!("Rejected request without bearer credential: {}", req.uri());
            Err(AppError::Unauthorized)
        }
    }
}
