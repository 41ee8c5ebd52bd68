use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::backend::BackendError;
use crate::utils::{error_codes, error_to_api_response, error_with_data_to_api_response};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// 表单校验失败的全部字段，发起任何网络请求之前返回
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|err| err.field == field)
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|err| err.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("未授权访问")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{failed}/{total} 个操作失败，分配可能只完成了一部分")]
    PartialBatch { failed: usize, total: usize },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("内部服务器错误")]
    Internal,
}

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        let mut errors = ValidationErrors::default();
        errors.push(field, message);
        AppError::Validation(errors)
    }

    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AppError::PartialBatch { .. } => (StatusCode::BAD_GATEWAY, error_codes::BATCH_FAILED),
            AppError::Backend(err) => match err.status() {
                // 后端拒绝表单内容（如用户名重复），原样作为请求错误返回
                Some(400 | 409 | 422) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
                Some(404) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
                Some(401) => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
                Some(403) => (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED),
                _ => (StatusCode::BAD_GATEWAY, error_codes::BACKEND_ERROR),
            },
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let msg = self.to_string();

        match self {
            AppError::Validation(errors) => {
                (status, error_with_data_to_api_response(code, msg, errors)).into_response()
            }
            _ => (status, error_to_api_response::<()>(code, msg)).into_response(),
        }
    }
}
