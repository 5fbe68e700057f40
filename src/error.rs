//! HTTP 层错误类型
//!
//! 只有两种对外可见的错误：缺少参数（400）与内部错误（500）。
//! 内部错误的具体原因只写日志，不返回给调用方

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorBody;

/// 500 响应统一返回的提示，与 `AppError::Internal` 的显示文本一致
pub const INTERNAL_ERROR_MESSAGE: &str = "No se pudieron obtener los datos del ticker";

#[derive(Debug, Error)]
pub enum AppError {
    /// 缺少 ticker 参数
    #[error("Falta el parámetro 'ticker'")]
    MissingTicker,

    /// 聚合过程中的任何失败
    #[error("No se pudieron obtener los datos del ticker")]
    Internal(#[source] anyhow::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingTicker => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}
