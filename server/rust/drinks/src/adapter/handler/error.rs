//! REST API のエラーレスポンス。
//!
//! 認可エラー（`coffeeshop_auth::AuthError`）とは別系統で、本文の形だけを揃える:
//! `{"success": false, "error": <status>, "message": <message>, "code": <code>}`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::usecase::create_drink::CreateDrinkError;
use crate::usecase::delete_drink::DeleteDrinkError;
use crate::usecase::list_drinks::ListDrinksError;
use crate::usecase::update_drink::UpdateDrinkError;

/// ApiError はハンドラーが返すエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("resource not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// 永続化層の障害。詳細はログにだけ残し、応答は 422 に揃える。
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable(_) | ApiError::Persistence(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad request",
            ApiError::NotFound => "resource not found",
            ApiError::MethodNotAllowed => "method not allowed",
            ApiError::Unprocessable(_) | ApiError::Persistence(_) => "unprocessable",
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound => "not_found",
            ApiError::MethodNotAllowed => "method_not_allowed",
            ApiError::Unprocessable(_) | ApiError::Persistence(_) => "unprocessable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Persistence(detail) => {
                tracing::error!(error = %detail, code = self.error_code(), "request failed");
            }
            ApiError::BadRequest(detail) | ApiError::Unprocessable(detail) => {
                tracing::debug!(reason = %detail, code = self.error_code(), "request rejected");
            }
            ApiError::NotFound | ApiError::MethodNotAllowed => {}
        }

        let status = self.status_code();
        let body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": self.message(),
            "code": self.error_code(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<ListDrinksError> for ApiError {
    fn from(e: ListDrinksError) -> Self {
        match e {
            ListDrinksError::Internal(msg) => ApiError::Persistence(msg),
        }
    }
}

impl From<CreateDrinkError> for ApiError {
    fn from(e: CreateDrinkError) -> Self {
        match e {
            CreateDrinkError::MissingField(_) | CreateDrinkError::Validation(_) => {
                ApiError::BadRequest(e.to_string())
            }
            CreateDrinkError::AlreadyExists(_) => ApiError::Unprocessable(e.to_string()),
            CreateDrinkError::Internal(msg) => ApiError::Persistence(msg),
        }
    }
}

impl From<UpdateDrinkError> for ApiError {
    fn from(e: UpdateDrinkError) -> Self {
        match e {
            UpdateDrinkError::NoChanges | UpdateDrinkError::Validation(_) => {
                ApiError::BadRequest(e.to_string())
            }
            UpdateDrinkError::NotFound(_) => ApiError::NotFound,
            UpdateDrinkError::AlreadyExists(_) => ApiError::Unprocessable(e.to_string()),
            UpdateDrinkError::Internal(msg) => ApiError::Persistence(msg),
        }
    }
}

impl From<DeleteDrinkError> for ApiError {
    fn from(e: DeleteDrinkError) -> Self {
        match e {
            DeleteDrinkError::NotFound(_) => ApiError::NotFound,
            DeleteDrinkError::Internal(msg) => ApiError::Persistence(msg),
        }
    }
}
