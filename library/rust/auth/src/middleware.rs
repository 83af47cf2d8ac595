//! axum 用の認可ミドルウェア。

use std::sync::Arc;

use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use http::HeaderMap;
use serde_json::json;

use crate::claims::Claims;
use crate::error::AuthError;
use crate::rbac;
use crate::verifier::TokenValidator;

/// ミドルウェアファクトリの戻り値型。
type AuthMiddlewareFuture = std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>,
>;

/// AuthGate はトークン検証とパーミッション判定をまとめた共有状態。
#[derive(Clone)]
pub struct AuthGate {
    validator: Arc<TokenValidator>,
}

impl AuthGate {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }

    /// ヘッダーを検証し、必要なパーミッションを確認したうえで Claims を返す。
    pub async fn authorize(&self, headers: &HeaderMap, permission: &str) -> Result<Claims, AuthError> {
        let claims = self.validator.validate(headers).await?;
        rbac::check_permissions(permission, &claims)?;
        Ok(claims)
    }
}

/// require_auth は指定パーミッションを必須とするミドルウェアファクトリ。
///
/// ルート登録時に `axum::middleware::from_fn` で包んで使う。
/// 成功時は Claims をリクエストエクステンションに格納してハンドラーを呼び、
/// 失敗時はハンドラーを呼ばずに AuthError をそのままレスポンスにする。
pub fn require_auth(
    gate: AuthGate,
    permission: &'static str,
) -> impl Fn(Request<Body>, Next) -> AuthMiddlewareFuture + Clone {
    move |req: Request<Body>, next: Next| {
        let gate = gate.clone();
        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            let claims = match gate.authorize(&parts.headers, permission).await {
                Ok(claims) => claims,
                Err(e) => {
                    tracing::warn!(
                        code = e.error_code(),
                        status = e.status_code().as_u16(),
                        permission,
                        method = %parts.method,
                        path = %parts.uri.path(),
                        error = %e,
                        "authorization failed"
                    );
                    return Err(e);
                }
            };

            tracing::debug!(claims = %claims, permission, "authorization granted");
            parts.extensions.insert(claims);

            Ok(next.run(Request::from_parts(parts, body)).await)
        })
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": self.description(),
            "code": self.error_code(),
        });

        (status, Json(body)).into_response()
    }
}
