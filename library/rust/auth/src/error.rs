//! 認可ゲートのエラー型。

use http::StatusCode;

/// AuthError は認証・認可エラーを表す。
///
/// ゲートのすべての失敗経路はこの型の値を 1 つだけ返す。
/// HTTP ステータス・機械可読コード・説明文への変換は
/// `status_code` / `error_code` / `description` で行う。
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("invalid Authorization header: {0}")]
    InvalidHeader(String),

    #[error("no signing key for kid: {0}")]
    KeyNotFound(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    #[error("permissions claim missing or not an array")]
    PermissionsMissing,

    #[error("permission not found: {0}")]
    PermissionDenied(String),

    #[error("JWKS fetch failed: {0}")]
    JwksFetchFailed(String),
}

impl AuthError {
    /// HTTP ステータスコードを返す。
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader
            | AuthError::InvalidHeader(_)
            | AuthError::KeyNotFound(_)
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired
            | AuthError::InvalidClaims(_) => StatusCode::UNAUTHORIZED,
            AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AuthError::JwksFetchFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// 機械可読なエラーコードを返す。
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::InvalidHeader(_) | AuthError::KeyNotFound(_) | AuthError::InvalidToken(_) => {
                "invalid_header"
            }
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::PermissionDenied(_) => "unauthorized",
            AuthError::JwksFetchFailed(_) => "jwks_unavailable",
        }
    }

    /// クライアントに返す説明文。内部の詳細（kid や jsonwebtoken のエラー文）は含めない。
    pub fn description(&self) -> String {
        match self {
            AuthError::MissingHeader => "Authorization header is expected.".into(),
            AuthError::InvalidHeader(reason) => reason.clone(),
            AuthError::KeyNotFound(_) => "Unable to find the appropriate key.".into(),
            AuthError::InvalidToken(_) => "Unable to parse authentication token.".into(),
            AuthError::TokenExpired => "Token expired.".into(),
            AuthError::InvalidClaims(_) => {
                "Incorrect claims. Please, check the audience and issuer.".into()
            }
            AuthError::PermissionsMissing => "Permissions not included in JWT.".into(),
            AuthError::PermissionDenied(_) => "Permission not found.".into(),
            AuthError::JwksFetchFailed(_) => "Unable to fetch signing keys.".into(),
        }
    }
}
