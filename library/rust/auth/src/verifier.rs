//! トークン検証器: Authorization ヘッダーから Bearer トークンを取り出し、署名鍵セットで検証する。

use std::str::FromStr;
use std::sync::Arc;

use http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

use crate::claims::Claims;
use crate::config::{AuthConfig, ConfigError};
use crate::error::AuthError;
use crate::keyset::{JwkKey, KeySetProvider};

/// TokenValidator はリクエストヘッダーから検証済み Claims を得る。
///
/// DB 参照や副作用は持たず、（ヘッダー, 鍵セット, 期待 audience / issuer）だけで結果が決まる。
pub struct TokenValidator {
    scheme: String,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    keys: Arc<dyn KeySetProvider>,
}

impl TokenValidator {
    /// 設定を検証して TokenValidator を生成する。
    pub fn new(config: &AuthConfig, keys: Arc<dyn KeySetProvider>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scheme: config.scheme.trim().to_string(),
            issuer: config.issuer(),
            audience: config.audience.clone(),
            algorithms: config.signing_algorithms()?,
            keys,
        })
    }

    /// Authorization ヘッダーから生のトークン文字列を取り出す。
    pub fn extract_token(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let mut values = headers.get_all(AUTHORIZATION).iter();
        let value = values.next().ok_or(AuthError::MissingHeader)?;
        if values.next().is_some() {
            return Err(AuthError::InvalidHeader(
                "Authorization header must be supplied once.".into(),
            ));
        }

        let value = value
            .to_str()
            .map_err(|_| AuthError::InvalidHeader("Authorization malformed.".into()))?;

        let parts: Vec<&str> = value.split_whitespace().collect();
        let Some(scheme) = parts.first() else {
            return Err(AuthError::InvalidHeader("Authorization malformed.".into()));
        };

        if !scheme.eq_ignore_ascii_case(&self.scheme) {
            return Err(AuthError::InvalidHeader(format!(
                "Authorization header must start with \"{}\".",
                self.scheme
            )));
        }

        match parts.len() {
            1 => Err(AuthError::InvalidHeader("Token not found.".into())),
            2 => Ok(parts[1].to_string()),
            _ => Err(AuthError::InvalidHeader(format!(
                "Authorization header must be {} token.",
                self.scheme
            ))),
        }
    }

    /// JWT トークン文字列を検証し、Claims を返す。
    pub async fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)
            .map_err(|_| AuthError::InvalidHeader("Authorization malformed.".into()))?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidHeader("Authorization malformed.".into()))?;

        let jwk = self
            .keys
            .lookup(&kid)
            .await?
            .ok_or(AuthError::KeyNotFound(kid))?;

        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = self.pinned_algorithms(&jwk)?;
        // 有効期限は猶予なしで判定する
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let data = decode::<Claims>(token, &key, &validation).map_err(map_jwt_error)?;

        Ok(data.claims)
    }

    /// ヘッダーの取り出しから署名検証までを一括で行う。
    pub async fn validate(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = self.extract_token(headers)?;
        self.verify_token(&token).await
    }

    /// 検証に使うアルゴリズムを決める。
    ///
    /// JWK が alg を宣言していればそれに固定し、宣言がなければ設定値をそのまま使う。
    /// トークンヘッダーの alg はこの集合に含まれない限り受け付けない。
    fn pinned_algorithms(&self, jwk: &JwkKey) -> Result<Vec<Algorithm>, AuthError> {
        let Some(ref name) = jwk.alg else {
            return Ok(self.algorithms.clone());
        };

        let alg = Algorithm::from_str(name)
            .map_err(|_| AuthError::InvalidToken(format!("unsupported key algorithm: {}", name)))?;
        if !self.algorithms.contains(&alg) {
            return Err(AuthError::InvalidToken(format!(
                "key algorithm not allowed: {}",
                name
            )));
        }
        Ok(vec![alg])
    }
}

/// jsonwebtoken のエラーを AuthError に変換する。
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => {
            AuthError::InvalidClaims(err.to_string())
        }
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidClaims(format!("missing required claim: {}", claim))
        }
        _ => AuthError::InvalidToken(err.to_string()),
    }
}
