//! coffeeshop-auth: Bearer トークンの JWKS 検証 + パーミッション認可ライブラリ
//!
//! 外部 IdP が公開する JWKS の公開鍵で JWT の署名を検証し、
//! `permissions` Claim に必要なパーミッション文字列が含まれるかを判定する。
//!
//! # 使い方
//!
//! ```ignore
//! use coffeeshop_auth::{require_auth, AuthConfig, AuthGate, CachedKeySet, TokenValidator};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = AuthConfig::new("coffee.us.auth0.com", "drinks");
//! let keys = Arc::new(CachedKeySet::new(&config.jwks_url(), Duration::from_secs(3600))?);
//! let gate = AuthGate::new(Arc::new(TokenValidator::new(&config, keys)?));
//!
//! let app = Router::new().route(
//!     "/drinks-detail",
//!     get(handler).route_layer(axum::middleware::from_fn(require_auth(gate, "get:drinks-detail"))),
//! );
//! ```

pub mod claims;
pub mod config;
pub mod error;
pub mod keyset;
pub mod middleware;
pub mod rbac;
pub mod verifier;

pub use claims::Claims;
pub use config::{AuthConfig, ConfigError};
pub use error::AuthError;
pub use keyset::{
    CachedKeySet, HttpJwksFetcher, JwkKey, JwksFetcher, KeySetProvider, StaticKeySet,
};
pub use middleware::{require_auth, AuthGate};
pub use rbac::check_permissions;
pub use verifier::TokenValidator;
