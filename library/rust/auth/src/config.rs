//! 認可ゲートの設定。

use std::str::FromStr;

use jsonwebtoken::Algorithm;
use serde::Deserialize;

/// AuthConfig は JWT 認証の設定を表す。
///
/// プロセス起動時に読み込み、以後は変更しない。
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// IdP のドメイン（例: `coffee.us.auth0.com`）。issuer と JWKS URL の導出に使う。
    pub domain: String,
    /// トークンの期待オーディエンス
    pub audience: String,
    /// 受け付ける署名アルゴリズム
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<String>,
    /// Authorization ヘッダーのスキームキーワード（大文字小文字は区別しない）
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// JWKS の取得先。未指定時は domain から導出する。
    #[serde(default)]
    pub jwks_url: Option<String>,
    #[serde(default = "default_jwks_cache_ttl_secs")]
    pub jwks_cache_ttl_secs: u64,
}

fn default_algorithms() -> Vec<String> {
    vec!["RS256".to_string()]
}

fn default_scheme() -> String {
    "bearer".to_string()
}

fn default_jwks_cache_ttl_secs() -> u64 {
    3600
}

/// ConfigError は AuthConfig の検証エラーを表す。
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("auth config field must not be empty: {0}")]
    EmptyField(&'static str),

    #[error("at least one signing algorithm must be configured")]
    NoAlgorithms,

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl AuthConfig {
    /// 既定値（RS256 / bearer / JWKS TTL 1 時間）で AuthConfig を生成する。
    pub fn new(domain: &str, audience: &str) -> Self {
        Self {
            domain: domain.to_string(),
            audience: audience.to_string(),
            algorithms: default_algorithms(),
            scheme: default_scheme(),
            jwks_url: None,
            jwks_cache_ttl_secs: default_jwks_cache_ttl_secs(),
        }
    }

    /// スキームや末尾スラッシュを除いたドメイン。
    fn host(&self) -> &str {
        let domain = self.domain.trim();
        let domain = domain
            .strip_prefix("https://")
            .or_else(|| domain.strip_prefix("http://"))
            .unwrap_or(domain);
        domain.trim_end_matches('/')
    }

    /// 期待する issuer（`https://{domain}/`）。
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.host())
    }

    /// JWKS の取得先 URL。
    pub fn jwks_url(&self) -> String {
        match self.jwks_url {
            Some(ref url) => url.clone(),
            None => format!("https://{}/.well-known/jwks.json", self.host()),
        }
    }

    /// 設定された署名アルゴリズムを解析する。
    ///
    /// JWKS は RSA 公開鍵 (n, e) のみを扱うため、RS / PS 系以外は拒否する。
    /// 共通鍵の HS 系を許すと公開鍵を HMAC 鍵として悪用されるため受け付けない。
    pub fn signing_algorithms(&self) -> Result<Vec<Algorithm>, ConfigError> {
        if self.algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms);
        }

        self.algorithms
            .iter()
            .map(|name| {
                let alg = Algorithm::from_str(name.trim())
                    .map_err(|_| ConfigError::UnsupportedAlgorithm(name.clone()))?;
                match alg {
                    Algorithm::RS256
                    | Algorithm::RS384
                    | Algorithm::RS512
                    | Algorithm::PS256
                    | Algorithm::PS384
                    | Algorithm::PS512 => Ok(alg),
                    _ => Err(ConfigError::UnsupportedAlgorithm(name.clone())),
                }
            })
            .collect()
    }

    /// 起動時に設定全体を検証する。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host().is_empty() {
            return Err(ConfigError::EmptyField("domain"));
        }
        if self.audience.trim().is_empty() {
            return Err(ConfigError::EmptyField("audience"));
        }
        if self.scheme.trim().is_empty() {
            return Err(ConfigError::EmptyField("scheme"));
        }
        self.signing_algorithms()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_yaml_like_json() {
        let cfg: AuthConfig = serde_json::from_str(
            r#"{"domain": "coffee.us.auth0.com", "audience": "drinks"}"#,
        )
        .unwrap();
        assert_eq!(cfg.algorithms, vec!["RS256"]);
        assert_eq!(cfg.scheme, "bearer");
        assert_eq!(cfg.jwks_cache_ttl_secs, 3600);
        assert!(cfg.jwks_url.is_none());
    }

    #[test]
    fn test_issuer_and_jwks_url_derived_from_domain() {
        let cfg = AuthConfig::new("coffee.us.auth0.com", "drinks");
        assert_eq!(cfg.issuer(), "https://coffee.us.auth0.com/");
        assert_eq!(
            cfg.jwks_url(),
            "https://coffee.us.auth0.com/.well-known/jwks.json"
        );
    }

    #[test]
    fn test_domain_with_scheme_and_trailing_slash() {
        let cfg = AuthConfig::new("https://coffee.us.auth0.com/", "drinks");
        assert_eq!(cfg.issuer(), "https://coffee.us.auth0.com/");
    }

    #[test]
    fn test_explicit_jwks_url() {
        let mut cfg = AuthConfig::new("coffee.us.auth0.com", "drinks");
        cfg.jwks_url = Some("http://localhost:9000/jwks".into());
        assert_eq!(cfg.jwks_url(), "http://localhost:9000/jwks");
    }

    #[test]
    fn test_signing_algorithms() {
        let mut cfg = AuthConfig::new("d", "a");
        cfg.algorithms = vec!["RS256".into(), "PS384".into()];
        assert_eq!(
            cfg.signing_algorithms().unwrap(),
            vec![Algorithm::RS256, Algorithm::PS384]
        );
    }

    #[test]
    fn test_rejects_symmetric_algorithm() {
        let mut cfg = AuthConfig::new("d", "a");
        cfg.algorithms = vec!["HS256".into()];
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::UnsupportedAlgorithm("HS256".into()))
        );
    }

    #[test]
    fn test_rejects_unknown_algorithm() {
        let mut cfg = AuthConfig::new("d", "a");
        cfg.algorithms = vec!["none".into()];
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_rejects_empty_fields() {
        let mut cfg = AuthConfig::new("d", "a");
        cfg.algorithms.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::NoAlgorithms));

        let cfg = AuthConfig::new("https://", "a");
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyField("domain")));

        let cfg = AuthConfig::new("d", " ");
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyField("audience")));
    }
}
