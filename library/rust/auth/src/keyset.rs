//! 署名鍵セット: IdP が公開する JWKS の取得・キャッシュ・kid による参照。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::AuthError;

/// JWKS 取得の HTTP タイムアウト。
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JwkKey は取得した JWK 鍵の公開情報。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JwkKey {
    pub kid: String,
    pub kty: String,
    /// 鍵に紐づく署名アルゴリズム。指定がある場合は検証をこのアルゴリズムに固定する。
    #[serde(default)]
    pub alg: Option<String>,
    pub n: String,
    pub e: String,
}

/// JWKS ドキュメント。RSA 以外の鍵も混在しうるため要素は JSON のまま受ける。
#[derive(Debug, Deserialize)]
struct JwksDocument {
    #[serde(default)]
    keys: Vec<serde_json::Value>,
}

/// JWKS ドキュメントから RSA 公開鍵だけを取り出す。
pub fn parse_jwks(document: &str) -> Result<Vec<JwkKey>, AuthError> {
    let doc: JwksDocument = serde_json::from_str(document)
        .map_err(|e| AuthError::JwksFetchFailed(format!("malformed JWKS document: {}", e)))?;
    Ok(rsa_keys(doc))
}

fn rsa_keys(doc: JwksDocument) -> Vec<JwkKey> {
    doc.keys
        .into_iter()
        .filter_map(|v| serde_json::from_value::<JwkKey>(v).ok())
        .filter(|k| k.kty == "RSA")
        .collect()
}

/// KeySetProvider は kid から署名鍵を引く読み取り専用の機能。
#[async_trait::async_trait]
pub trait KeySetProvider: Send + Sync {
    /// kid に一致する鍵を返す。見つからない場合は `Ok(None)`。
    async fn lookup(&self, kid: &str) -> Result<Option<JwkKey>, AuthError>;
}

/// StaticKeySet はプロセス起動時に確定した鍵セット。
#[derive(Debug, Clone, Default)]
pub struct StaticKeySet {
    keys: HashMap<String, JwkKey>,
}

impl StaticKeySet {
    pub fn new(keys: Vec<JwkKey>) -> Self {
        Self {
            keys: keys.into_iter().map(|k| (k.kid.clone(), k)).collect(),
        }
    }

    /// JWKS JSON ドキュメントから生成する。
    pub fn from_jwks_json(document: &str) -> Result<Self, AuthError> {
        Ok(Self::new(parse_jwks(document)?))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait::async_trait]
impl KeySetProvider for StaticKeySet {
    async fn lookup(&self, kid: &str) -> Result<Option<JwkKey>, AuthError> {
        Ok(self.keys.get(kid).cloned())
    }
}

/// JwksFetcher は JWKS エンドポイントからの鍵取得を抽象化するトレイト。
#[async_trait::async_trait]
pub trait JwksFetcher: Send + Sync {
    async fn fetch_keys(&self, jwks_url: &str) -> Result<Vec<JwkKey>, AuthError>;
}

/// HttpJwksFetcher は HTTP 経由で JWKS を取得するデフォルト実装。
pub struct HttpJwksFetcher {
    client: reqwest::Client,
}

impl HttpJwksFetcher {
    /// タイムアウト付きの HTTP クライアントを生成する。生成に失敗した場合はエラーを返す。
    pub fn new(timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::JwksFetchFailed(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch_keys(&self, jwks_url: &str) -> Result<Vec<JwkKey>, AuthError> {
        let doc: JwksDocument = self
            .client
            .get(jwks_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthError::JwksFetchFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::JwksFetchFailed(e.to_string()))?;

        Ok(rsa_keys(doc))
    }
}

/// JWKS キャッシュ。
struct JwksCache {
    keys: Vec<JwkKey>,
    fetched_at: Instant,
}

/// CachedKeySet は JWKS エンドポイントから取得した鍵を TTL の間キャッシュする。
pub struct CachedKeySet {
    jwks_url: String,
    cache_ttl: Duration,
    cache: RwLock<Option<JwksCache>>,
    fetcher: Arc<dyn JwksFetcher>,
}

impl CachedKeySet {
    /// HTTP フェッチャーを使う CachedKeySet を生成する。
    pub fn new(jwks_url: &str, cache_ttl: Duration) -> Result<Self, AuthError> {
        let fetcher = HttpJwksFetcher::new(JWKS_FETCH_TIMEOUT)?;
        Ok(Self::with_fetcher(jwks_url, cache_ttl, Arc::new(fetcher)))
    }

    /// カスタムフェッチャーを使う CachedKeySet を生成する（テスト用）。
    pub fn with_fetcher(jwks_url: &str, cache_ttl: Duration, fetcher: Arc<dyn JwksFetcher>) -> Self {
        Self {
            jwks_url: jwks_url.to_string(),
            cache_ttl,
            cache: RwLock::new(None),
            fetcher,
        }
    }

    /// キャッシュから鍵を取得する。TTL を超えている場合は再取得する。
    ///
    /// 再取得に失敗した場合、古いキャッシュがあればそれを返し警告ログを出す。
    pub async fn get_keys(&self) -> Result<Vec<JwkKey>, AuthError> {
        // Read lock でキャッシュを確認
        {
            let cache = self.cache.read().await;
            if let Some(ref c) = *cache {
                if c.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(c.keys.clone());
                }
            }
        }

        // Write lock で再取得
        let mut cache = self.cache.write().await;

        // ダブルチェック
        if let Some(ref c) = *cache {
            if c.fetched_at.elapsed() < self.cache_ttl {
                return Ok(c.keys.clone());
            }
        }

        match self.fetcher.fetch_keys(&self.jwks_url).await {
            Ok(keys) => {
                tracing::debug!(jwks_url = %self.jwks_url, count = keys.len(), "JWKS fetched");
                *cache = Some(JwksCache {
                    keys: keys.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(keys)
            }
            Err(e) => match *cache {
                Some(ref stale) => {
                    tracing::warn!(
                        jwks_url = %self.jwks_url,
                        error = %e,
                        "JWKS refresh failed, serving stale keys"
                    );
                    Ok(stale.keys.clone())
                }
                None => Err(e),
            },
        }
    }

    /// キャッシュを無効化する。鍵ローテーション時に使用。
    pub async fn invalidate_cache(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }
}

#[async_trait::async_trait]
impl KeySetProvider for CachedKeySet {
    async fn lookup(&self, kid: &str) -> Result<Option<JwkKey>, AuthError> {
        let keys = self.get_keys().await?;
        Ok(keys.into_iter().find(|k| k.kid == kid))
    }
}
