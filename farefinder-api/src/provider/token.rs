use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use farefinder_core::{CoreError, CoreResult};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

/// A freshly issued access token and how long it stays valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: Duration,
}

#[async_trait]
pub trait TokenGrant: Send + Sync {
    async fn fetch(&self) -> CoreResult<IssuedToken>;
}

/// OAuth2 client-credentials grant against the provider's token endpoint.
pub struct ClientCredentialsGrant {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl ClientCredentialsGrant {
    pub fn new(http: reqwest::Client, base_url: &str, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            token_url: format!("{}/v1/security/oauth2/token", base_url.trim_end_matches('/')),
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl TokenGrant for ClientCredentialsGrant {
    async fn fetch(&self) -> CoreResult<IssuedToken> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CoreError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CoreError::UpstreamError { status: status.as_u16(), message });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CoreError::DecodeError(e.to_string()))?;

        Ok(IssuedToken {
            access_token: body.access_token,
            expires_in: Duration::from_secs(body.expires_in),
        })
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Caches the provider token and refreshes it ahead of expiry.
/// Concurrent callers share a single refresh.
pub struct TokenProvider {
    grant: Arc<dyn TokenGrant>,
    refresh_margin: Duration,
    cached: RwLock<Option<CachedToken>>,
    refresh_lock: Mutex<()>,
}

impl TokenProvider {
    pub fn new(grant: Arc<dyn TokenGrant>, refresh_margin: Duration) -> Self {
        Self {
            grant,
            refresh_margin,
            cached: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    async fn current(&self) -> Option<String> {
        let cached = self.cached.read().await;
        cached
            .as_ref()
            .filter(|token| Instant::now() + self.refresh_margin < token.expires_at)
            .map(|token| token.value.clone())
    }

    pub async fn access_token(&self) -> CoreResult<String> {
        if let Some(token) = self.current().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited
        if let Some(token) = self.current().await {
            return Ok(token);
        }

        tracing::debug!("Refreshing provider access token");
        let issued = self.grant.fetch().await?;
        let mut cached = self.cached.write().await;
        *cached = Some(CachedToken {
            value: issued.access_token.clone(),
            expires_at: Instant::now() + issued.expires_in,
        });
        Ok(issued.access_token)
    }

    /// Drop the cached token, e.g. after the provider rejected it.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGrant {
        calls: AtomicUsize,
        lifetime: Duration,
    }

    impl CountingGrant {
        fn new(lifetime: Duration) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), lifetime })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenGrant for CountingGrant {
        async fn fetch(&self) -> CoreResult<IssuedToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(IssuedToken {
                access_token: format!("token-{}", n),
                expires_in: self.lifetime,
            })
        }
    }

    struct FailingGrant;

    #[async_trait]
    impl TokenGrant for FailingGrant {
        async fn fetch(&self) -> CoreResult<IssuedToken> {
            Err(CoreError::UpstreamError { status: 401, message: "invalid_client".to_string() })
        }
    }

    #[tokio::test]
    async fn test_token_is_cached() {
        let grant = CountingGrant::new(Duration::from_secs(1799));
        let provider = TokenProvider::new(grant.clone(), Duration::from_secs(60));

        assert_eq!(provider.access_token().await.unwrap(), "token-1");
        assert_eq!(provider.access_token().await.unwrap(), "token-1");
        assert_eq!(grant.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_inside_margin() {
        let grant = CountingGrant::new(Duration::from_secs(120));
        let provider = TokenProvider::new(grant.clone(), Duration::from_secs(60));

        assert_eq!(provider.access_token().await.unwrap(), "token-1");
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(provider.access_token().await.unwrap(), "token-1");

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(provider.access_token().await.unwrap(), "token-2");
        assert_eq!(grant.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let grant = CountingGrant::new(Duration::from_secs(1799));
        let provider = TokenProvider::new(grant.clone(), Duration::from_secs(60));

        provider.access_token().await.unwrap();
        provider.invalidate().await;
        assert_eq!(provider.access_token().await.unwrap(), "token-2");
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_refresh() {
        let grant = CountingGrant::new(Duration::from_secs(1799));
        let provider = Arc::new(TokenProvider::new(grant.clone(), Duration::from_secs(60)));

        let (a, b) = tokio::join!(provider.access_token(), provider.access_token());
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(grant.calls(), 1);
    }

    #[tokio::test]
    async fn test_grant_failure_propagates() {
        let provider = TokenProvider::new(Arc::new(FailingGrant), Duration::from_secs(60));
        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, CoreError::UpstreamError { status: 401, .. }));
    }
}
