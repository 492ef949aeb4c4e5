use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use lru::LruCache;
use qa_mocks_config::RateLimitSettings;
use std::marker::PhantomData;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::auth::bearer_token;
use crate::errors::{ErrorShape, WebError};

/// Token bucket state per client
#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
}

impl TokenBucket {
    fn new(max_tokens: u32, refill_rate: f64) -> Self {
        Self {
            tokens: max_tokens as f64,
            last_refill: Instant::now(),
            max_tokens: max_tokens as f64,
            refill_rate,
        }
    }

    fn try_consume(&mut self, tokens: f64) -> bool {
        self.refill();

        if self.tokens >= tokens {
            self.tokens -= tokens;
            true
        } else {
            false
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();

        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
    }

    fn time_until_available(&mut self) -> Duration {
        self.refill();

        if self.tokens >= 1.0 || self.refill_rate <= 0.0 {
            Duration::from_secs(0)
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.refill_rate)
        }
    }
}

/// Per-client token bucket limiter with a bounded client table
///
/// Clients are keyed by bearer token when one is present, otherwise by peer IP.
/// The least recently seen client is evicted once `max_clients` is reached.
#[derive(Debug)]
pub struct RateLimiter {
    burst_size: u32,
    refill_rate: f64,
    clients: Mutex<LruCache<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new(settings: &RateLimitSettings) -> Self {
        let capacity = NonZeroUsize::new(settings.max_clients).unwrap_or(NonZeroUsize::MIN);
        Self {
            burst_size: settings.burst_size.max(1),
            refill_rate: settings.requests_per_minute as f64 / 60.0,
            clients: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Consume one token for `client`, or report how long until one is available
    pub async fn check(&self, client: &str) -> Result<(), Duration> {
        let mut clients = self.clients.lock().await;
        let bucket = clients.get_or_insert_mut(client.to_string(), || {
            TokenBucket::new(self.burst_size, self.refill_rate)
        });

        if bucket.try_consume(1.0) {
            Ok(())
        } else {
            Err(bucket.time_until_available())
        }
    }

    /// Number of clients currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.clients.lock().await.len()
    }
}

/// State for [`rate_limit_middleware`]
pub struct RateLimitState<S> {
    limiter: Arc<RateLimiter>,
    shape: PhantomData<fn() -> S>,
}

impl<S> RateLimitState<S> {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self {
            limiter,
            shape: PhantomData,
        }
    }
}

impl<S> Clone for RateLimitState<S> {
    fn clone(&self) -> Self {
        Self::new(self.limiter.clone())
    }
}

fn client_key(request: &Request) -> String {
    if let Some(token) = bearer_token(request.headers()) {
        return format!("token:{}", token);
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Answer 429 with `Retry-After` once a client's bucket is empty
pub async fn rate_limit_middleware<S: ErrorShape>(
    State(state): State<RateLimitState<S>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);

    match state.limiter.check(&client).await {
        Ok(()) => {
            debug!(client = %client, "Rate limit check passed");
            next.run(request).await
        }
        Err(wait) => {
            let retry_after_secs = wait.as_secs_f64().ceil().max(1.0) as u64;
            warn!(client = %client, retry_after_secs, "Rate limit exceeded");
            S::respond(WebError::RateLimit { retry_after_secs })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StandardShape;
    use axum::{
        body::Body,
        http::{header, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use std::net::{IpAddr, Ipv4Addr};
    use tower::ServiceExt;

    fn settings(per_minute: u32, burst: u32) -> RateLimitSettings {
        RateLimitSettings {
            enabled: true,
            requests_per_minute: per_minute,
            burst_size: burst,
            max_clients: 2,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_bucket_refill() {
        let mut bucket = TokenBucket::new(5, 1.0); // 5 tokens, 1 token per second

        for _ in 0..5 {
            assert!(bucket.try_consume(1.0));
        }
        assert!(!bucket.try_consume(1.0));
        assert!(bucket.time_until_available() > Duration::ZERO);

        tokio::time::advance(Duration::from_millis(1100)).await;
        assert!(bucket.try_consume(1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_have_separate_buckets() {
        let limiter = RateLimiter::new(&settings(60, 1));

        assert!(limiter.check("a").await.is_ok());
        assert!(limiter.check("a").await.is_err());
        assert!(limiter.check("b").await.is_ok());

        // Capacity is two clients, so a third evicts the oldest
        assert!(limiter.check("c").await.is_ok());
        assert_eq!(limiter.tracked_clients().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_middleware_returns_429_with_retry_after() {
        let limiter = Arc::new(RateLimiter::new(&settings(60, 2)));
        let app = Router::new()
            .route("/test", get(|| async { "success" }))
            .layer(middleware::from_fn_with_state(
                RateLimitState::<StandardShape>::new(limiter),
                rate_limit_middleware::<StandardShape>,
            ));

        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);
        let request = || {
            Request::builder()
                .uri("/test")
                .extension(ConnectInfo(addr))
                .body(Body::empty())
                .unwrap()
        };

        assert_eq!(app.clone().oneshot(request()).await.unwrap().status(), StatusCode::OK);
        assert_eq!(app.clone().oneshot(request()).await.unwrap().status(), StatusCode::OK);

        let limited = app.oneshot(request()).await.unwrap();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(limited.headers()[header::RETRY_AFTER], "1");
    }
}
