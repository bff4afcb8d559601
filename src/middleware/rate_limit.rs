use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};

use crate::error::ApiError;

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Checks between sweeps of idle client entries
const PRUNE_EVERY: u64 = 1024;

/// Per-client request limiter: `max_requests` per `window`, refilled evenly.
///
/// Clients are keyed by socket peer address. `X-Forwarded-For` is only
/// consulted when [`RateLimit::trust_proxy`] is set, since clients can
/// write any value into it.
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<KeyedLimiter>,
    message: &'static str,
    trust_proxy: bool,
    checks: Arc<AtomicU64>,
}

impl RateLimit {
    pub fn new(max_requests: u32, window: Duration, message: &'static str) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window / burst.get())
            .map(|quota| quota.allow_burst(burst))
            .unwrap_or_else(|| Quota::per_second(burst));
        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
            message,
            trust_proxy: false,
            checks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// General `/api` limiter
    pub fn general(max_requests: u32, window: Duration) -> Self {
        Self::new(max_requests, window, "Too many requests from this IP, please try again later")
    }

    /// Stricter limiter for credential endpoints
    pub fn auth(max_requests: u32, window: Duration) -> Self {
        Self::new(max_requests, window, "Too many authentication attempts, please try again later")
    }

    /// Key on the first `X-Forwarded-For` hop; only for deployments behind a proxy that sets it
    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    pub fn check(&self, client: &str) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }
        self.limiter.check_key(&client.to_string()).is_ok()
    }

    /// Drop entries whose quota has fully refilled
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    fn client_key(&self, request: &Request) -> String {
        let forwarded = if self.trust_proxy { forwarded_for(request) } else { None };
        forwarded
            .or_else(|| {
                request
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

pub async fn rate_limit_middleware(
    State(limit): State<RateLimit>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = limit.client_key(&request);
    if !limit.check(&client) {
        tracing::warn!("Rate limit exceeded for {} on {}", client, request.uri().path());
        return Err(ApiError::too_many_requests(limit.message));
    }
    Ok(next.run(request).await)
}

fn forwarded_for(request: &Request) -> Option<String> {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_burst_then_rejects_per_client() {
        let limit = RateLimit::auth(5, Duration::from_secs(900));
        for _ in 0..5 {
            assert!(limit.check("10.0.0.1"));
        }
        assert!(!limit.check("10.0.0.1"));
        assert!(limit.check("10.0.0.2"));
    }

    fn request(forwarded: Option<&str>, peer: Option<[u8; 4]>) -> Request {
        let mut builder = axum::http::Request::builder();
        if let Some(forwarded) = forwarded {
            builder = builder.header("x-forwarded-for", forwarded);
        }
        let mut request = builder.body(axum::body::Body::empty()).unwrap();
        if let Some(ip) = peer {
            request.extensions_mut().insert(ConnectInfo(SocketAddr::from((ip, 40000))));
        }
        request
    }

    #[test]
    fn peer_address_is_the_default_key() {
        let limit = RateLimit::general(10, Duration::from_secs(60));
        let spoofed = request(Some("203.0.113.9"), Some([192, 0, 2, 7]));
        assert_eq!(limit.client_key(&spoofed), "192.0.2.7");
        assert_eq!(limit.client_key(&request(Some("203.0.113.9"), None)), "unknown");
    }

    #[test]
    fn forwarded_header_only_behind_trusted_proxy() {
        let limit = RateLimit::general(10, Duration::from_secs(60)).trust_proxy(true);
        let proxied = request(Some("203.0.113.9, 10.0.0.1"), Some([10, 0, 0, 1]));
        assert_eq!(limit.client_key(&proxied), "203.0.113.9");
        assert_eq!(limit.client_key(&request(None, Some([10, 0, 0, 1]))), "10.0.0.1");
    }

    #[test]
    fn refilled_clients_are_pruned() {
        let limit = RateLimit::general(1000, Duration::from_millis(1));
        for n in 0..50 {
            limit.check(&format!("198.51.100.{}", n));
        }
        assert_eq!(limit.tracked_clients(), 50);
        std::thread::sleep(Duration::from_millis(20));
        limit.prune();
        assert_eq!(limit.tracked_clients(), 0);
    }
}
