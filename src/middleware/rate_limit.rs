use crate::error::AppError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Sweep expired windows once the map grows past this many keys.
const PURGE_THRESHOLD: usize = 10_000;

/// `times` requests allowed per `per` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub times: u32,
    pub per: Duration,
}

impl RateLimitPolicy {
    pub const fn new(times: u32, seconds: u64) -> Self {
        Self {
            times,
            per: Duration::from_secs(seconds),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    per: Duration,
    count: u32,
}

impl Window {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.per
    }
}

#[derive(Debug)]
struct Windows {
    by_key: HashMap<String, Window>,
    /// Key count that triggers the next sweep.
    purge_at: usize,
}

impl Windows {
    fn purge_expired(&mut self, now: Instant) {
        self.by_key.retain(|_, window| !window.is_expired(now));
        self.purge_at = PURGE_THRESHOLD.max(self.by_key.len() * 2);
        tracing::debug!(
            live = self.by_key.len(),
            next_purge_at = self.purge_at,
            "Purged expired rate limit windows"
        );
    }
}

/// Fixed-window request counter shared by every rate-limited route.
#[derive(Debug)]
pub struct RateLimiter {
    enabled: bool,
    trust_proxy: bool,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            trust_proxy: false,
            windows: Mutex::new(Windows {
                by_key: HashMap::new(),
                purge_at: PURGE_THRESHOLD,
            }),
        }
    }

    /// Keys clients by the first `X-Forwarded-For` hop instead of the peer
    /// address. Only for deployments behind a proxy that sets the header.
    pub fn trusting_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn trusts_proxy(&self) -> bool {
        self.trust_proxy
    }

    pub async fn check(&self, key: &str, policy: RateLimitPolicy) -> Result<(), AppError> {
        self.check_at(key, policy, Instant::now()).await
    }

    /// Counts one request for `key` at `now`. Over the limit, returns
    /// `RateLimited` with the seconds left in the current window.
    pub async fn check_at(
        &self,
        key: &str,
        policy: RateLimitPolicy,
        now: Instant,
    ) -> Result<(), AppError> {
        if !self.enabled {
            return Ok(());
        }

        let mut windows = self.windows.lock().await;

        if windows.by_key.len() > windows.purge_at {
            windows.purge_expired(now);
        }

        let window = windows.by_key.entry(key.to_string()).or_insert(Window {
            started: now,
            per: policy.per,
            count: 0,
        });

        if window.is_expired(now) {
            window.started = now;
            window.per = policy.per;
            window.count = 0;
        }

        if window.count >= policy.times {
            let elapsed = now.saturating_duration_since(window.started);
            let remaining = window.per.saturating_sub(elapsed);
            // Round up so clients never retry inside the window
            let retry_after_secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
            tracing::warn!(key, retry_after_secs, "Rate limit exceeded");
            return Err(AppError::RateLimited {
                retry_after_secs: retry_after_secs.max(1),
            });
        }

        window.count += 1;
        Ok(())
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.by_key.len()
    }
}

/// Middleware state for one route: the shared limiter plus the route's policy.
#[derive(Clone)]
pub struct RouteLimit {
    pub limiter: Arc<RateLimiter>,
    pub policy: RateLimitPolicy,
}

impl RouteLimit {
    pub fn new(limiter: Arc<RateLimiter>, times: u32, seconds: u64) -> Self {
        Self {
            limiter,
            policy: RateLimitPolicy::new(times, seconds),
        }
    }
}

/// Client address. The first `X-Forwarded-For` hop is used only when
/// `trust_proxy` is set; otherwise the peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string);

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn enforce_rate_limit(
    State(limit): State<RouteLimit>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if limit.limiter.is_enabled() {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let key = format!(
            "{}:{}",
            client_ip(request.headers(), peer, limit.limiter.trusts_proxy()),
            request.uri().path()
        );
        limit.limiter.check(&key, limit.policy).await?;
    }

    Ok(next.run(request).await)
}
