//! Per-client rate limiting for the unauthenticated auth endpoints.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, RwLock},
};

use crate::app::AppState;
use crate::error::ApiError;

type ClientRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// One limiter per client address.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<String, Arc<ClientRateLimiter>>>,
    quota: Quota,
    clock: DefaultClock,
}

impl RateLimiterState {
    /// Returns `None` when the limit is 0 (limiting disabled).
    pub fn new(rate_limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiters: RwLock::new(HashMap::new()),
            quota: Quota::per_minute(per_minute),
            clock: DefaultClock::default(),
        })
    }

    fn limiter_for(&self, client: &str) -> Arc<ClientRateLimiter> {
        {
            let limiters = self.limiters.read().unwrap_or_else(|e| e.into_inner());
            if let Some(limiter) = limiters.get(client) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().unwrap_or_else(|e| e.into_inner());
        limiters
            .entry(client.to_string())
            .or_insert_with(|| Arc::new(GovRateLimiter::direct(self.quota)))
            .clone()
    }

    /// `Err(retry_after_secs)` when the client is over its budget.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        self.limiter_for(client).check().map_err(|not_until| {
            not_until
                .wait_time_from(self.clock.now())
                .as_secs()
                .max(1)
        })
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clients = self
            .limiters
            .read()
            .map(|l| l.len())
            .unwrap_or_default();
        f.debug_struct("RateLimiterState")
            .field("quota", &self.quota)
            .field("clients", &clients)
            .finish()
    }
}

/// First `X-Forwarded-For` hop, else the peer address.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn auth_rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(req.headers(), peer);

    match limiter.check(&client) {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            tracing::warn!(client = %client, retry_after, "Auth rate limit exceeded");
            rate_limited_response(retry_after)
        }
    }
}

fn rate_limited_response(retry_after: u64) -> Response {
    let mut response = ApiError::RateLimited.into_response();
    if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_zero_limit_disables_limiting() {
        assert!(RateLimiterState::new(0).is_none());
    }

    #[test]
    fn test_budget_is_per_client() {
        let state = RateLimiterState::new(2).unwrap();

        assert!(state.check("10.0.0.1").is_ok());
        assert!(state.check("10.0.0.1").is_ok());
        let retry_after = state.check("10.0.0.1").unwrap_err();
        assert!(retry_after >= 1);

        assert!(state.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        assert_eq!(client_key(&headers, Some(peer)), "203.0.113.7");
        assert_eq!(client_key(&HeaderMap::new(), Some(peer)), "127.0.0.1");
        assert_eq!(client_key(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn test_rate_limited_response_has_retry_after() {
        let response = rate_limited_response(42);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "42");
    }
}
