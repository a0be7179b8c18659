//! Per-client sliding-window rate limiting

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::handlers::AppState;

/// Paths that are never limited.
const EXEMPT_PATHS: &[&str] = &["/", "/health"];

pub struct RateLimiter {
    limit: u32,
    period: Duration,
    log: Mutex<RequestLog>,
}

/// Request timestamps per client inside the current window.
struct RequestLog {
    hits: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

impl RequestLog {
    /// Drop every client with no requests left in the window. Runs at most
    /// once per period.
    fn sweep(&mut self, now: Instant, period: Duration) {
        if now.duration_since(self.last_sweep) < period {
            return;
        }
        self.hits.retain(|_, hits| {
            prune(hits, now, period);
            !hits.is_empty()
        });
        self.last_sweep = now;
    }
}

fn prune(hits: &mut VecDeque<Instant>, now: Instant, period: Duration) {
    while let Some(&oldest) = hits.front() {
        if now.duration_since(oldest) >= period {
            hits.pop_front();
        } else {
            break;
        }
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited,
}

impl RateLimiter {
    pub fn new(limit: u32, period: Duration) -> Self {
        Self {
            limit,
            period,
            log: Mutex::new(RequestLog {
                hits: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    /// Number of clients currently holding a request log entry.
    pub async fn tracked_clients(&self) -> usize {
        self.log.lock().await.hits.len()
    }

    pub async fn check(&self, client_id: &str, now: Instant) -> Decision {
        let mut log = self.log.lock().await;
        log.sweep(now, self.period);

        let hits = log.hits.entry(client_id.to_string()).or_default();
        prune(hits, now, self.period);

        let count = hits.len() as u32;
        if count >= self.limit {
            return Decision::Limited;
        }
        hits.push_back(now);
        Decision::Allowed {
            remaining: self.limit - count - 1,
        }
    }
}

fn client_id(req: &Request) -> String {
    if let Some(key) = req.headers().get("X-API-Key").and_then(|v| v.to_str().ok()) {
        return format!("api:{key}");
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limiter = &state.limiter;
    if !limiter.is_enabled() || EXEMPT_PATHS.contains(&req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let client = client_id(&req);
    match limiter.check(&client, Instant::now()).await {
        Decision::Limited => {
            tracing::warn!(client = %client, "Rate limit exceeded");
            Err(AppError::RateLimited {
                retry_after: limiter.period().as_secs(),
                limit: limiter.limit(),
            })
        }
        Decision::Allowed { remaining } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Limit", HeaderValue::from(limiter.limit()));
            headers.insert("X-RateLimit-Remaining", HeaderValue::from(remaining));
            Ok(response)
        }
    }
}
