use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed one-second window shared by every request of a route group.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    window: Arc<Mutex<WindowState>>,
}

impl RateLimiter {
    pub fn new(rps: u32) -> Self {
        Self {
            rps: rps.max(1),
            window: Arc::new(Mutex::new(WindowState {
                start: Instant::now(),
                count: 0,
            })),
        }
    }

    /// Returns `Err(wait)` with the time left in the current window when over budget.
    fn acquire_at(&self, now: Instant) -> Result<(), Duration> {
        let mut guard = match self.window.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let elapsed = now.saturating_duration_since(guard.start);
        if elapsed >= Duration::from_secs(1) {
            guard.start = now;
            guard.count = 0;
        }
        if guard.count < self.rps {
            guard.count += 1;
            Ok(())
        } else {
            Err(Duration::from_secs(1).saturating_sub(elapsed))
        }
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match limiter.acquire_at(Instant::now()) {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            tracing::warn!(path = %req.uri().path(), "rate limit exceeded");
            let retry_after = wait.as_secs().max(1).to_string();
            let mut resp = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "rate_limit_exceeded" })),
            )
                .into_response();
            if let Ok(value) = HeaderValue::from_str(&retry_after) {
                resp.headers_mut().insert(header::RETRY_AFTER, value);
            }
            resp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_allows_budget_then_refuses() {
        let limiter = RateLimiter::new(2);
        let t0 = Instant::now();
        assert!(limiter.acquire_at(t0).is_ok());
        assert!(limiter.acquire_at(t0).is_ok());
        let wait = limiter.acquire_at(t0 + Duration::from_millis(400)).unwrap_err();
        assert!(wait <= Duration::from_millis(600));
        assert!(wait > Duration::from_millis(500));
    }

    #[test]
    fn window_resets_after_a_second() {
        let limiter = RateLimiter::new(1);
        let t0 = Instant::now();
        assert!(limiter.acquire_at(t0).is_ok());
        assert!(limiter.acquire_at(t0).is_err());
        assert!(limiter.acquire_at(t0 + Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn zero_budget_is_raised_to_one() {
        let limiter = RateLimiter::new(0);
        assert!(limiter.acquire_at(Instant::now()).is_ok());
    }
}
