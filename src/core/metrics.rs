//! Fileserver hit counting
//!
//! The counter is owned by the application state and shared by clone. Every
//! request routed through [`count_hits`] bumps it once.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared request counter for `/app`
#[derive(Debug, Clone, Default)]
pub struct HitCounter(Arc<AtomicU64>);

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn load(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Middleware that counts every request before passing it on
pub async fn count_hits(State(hits): State<HitCounter>, req: Request, next: Next) -> Response {
    hits.increment();
    next.run(req).await
}
