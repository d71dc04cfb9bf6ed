//! In-process transport serving the fixture documents.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use inline_svg::error::TransportError;
use inline_svg::services::{Transport, TransportResponse};

use super::fixtures;

/// Serves [`fixtures::svg_for`] bodies, 404 otherwise.
///
/// While held, every request waits for a permit from [`MockTransport::release`].
pub struct MockTransport {
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
    gate: Semaphore,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
        })
    }

    /// Start with requests blocked until released
    pub fn held() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
            gate: Semaphore::new(0),
        })
    }

    /// Let `n` waiting (or future) requests complete
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        let permit = self.gate.acquire().await.unwrap();
        permit.forget();

        Ok(match fixtures::svg_for(url) {
            Some(body) => TransportResponse {
                status: 200,
                body: body.to_string(),
            },
            None => TransportResponse {
                status: 404,
                body: "Not Found".to_string(),
            },
        })
    }
}
