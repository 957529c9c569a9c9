//! In-memory `CatalogApi` for stage tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::session::CatalogApi;

#[derive(Default)]
pub struct FakeApi {
    results: HashMap<String, Value>,
    failing_terms: HashSet<String>,
    prices: HashMap<String, String>,
    delay: Duration,
    search_calls: AtomicUsize,
    price_calls: Mutex<HashMap<String, usize>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body returned for `term`. Unknown terms get `[]`.
    pub fn with_results(mut self, term: &str, body: Value) -> Self {
        self.results.insert(term.to_string(), body);
        self
    }

    pub fn with_failing_term(mut self, term: &str) -> Self {
        self.failing_terms.insert(term.to_string());
        self
    }

    /// Price for `id`. Ids without one fail like a 404.
    pub fn with_price(mut self, id: &str, price: &str) -> Self {
        self.prices.insert(id.to_string(), price.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn price_calls(&self) -> HashMap<String, usize> {
        self.price_calls.lock().unwrap().clone()
    }

    pub fn total_price_calls(&self) -> usize {
        self.price_calls.lock().unwrap().values().sum()
    }

    /// Highest number of calls seen in flight at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogApi for FakeApi {
    async fn search(&self, term: &str) -> Result<Value> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await;
        self.leave();
        if self.failing_terms.contains(term) {
            bail!("503 Service Unavailable for term {}", term);
        }
        Ok(self
            .results
            .get(term)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    async fn price(&self, id: &str) -> Result<String> {
        *self
            .price_calls
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_insert(0) += 1;
        self.enter().await;
        self.leave();
        match self.prices.get(id) {
            Some(p) => Ok(p.trim().to_string()),
            None => bail!("404 Not Found for id {}", id),
        }
    }
}
