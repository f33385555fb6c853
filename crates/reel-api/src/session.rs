//! Debounced search-as-you-type.
//!
//! Each `submit` starts a new generation: the previous pending lookup is
//! aborted and a fresh one waits out the debounce delay before querying.
//! Results are tagged with the generation that produced them, and anything
//! older than the current generation is dropped, so a slow response can
//! never overwrite newer input or resurrect results after `clear`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use reel_core::config::SearchConfig;

use crate::traits::{search_or_empty, MetadataService, SearchResult};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Results for one query generation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub generation: u64,
    pub query: String,
    pub results: Vec<SearchResult>,
}

pub struct SearchSession<S> {
    service: Arc<S>,
    delay: Duration,
    min_query_len: usize,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SearchOutcome>,
    rx: mpsc::UnboundedReceiver<SearchOutcome>,
    results: Vec<SearchResult>,
}

impl<S: MetadataService + 'static> SearchSession<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self::with_settings(service, DEFAULT_DEBOUNCE, DEFAULT_MIN_QUERY_LEN)
    }

    pub fn from_config(service: Arc<S>, config: &SearchConfig) -> Self {
        Self::with_settings(
            service,
            Duration::from_millis(config.debounce_ms),
            config.min_query_len,
        )
    }

    pub fn with_settings(service: Arc<S>, delay: Duration, min_query_len: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            service,
            delay,
            min_query_len,
            generation: 0,
            pending: None,
            tx,
            rx,
            results: Vec::new(),
        }
    }

    /// Current generation; bumped by every `submit` and `clear`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Latest accepted results.
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Schedule a lookup for `query`, superseding any pending one.
    ///
    /// Queries shorter than the minimum length clear the results without
    /// contacting the service.
    pub fn submit(&mut self, query: &str) -> u64 {
        self.supersede();
        let query = query.trim().to_string();

        if query.chars().count() < self.min_query_len {
            self.results.clear();
            return self.generation;
        }

        let generation = self.generation;
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let results = search_or_empty(service.as_ref(), &query).await;
            // Receiver lives as long as the session.
            let _ = tx.send(SearchOutcome {
                generation,
                query,
                results,
            });
        }));
        generation
    }

    /// Drop the pending lookup and the current results.
    pub fn clear(&mut self) {
        self.supersede();
        self.results.clear();
    }

    /// Apply an outcome if it belongs to the current generation.
    pub fn accept(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                query = %outcome.query,
                stale = outcome.generation,
                current = self.generation,
                "Discarding stale search results"
            );
            return false;
        }
        self.results = outcome.results;
        true
    }

    /// Wait for the outcome of the pending lookup.
    ///
    /// Returns `None` straight away when no lookup is pending (nothing was
    /// submitted, the query was too short, the session was cleared, or the
    /// outcome was already received).
    pub async fn recv(&mut self) -> Option<SearchOutcome> {
        while self.pending.is_some() {
            let outcome = self.rx.recv().await?;
            if self.accept(outcome.clone()) {
                self.pending = None;
                return Some(outcome);
            }
        }
        None
    }

    /// Non-blocking variant of `recv`.
    pub fn try_recv(&mut self) -> Option<SearchOutcome> {
        let mut latest = None;
        while let Ok(outcome) = self.rx.try_recv() {
            if self.accept(outcome.clone()) {
                self.pending = None;
                latest = Some(outcome);
            }
        }
        latest
    }

    fn supersede(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<S> Drop for SearchSession<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
