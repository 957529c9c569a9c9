use std::collections::HashSet;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};

use crate::dispatcher::Dispatcher;
use crate::product::{entries_from_response, CatalogEntry};
use crate::progress::stage_bar;
use crate::session::CatalogApi;

const TERM_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Every two-character term over [0-9a-z], in a fixed order ("00", "01", ... "zz").
pub fn search_terms() -> Vec<String> {
    let mut terms = Vec::with_capacity(TERM_ALPHABET.len() * TERM_ALPHABET.len());
    for a in TERM_ALPHABET.chars() {
        for b in TERM_ALPHABET.chars() {
            terms.push(format!("{}{}", a, b));
        }
    }
    terms
}

/// Deduplicated set of entries keyed by (id, text), kept in insertion order.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    seen: HashSet<(String, String)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless blank or already present. Returns whether it was added.
    pub fn insert(&mut self, entry: CatalogEntry) -> bool {
        if entry.id.is_empty() || entry.text.is_empty() {
            return false;
        }
        if !self.seen.insert((entry.id.clone(), entry.text.clone())) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn merge(&mut self, entries: impl IntoIterator<Item = CatalogEntry>) -> usize {
        entries.into_iter().map(|e| self.insert(e)).filter(|added| *added).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Product ids in first-seen order, each once.
    pub fn distinct_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|e| seen.insert(e.id.as_str()))
            .map(|e| e.id.clone())
            .collect()
    }
}

/// Run one search per term through `dispatcher` and merge results as they complete.
///
/// A failed term contributes nothing; collection always runs every term.
pub async fn collect_catalog<A>(api: &A, terms: &[String], dispatcher: &Dispatcher) -> Catalog
where
    A: CatalogApi + ?Sized,
{
    let total = terms.len();
    info!(
        "[CATALOG] Collecting products ({} terms, {} in flight)...",
        total,
        dispatcher.limit()
    );

    let pb = stage_bar(
        total,
        "[CATALOG] Term {pos}/{len} | Unique={msg} [{elapsed_precise}] {bar:40}",
    );
    pb.set_message("0");

    let mut pending: FuturesUnordered<_> = terms
        .iter()
        .map(|term| dispatcher.run(fetch_term(api, term)))
        .collect();

    let mut catalog = Catalog::new();
    while let Some(entries) = pending.next().await {
        catalog.merge(entries);
        pb.inc(1);
        pb.set_message(catalog.len().to_string());
    }

    pb.finish_and_clear();
    info!(
        "[CATALOG] Finished. Terms={}, Unique entries={}",
        total,
        catalog.len()
    );
    catalog
}

async fn fetch_term<A>(api: &A, term: &str) -> Vec<CatalogEntry>
where
    A: CatalogApi + ?Sized,
{
    match api.search(term).await {
        Ok(body) => entries_from_response(&body),
        Err(e) => {
            debug!("search '{}' dropped: {:#}", term, e);
            Vec::new()
        }
    }
}
