use std::collections::HashMap;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::dispatcher::Dispatcher;
use crate::product::OutputRecord;
use crate::progress::stage_bar;
use crate::session::CatalogApi;

/// Price every distinct id once, then build one record per catalog entry.
pub async fn enrich<A>(api: &A, catalog: &Catalog, dispatcher: &Dispatcher) -> Vec<OutputRecord>
where
    A: CatalogApi + ?Sized,
{
    let ids = catalog.distinct_ids();
    info!(
        "[PRICES] Fetching marketing prices ({} ids for {} products)...",
        ids.len(),
        catalog.len()
    );

    let prices = fetch_prices(api, &ids, dispatcher).await;
    let priced = prices.values().filter(|p| !p.is_empty()).count();
    info!(
        "[PRICES] Finished. {} of {} ids have a price",
        priced,
        prices.len()
    );

    project(catalog, &prices)
}

/// id -> price. Failed lookups map to "".
pub async fn fetch_prices<A>(
    api: &A,
    ids: &[String],
    dispatcher: &Dispatcher,
) -> HashMap<String, String>
where
    A: CatalogApi + ?Sized,
{
    let pb = stage_bar(
        ids.len(),
        "[PRICES] {pos}/{len} ids priced [{elapsed_precise}] {bar:40}",
    );

    let mut pending: FuturesUnordered<_> = ids
        .iter()
        .map(|id| async move { (id, dispatcher.run(fetch_price(api, id)).await) })
        .collect();

    let mut cache = HashMap::with_capacity(ids.len());
    while let Some((id, price)) = pending.next().await {
        cache.insert(id.clone(), price);
        pb.inc(1);
    }

    pb.finish_and_clear();
    cache
}

async fn fetch_price<A>(api: &A, id: &str) -> String
where
    A: CatalogApi + ?Sized,
{
    match api.price(id).await {
        Ok(price) => price,
        Err(e) => {
            debug!("price for '{}' dropped: {:#}", id, e);
            String::new()
        }
    }
}

/// One record per entry, in catalog order. Ids missing from `prices` get "".
pub fn project(catalog: &Catalog, prices: &HashMap<String, String>) -> Vec<OutputRecord> {
    catalog
        .iter()
        .map(|entry| {
            let price = prices.get(&entry.id).map(String::as_str).unwrap_or("");
            OutputRecord::from_entry(entry, price)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::search_terms;
    use crate::fake_api::FakeApi;
    use crate::product::CatalogEntry;
    use std::time::Duration;

    fn catalog(rows: &[(&str, &str)]) -> Catalog {
        let mut c = Catalog::new();
        for (id, text) in rows {
            c.insert(CatalogEntry {
                id: id.to_string(),
                text: text.to_string(),
            });
        }
        c
    }

    fn record(name: &str, code: &str, price: &str) -> OutputRecord {
        OutputRecord {
            product_name: name.into(),
            product_code: code.into(),
            marketing_price: price.into(),
        }
    }

    #[tokio::test]
    async fn repeated_id_is_priced_once() {
        let api = FakeApi::new().with_price("1", "15000").with_price("2", " 9900\n");
        let c = catalog(&[
            ("1", "A1 / Apple"),
            ("1", "A1 / Apple (Green)"),
            ("2", "B2 / Banana"),
        ]);

        let records = enrich(&api, &c, &Dispatcher::new(10)).await;

        assert_eq!(api.total_price_calls(), 2);
        assert_eq!(api.price_calls().get("1"), Some(&1));
        assert_eq!(
            records,
            vec![
                record("Apple", "A1", "15000"),
                record("Apple (Green)", "A1", "15000"),
                record("Banana", "B2", "9900"),
            ]
        );
    }

    #[tokio::test]
    async fn failed_price_is_empty_string() {
        let api = FakeApi::new().with_price("1", "15000");
        let c = catalog(&[("1", "A1 / Apple"), ("404", "JustAName")]);

        let records = enrich(&api, &c, &Dispatcher::new(10)).await;

        assert_eq!(
            records,
            vec![
                record("Apple", "A1", "15000"),
                record("JustAName", "JustAName", ""),
            ]
        );
    }

    #[test]
    fn project_defaults_missing_price() {
        let c = catalog(&[("7", "X / Y / Z")]);
        let records = project(&c, &HashMap::new());
        assert_eq!(records, vec![record("Y / Z", "X", "")]);
    }

    #[tokio::test]
    async fn concurrency_stays_within_limit() {
        let mut api = FakeApi::new().with_delay(Duration::from_millis(2));
        let rows: Vec<(String, String)> = search_terms()
            .into_iter()
            .take(150)
            .map(|t| (t.clone(), format!("{} / Item {}", t, t)))
            .collect();
        for (id, _) in &rows {
            api = api.with_price(id, "1");
        }
        let mut c = Catalog::new();
        for (id, text) in rows {
            c.insert(CatalogEntry { id, text });
        }

        let records = enrich(&api, &c, &Dispatcher::new(10)).await;

        assert_eq!(records.len(), 150);
        assert_eq!(api.total_price_calls(), 150);
        assert!(api.peak() <= 10, "peak {}", api.peak());
        assert!(api.peak() > 1);
    }
}
