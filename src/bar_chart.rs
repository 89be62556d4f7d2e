//! Counts the transactions in a month window per price range.

use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use time::Month;
use tokio::task::JoinSet;

use crate::{
    AppState, Error,
    app_state::QueryContext,
    month::{MonthWindow, chart_window},
    query_params::{RawQuery, parse_required_month},
    store_task::run_store_query,
    stores::{PriceRange, TransactionFilter, TransactionStore},
};

/// The price ranges of the histogram, in display order.
///
/// Each range starts where the previous one ends, so every non-negative
/// price falls into exactly one range. A price of 100.50 is counted in
/// `0-100` and a price of 101 in `101-200`.
pub const PRICE_BUCKETS: [(&str, PriceRange); 10] = [
    ("0-100", bucket(0.0, Some(101.0))),
    ("101-200", bucket(101.0, Some(201.0))),
    ("201-300", bucket(201.0, Some(301.0))),
    ("301-400", bucket(301.0, Some(401.0))),
    ("401-500", bucket(401.0, Some(501.0))),
    ("501-600", bucket(501.0, Some(601.0))),
    ("601-700", bucket(601.0, Some(701.0))),
    ("701-800", bucket(701.0, Some(801.0))),
    ("801-900", bucket(801.0, Some(901.0))),
    ("901-above", bucket(901.0, None)),
];

const fn bucket(min: f64, max: Option<f64>) -> PriceRange {
    PriceRange { min, max }
}

/// The number of transactions in one price range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRangeCount {
    /// The label of the price range, e.g. `101-200`.
    pub range: &'static str,
    /// How many transactions are priced within the range.
    pub count: usize,
}

/// Count the transactions sold within `window` for each of the
/// [PRICE_BUCKETS].
///
/// The ranges are counted concurrently, each with its own store query
/// limited to `limit`. The result keeps the order of [PRICE_BUCKETS] and
/// includes ranges with a count of zero.
///
/// # Errors
/// Returns the first error from any of the range queries, see
/// [run_store_query]. The remaining queries are abandoned.
pub async fn price_histogram<S>(
    store: &S,
    window: MonthWindow,
    limit: Duration,
) -> Result<Vec<PriceRangeCount>, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let mut tasks = JoinSet::new();

    for (index, (label, range)) in PRICE_BUCKETS.into_iter().enumerate() {
        let store = store.clone();
        let filter = TransactionFilter::default()
            .date_of_sale(Some(window))
            .price(range);

        tasks.spawn(async move {
            let count = run_store_query("bar chart", limit, move || store.count(&filter)).await?;

            Ok::<_, Error>((
                index,
                PriceRangeCount {
                    range: label,
                    count,
                },
            ))
        });
    }

    let mut counts = vec![None; PRICE_BUCKETS.len()];

    while let Some(joined) = tasks.join_next().await {
        let (index, count) = joined.map_err(|join_error| {
            tracing::error!("price range count did not complete: {join_error}");
            Error::AggregationFailure {
                operation: "bar chart",
                cause: Box::new(Error::StoreUnavailable(join_error.to_string())),
            }
        })??;

        counts[index] = Some(count);
    }

    Ok(counts.into_iter().flatten().collect())
}

/// The price histogram for `month` over the chart years.
///
/// # Errors
/// Returns [Error::InvalidMonth] if the window cannot be built, or any
/// error from [price_histogram].
pub async fn bar_chart<S>(
    store: &S,
    month: Month,
    context: &QueryContext,
) -> Result<Vec<PriceRangeCount>, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let window = chart_window(month, context.timezone)?;

    price_histogram(store, window, context.timeout).await
}

/// Route handler for the price histogram of a month.
pub async fn get_bar_chart<S>(
    State(state): State<AppState<S>>,
    Query(raw_query): Query<RawQuery>,
) -> Result<Json<Vec<PriceRangeCount>>, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let month = parse_required_month(&raw_query)?;
    let context = state.query_context()?;

    bar_chart(&state.transaction_store, month, &context)
        .await
        .map(Json)
}
