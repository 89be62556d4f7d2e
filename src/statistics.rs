//! Summarises the sales made in a month across the years.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use time::Month;

use crate::{
    AppState, Error,
    app_state::QueryContext,
    month::{MonthWindow, statistics_window},
    query_params::{RawQuery, parse_required_month},
    store_task::run_store_query,
    stores::{TransactionFilter, TransactionStore},
};

/// Sales totals for a month window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The sum of the prices of the sold transactions.
    pub total_sale: f64,
    /// The number of sold transactions.
    pub sold_count: usize,
    /// The number of transactions that were not sold.
    pub not_sold_count: usize,
}

/// Compute the [Statistics] for the transactions sold within `window`.
///
/// An empty window yields zero for every field.
///
/// # Errors
/// Returns [Error::StoreUnavailable] if the store cannot be queried.
pub fn compute_statistics(
    store: &impl TransactionStore,
    window: MonthWindow,
) -> Result<Statistics, Error> {
    let in_window = TransactionFilter::default().date_of_sale(Some(window));
    let sold = in_window.clone().sold(true);

    Ok(Statistics {
        total_sale: store.sum_price(&sold)?,
        sold_count: store.count(&sold)?,
        not_sold_count: store.count(&in_window.sold(false))?,
    })
}

/// The [Statistics] for `month`, from [STATISTICS_REFERENCE_YEAR] through
/// the current year.
///
/// [STATISTICS_REFERENCE_YEAR]: crate::month::STATISTICS_REFERENCE_YEAR
///
/// # Errors
/// Returns [Error::InvalidMonth] if the window cannot be built, or any
/// error from [run_store_query].
pub async fn sales_statistics<S>(
    store: &S,
    month: Month,
    context: &QueryContext,
) -> Result<Statistics, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let window = statistics_window(month, context.today, context.timezone)?;
    let store = store.clone();

    run_store_query("statistics", context.timeout, move || {
        compute_statistics(&store, window)
    })
    .await
}

/// Route handler for the sales statistics of a month.
pub async fn get_statistics<S>(
    State(state): State<AppState<S>>,
    Query(raw_query): Query<RawQuery>,
) -> Result<Json<Statistics>, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let month = parse_required_month(&raw_query)?;
    let context = state.query_context()?;

    sales_statistics(&state.transaction_store, month, &context)
        .await
        .map(Json)
}
