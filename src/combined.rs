//! Builds the listing, the statistics and both charts for a month in one
//! response.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;

use crate::{
    AppState, Error,
    app_state::QueryContext,
    bar_chart::{PriceRangeCount, bar_chart},
    pie_chart::pie_chart,
    query_params::{AnalyticsQuery, RawQuery},
    statistics::{Statistics, sales_statistics},
    stores::{CategoryCount, TransactionStore},
    transactions::{TransactionPage, list_transactions},
};

/// Every analytics view for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedView {
    /// The page of transactions for the listing window.
    pub transactions: TransactionPage,
    /// The sales statistics for the statistics window.
    pub statistics: Statistics,
    /// The price histogram for the chart window.
    pub bar_chart: Vec<PriceRangeCount>,
    /// The category distribution for the chart window.
    pub pie_chart: Vec<CategoryCount>,
}

/// Build every analytics view for the month in `query`.
///
/// The four views are computed concurrently, each with its own window.
/// Either all four succeed or the whole request fails.
///
/// # Errors
/// Returns:
/// - [Error::InvalidMonth] if `query` has no month, before any store access,
/// - or [Error::AggregationFailure] naming the first view that failed.
pub async fn combined<S>(
    store: &S,
    query: &AnalyticsQuery,
    context: &QueryContext,
) -> Result<CombinedView, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let month = query.require_month()?;

    let (transactions, statistics, bar_chart, pie_chart) = tokio::try_join!(
        labelled("transactions", list_transactions(store, query, context)),
        labelled("statistics", sales_statistics(store, month, context)),
        labelled("bar chart", bar_chart(store, month, context)),
        labelled("pie chart", pie_chart(store, month, context)),
    )?;

    Ok(CombinedView {
        transactions,
        statistics,
        bar_chart,
        pie_chart,
    })
}

async fn labelled<T>(
    operation: &'static str,
    future: impl Future<Output = Result<T, Error>>,
) -> Result<T, Error> {
    future.await.map_err(|error| match error {
        Error::AggregationFailure { .. } => error,
        cause => Error::AggregationFailure {
            operation,
            cause: Box::new(cause),
        },
    })
}

/// Route handler for every analytics view of a month.
///
/// Accepts the same query parameters as the transactions listing, but
/// `month` is required.
///
/// # Errors
/// Returns:
/// - [Error::InvalidMonth] if `month` is missing or malformed,
/// - [Error::InvalidPagination] if `page` or `perPage` is malformed, since the
///   listing in the response is paginated,
/// - or any error from [combined].
pub async fn get_combined<S>(
    State(state): State<AppState<S>>,
    Query(raw_query): Query<RawQuery>,
) -> Result<Json<CombinedView>, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let query = AnalyticsQuery::parse(&raw_query, &state.config.pagination)?;
    let context = state.query_context()?;

    combined(&state.transaction_store, &query, &context)
        .await
        .map(Json)
}
