//! Lists transactions matching a search, optionally limited to a month.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;

use crate::{
    AppState, Error, Transaction,
    app_state::QueryContext,
    month::{MonthWindow, listing_window},
    pagination::Page,
    query_params::{AnalyticsQuery, RawQuery},
    search::SearchPredicate,
    store_task::run_store_query,
    stores::{TransactionFilter, TransactionQuery, TransactionStore},
};

/// One page of matching transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionPage {
    /// The transactions on the requested page, in storage order.
    pub data: Vec<Transaction>,
    /// The number of matching transactions across all pages.
    pub total: usize,
}

/// Get the transactions matching `search` within `window`.
///
/// No date filter is applied when `window` is `None`. Pages past the last
/// match are empty but still report the full `total`.
///
/// # Errors
/// Returns [Error::StoreUnavailable] if the store cannot be queried.
pub fn find_transactions(
    store: &impl TransactionStore,
    search: SearchPredicate,
    window: Option<MonthWindow>,
    page: Page,
) -> Result<TransactionPage, Error> {
    let filter = TransactionFilter::default()
        .search(search)
        .date_of_sale(window);

    let total = store.count(&filter)?;
    let data = store.find(&TransactionQuery {
        filter,
        limit: Some(page.size),
        offset: page.offset(),
    })?;

    Ok(TransactionPage { data, total })
}

/// List transactions for `query`, limiting them to the listing window of the
/// selected month if there is one.
///
/// # Errors
/// Returns [Error::InvalidMonth] if the window cannot be built, or any
/// error from [run_store_query].
pub async fn list_transactions<S>(
    store: &S,
    query: &AnalyticsQuery,
    context: &QueryContext,
) -> Result<TransactionPage, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let window = query
        .month
        .map(|month| listing_window(month, context.listing_december_wrap, context.timezone))
        .transpose()?;

    tracing::debug!(
        "listing transactions matching {:?} on page {}",
        query.search.text(),
        query.page.number
    );

    let store = store.clone();
    let search = query.search.clone();
    let page = query.page;

    run_store_query("transactions", context.timeout, move || {
        find_transactions(&store, search, window, page)
    })
    .await
}

/// Route handler for searching transactions.
///
/// Accepts `search`, `month`, `page` and `perPage` query parameters.
pub async fn get_transactions<S>(
    State(state): State<AppState<S>>,
    Query(raw_query): Query<RawQuery>,
) -> Result<Json<TransactionPage>, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let query = AnalyticsQuery::parse(&raw_query, &state.config.pagination)?;
    let context = state.query_context()?;

    list_transactions(&state.transaction_store, &query, &context)
        .await
        .map(Json)
}
