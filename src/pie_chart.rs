//! Counts the transactions in a month window per category.

use axum::{
    Json,
    extract::{Query, State},
};
use time::Month;

use crate::{
    AppState, Error,
    app_state::QueryContext,
    month::{MonthWindow, chart_window},
    query_params::{RawQuery, parse_required_month},
    store_task::run_store_query,
    stores::{CategoryCount, TransactionFilter, TransactionStore},
};

/// Count the transactions sold within `window` per category.
///
/// Categories without any transactions in the window are left out.
///
/// # Errors
/// Returns [Error::StoreUnavailable] if the store cannot be queried.
pub fn category_distribution(
    store: &impl TransactionStore,
    window: MonthWindow,
) -> Result<Vec<CategoryCount>, Error> {
    store.count_by_category(&TransactionFilter::default().date_of_sale(Some(window)))
}

/// The category distribution for `month` over the chart years.
///
/// # Errors
/// Returns [Error::InvalidMonth] if the window cannot be built, or any
/// error from [run_store_query].
pub async fn pie_chart<S>(
    store: &S,
    month: Month,
    context: &QueryContext,
) -> Result<Vec<CategoryCount>, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let window = chart_window(month, context.timezone)?;
    let store = store.clone();

    run_store_query("pie chart", context.timeout, move || {
        category_distribution(&store, window)
    })
    .await
}

/// Route handler for the category distribution of a month.
pub async fn get_pie_chart<S>(
    State(state): State<AppState<S>>,
    Query(raw_query): Query<RawQuery>,
) -> Result<Json<Vec<CategoryCount>>, Error>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let month = parse_required_month(&raw_query)?;
    let context = state.query_context()?;

    pie_chart(&state.transaction_store, month, &context)
        .await
        .map(Json)
}
