//! Sales Insights is a read-only analytics API over a collection of sale
//! transactions.
//!
//! The library exposes a JSON REST API for searching transactions and for
//! deriving per-month statistics, a price-range histogram and a category
//! distribution. Months are year-agnostic: a month selector matches that
//! calendar month across the years held in the data set.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod bar_chart;
mod combined;
mod config;
mod db;
mod endpoints;
mod logging;
mod month;
mod pagination;
mod pie_chart;
mod query_params;
mod routing;
mod search;
mod statistics;
mod store_task;
pub mod stores;
mod timezone;
mod transaction;
mod transactions;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use config::AnalyticsConfig;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::ListingDecemberWrap;
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use timezone::LocalTimezone;
pub use transaction::{NewTransaction, Transaction, TransactionId};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The month selector was missing where one is required, was not a
    /// number, or was outside of 1 to 12.
    ///
    /// The string holds the raw value the client sent, or is empty if the
    /// month was missing.
    #[error("invalid month \"{0}\", expected a number between 1 and 12")]
    InvalidMonth(String),

    /// The search text could not be turned into a predicate.
    ///
    /// Reserved: malformed numeric searches are currently matched as text
    /// only and never produce this error.
    #[error("invalid search \"{0}\"")]
    InvalidSearch(String),

    /// The `page` or `perPage` parameter was not a positive integer.
    #[error("invalid pagination parameter \"{0}\", expected a positive integer")]
    InvalidPagination(String),

    /// The transaction store could not run a query.
    ///
    /// The string describes the underlying cause and must only be logged,
    /// never sent to the client.
    #[error("the transaction store is unavailable: {0}")]
    StoreUnavailable(String),

    /// A store query did not finish within the configured timeout.
    #[error("the query for {0} timed out")]
    Timeout(&'static str),

    /// One of several concurrent sub-operations failed, so the combined
    /// result was discarded.
    #[error("{operation} failed: {cause}")]
    AggregationFailure {
        /// The name of the sub-operation that failed.
        operation: &'static str,
        /// Why it failed.
        cause: Box<Error>,
    },

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", error);
        Error::StoreUnavailable(error.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidMonth(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid month provided. Please provide a month between 1 and 12.",
            )
                .into_response(),
            Error::InvalidSearch(search) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid search \"{search}\"."),
            )
                .into_response(),
            Error::InvalidPagination(value) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid page parameter \"{value}\". Use a positive whole number."),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details.",
                )
                    .into_response()
            }
        }
    }
}
