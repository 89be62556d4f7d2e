//! Implements a struct that holds the state of the REST server.

use std::{sync::Arc, time::Duration};

use time::Date;

use crate::{
    AnalyticsConfig, Error, month::ListingDecemberWrap, stores::TransactionStore,
    timezone::LocalTimezone,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<S>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    /// The store the analytics read [transactions](crate::Transaction) from.
    pub transaction_store: S,
    /// The settings shared by all analytics endpoints.
    pub config: Arc<AnalyticsConfig>,
}

impl<S> AppState<S>
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    /// Create a new [AppState].
    pub fn new(transaction_store: S, config: AnalyticsConfig) -> Self {
        Self {
            transaction_store,
            config: Arc::new(config),
        }
    }

    /// Capture the settings for handling one request.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the configured timezone is unknown.
    pub fn query_context(&self) -> Result<QueryContext, Error> {
        let timezone_name = &self.config.local_timezone;
        let timezone = LocalTimezone::from_name(timezone_name).ok_or_else(|| {
            tracing::error!("Invalid timezone {}", timezone_name);
            Error::InvalidTimezone(timezone_name.to_owned())
        })?;

        Ok(QueryContext {
            timezone,
            today: timezone.today(),
            timeout: self.config.query_timeout,
            listing_december_wrap: self.config.listing_december_wrap,
        })
    }
}

/// The settings used while handling a single request.
///
/// Captured once per request so that every sub-query of a combined request
/// agrees on the current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext {
    /// The local timezone month windows are built in.
    pub timezone: LocalTimezone,
    /// Today's date in the local timezone.
    pub today: Date,
    /// How long a single store query may run.
    pub timeout: Duration,
    /// How the transactions listing ends its window for December.
    pub listing_december_wrap: ListingDecemberWrap,
}
