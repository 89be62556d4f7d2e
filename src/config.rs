//! Settings that control how queries are resolved and run.

use std::time::Duration;

use crate::{month::ListingDecemberWrap, pagination::PaginationConfig};

/// The default time a single store query may take before it is abandoned.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings shared by all analytics endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Month windows start and end at midnight in this timezone, each
    /// boundary at the UTC offset in effect on its own date.
    pub local_timezone: String,
    /// How long a single store query may run before the request fails with
    /// [Error::Timeout](crate::Error::Timeout).
    pub query_timeout: Duration,
    /// How the transactions listing ends its window for December.
    pub listing_december_wrap: ListingDecemberWrap,
    /// The default page and page size for the transactions listing.
    pub pagination: PaginationConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            local_timezone: "UTC".to_owned(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            listing_december_wrap: ListingDecemberWrap::default(),
            pagination: PaginationConfig::default(),
        }
    }
}
