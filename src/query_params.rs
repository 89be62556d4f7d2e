//! Validates the loosely typed query string parameters shared by the
//! analytics endpoints.

use serde::Deserialize;
use time::Month;

use crate::{
    Error,
    month::parse_month,
    pagination::{Page, PaginationConfig},
    search::SearchPredicate,
};

/// The query string parameters exactly as the client sent them.
///
/// Every field is optional text so that a malformed value is reported by
/// [AnalyticsQuery::parse] with a specific error instead of being rejected by
/// the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuery {
    /// Free text to search for in titles, descriptions and prices.
    pub search: Option<String>,
    /// The month number, 1 to 12.
    pub month: Option<String>,
    /// The one-based page number.
    pub page: Option<String>,
    /// The number of transactions per page.
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
}

/// Validated query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsQuery {
    /// Which transactions the listing should include.
    pub search: SearchPredicate,
    /// The selected month, if any.
    pub month: Option<Month>,
    /// The page of the listing to return.
    pub page: Page,
}

impl AnalyticsQuery {
    /// Validate `raw`, filling in defaults from `pagination`.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::InvalidMonth] if `month` is present but not 1 to 12,
    /// - or [Error::InvalidPagination] if `page` or `perPage` is present but
    ///   not a positive integer.
    pub fn parse(raw: &RawQuery, pagination: &PaginationConfig) -> Result<Self, Error> {
        let month = parse_month(raw.month.as_deref())?;
        let page = Page {
            number: parse_positive(raw.page.as_deref(), pagination.default_page)?,
            size: parse_positive(raw.per_page.as_deref(), pagination.default_page_size)?,
        };

        Ok(Self {
            search: SearchPredicate::new(raw.search.as_deref().unwrap_or_default()),
            month,
            page,
        })
    }

    /// The selected month, for endpoints that cannot work without one.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if no month was given.
    pub fn require_month(&self) -> Result<Month, Error> {
        self.month.ok_or_else(|| Error::InvalidMonth(String::new()))
    }
}

/// Parse the `month` parameter for endpoints that only take a month.
///
/// # Errors
/// Returns [Error::InvalidMonth] if the month is missing or not 1 to 12.
pub fn parse_required_month(raw: &RawQuery) -> Result<Month, Error> {
    parse_month(raw.month.as_deref())?.ok_or_else(|| Error::InvalidMonth(String::new()))
}

fn parse_positive(raw: Option<&str>, default: u64) -> Result<u64, Error> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(default);
    };

    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(Error::InvalidPagination(raw.to_owned())),
    }
}
