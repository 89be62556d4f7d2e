//! Resolves a month selector into the timestamp windows used to filter
//! transactions by their date of sale.
//!
//! The month selector is year-agnostic, and each endpoint derives its window
//! with its own reference years:
//! - [listing_window] for the transactions listing,
//! - [statistics_window] for the sales statistics,
//! - [chart_window] for the bar and pie charts.
//!
//! The three windows differ for the same month, and each endpoint keeps the
//! window its clients already rely on.
//!
//! Each boundary is a wall clock time in the local timezone, using the UTC
//! offset in effect on that boundary's date, so a window may start and end
//! at different offsets.

use time::{Date, Month, OffsetDateTime, macros::time};

use crate::{Error, timezone::LocalTimezone};

/// The year the transactions listing anchors both ends of its window to.
pub const LISTING_REFERENCE_YEAR: i32 = 2023;
/// The year the statistics window starts in.
pub const STATISTICS_REFERENCE_YEAR: i32 = 2021;
/// The year the chart window starts in.
pub const CHART_START_YEAR: i32 = 2021;
/// The year the chart window ends in.
pub const CHART_END_YEAR: i32 = 2024;

/// A half-open `[start, end)` range of sale timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    /// The earliest timestamp included in the window.
    pub start: OffsetDateTime,
    /// The first timestamp after the window.
    pub end: OffsetDateTime,
}

impl MonthWindow {
    /// Whether no timestamp can fall inside the window, which is the case
    /// when `end` is not after `start`.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// How the transactions listing ends the window for December.
///
/// The listing window ends on the first day of the following month in the
/// listing's reference year. For December that wraps around to January of
/// the *same* year, producing a window that ends before it starts and so
/// matches nothing. Whether that is intended has not been settled, so the
/// behaviour is kept by default and can be switched off explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ListingDecemberWrap {
    /// December ends on January 1st of the reference year (an empty window).
    #[default]
    SameYear,
    /// December ends on January 1st of the year after the reference year.
    NextYear,
}

/// Parse the raw `month` query parameter.
///
/// A missing or blank value yields `Ok(None)`.
///
/// # Errors
/// Returns [Error::InvalidMonth] if the value is present but is not a whole
/// number from 1 to 12.
pub fn parse_month(raw: Option<&str>) -> Result<Option<Month>, Error> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    raw.parse::<u8>()
        .ok()
        .and_then(|number| Month::try_from(number).ok())
        .map(Some)
        .ok_or_else(|| Error::InvalidMonth(raw.to_owned()))
}

/// The window used by the transactions listing.
///
/// Starts at midnight on the first of `month` in [LISTING_REFERENCE_YEAR]
/// and ends at midnight on the first of the following month in the same
/// year. See [ListingDecemberWrap] for how December is handled.
///
/// # Errors
/// Returns [Error::InvalidMonth] if a boundary date cannot be constructed.
pub fn listing_window(
    month: Month,
    december_wrap: ListingDecemberWrap,
    timezone: LocalTimezone,
) -> Result<MonthWindow, Error> {
    let end_year = match (month, december_wrap) {
        (Month::December, ListingDecemberWrap::NextYear) => LISTING_REFERENCE_YEAR + 1,
        _ => LISTING_REFERENCE_YEAR,
    };

    let window = MonthWindow {
        start: start_of_month(LISTING_REFERENCE_YEAR, month, timezone)?,
        end: start_of_month(end_year, month.next(), timezone)?,
    };

    tracing::debug!("listing window for {month}: {window:?}");

    if window.is_empty() {
        tracing::warn!("listing window for {month} ends before it starts and matches nothing");
    }

    Ok(window)
}

/// The window used by the sales statistics.
///
/// Starts at midnight on the first of `month` in
/// [STATISTICS_REFERENCE_YEAR] and ends at 23:59:59.999 on the last day of
/// `month` in the year of `today`. The window therefore spans every year
/// from the reference year up to the current one.
///
/// # Errors
/// Returns [Error::InvalidMonth] if a boundary date cannot be constructed.
pub fn statistics_window(
    month: Month,
    today: Date,
    timezone: LocalTimezone,
) -> Result<MonthWindow, Error> {
    let year = today.year();
    let last_day = Date::from_calendar_date(year, month, last_day_of_month(year, month))
        .map_err(|_| Error::InvalidMonth(u8::from(month).to_string()))?;

    let window = MonthWindow {
        start: start_of_month(STATISTICS_REFERENCE_YEAR, month, timezone)?,
        end: timezone.assume_local(last_day.with_time(time!(23:59:59.999))),
    };

    tracing::debug!("statistics window for {month}: {window:?}");

    Ok(window)
}

/// The window used by the bar and pie charts.
///
/// Starts at midnight on the first of `month` in [CHART_START_YEAR] and
/// ends at midnight on the first of the following month in
/// [CHART_END_YEAR]. December ends on January 1st of [CHART_END_YEAR].
///
/// # Errors
/// Returns [Error::InvalidMonth] if a boundary date cannot be constructed.
pub fn chart_window(month: Month, timezone: LocalTimezone) -> Result<MonthWindow, Error> {
    let window = MonthWindow {
        start: start_of_month(CHART_START_YEAR, month, timezone)?,
        end: start_of_month(CHART_END_YEAR, month.next(), timezone)?,
    };

    tracing::debug!("chart window for {month}: {window:?}");

    Ok(window)
}

fn start_of_month(
    year: i32,
    month: Month,
    timezone: LocalTimezone,
) -> Result<OffsetDateTime, Error> {
    Date::from_calendar_date(year, month, 1)
        .map(|date| timezone.assume_local(date.midnight()))
        .map_err(|_| Error::InvalidMonth(u8::from(month).to_string()))
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
