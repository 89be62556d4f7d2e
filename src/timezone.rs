//! Resolves canonical timezone names, e.g. "Pacific/Auckland", to UTC offsets.

use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

/// The timezone month windows are built in.
///
/// A named timezone may change its UTC offset during the year, e.g. for
/// daylight saving time, so the offset is looked up for each local time
/// rather than once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalTimezone {
    /// A timezone that is always the same distance from UTC.
    Fixed(UtcOffset),
    /// A timezone from the IANA database.
    Named(&'static Tz),
}

impl LocalTimezone {
    /// Coordinated Universal Time.
    pub const UTC: Self = Self::Fixed(UtcOffset::UTC);

    /// Look up `canonical_timezone` in the timezone database.
    ///
    /// Returns `None` if the name is not a known timezone.
    pub fn from_name(canonical_timezone: &str) -> Option<Self> {
        time_tz::timezones::get_by_name(canonical_timezone).map(Self::Named)
    }

    /// The UTC offset in effect at `instant`.
    pub fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        match self {
            Self::Fixed(offset) => *offset,
            Self::Named(tz) => tz.get_offset_utc(&instant).to_utc(),
        }
    }

    /// Attach the offset this timezone uses for the wall clock time `local`.
    ///
    /// When the clocks go back and `local` happens twice, the earlier instant
    /// is used. When `local` is skipped because the clocks go forward, the
    /// offset after the change is used.
    pub fn assume_local(&self, local: PrimitiveDateTime) -> OffsetDateTime {
        let offset = match self {
            Self::Fixed(offset) => *offset,
            Self::Named(tz) => {
                let wall_clock = local.assume_utc();

                tz.get_offset_local(&wall_clock)
                    .take_first()
                    .unwrap_or_else(|| tz.get_offset_utc(&wall_clock))
                    .to_utc()
            }
        };

        local.assume_offset(offset)
    }

    /// Today's date in this timezone.
    pub fn today(&self) -> Date {
        let now = OffsetDateTime::now_utc();

        now.to_offset(self.offset_at(now)).date()
    }
}
