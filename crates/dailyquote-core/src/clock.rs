//! Calendar-day comparison and time sources.
//!
//! The unlock boundary is the calendar day in the user's zone, not a rolling
//! 24 hours: 23:59 yesterday and 00:01 today are one day apart.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone, Utc};

/// Zone in which calendar dates are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    /// The system's local time zone.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl CalendarZone {
    /// Zone for an optional offset in minutes east of UTC; `None` is local.
    pub fn from_offset_minutes(minutes: Option<i32>) -> Option<Self> {
        match minutes {
            None => Some(Self::Local),
            Some(m) => FixedOffset::east_opt(m.checked_mul(60)?).map(Self::Fixed),
        }
    }

    /// Calendar date of `ts` in this zone.
    pub fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => ts.with_timezone(&Local).date_naive(),
            Self::Fixed(offset) => ts.with_timezone(offset).date_naive(),
        }
    }

    /// First instant of the calendar day after the one containing `ts`.
    pub fn start_of_next_day(&self, ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let midnight = self.date_of(ts).succ_opt()?.and_hms_opt(0, 0, 0)?;
        match self {
            Self::Local => Local
                .from_local_datetime(&midnight)
                .earliest()
                .map(|d| d.with_timezone(&Utc)),
            Self::Fixed(offset) => offset
                .from_local_datetime(&midnight)
                .single()
                .map(|d| d.with_timezone(&Utc)),
        }
    }
}

/// Whole calendar days from `a` to `b` (negative if `b` is on an earlier date).
pub fn calendar_days_between(zone: CalendarZone, a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    zone.date_of(b).signed_duration_since(zone.date_of(a)).num_days()
}

/// True when `b` falls on a later calendar date than `a`.
///
/// Dates are compared directly, so a 23-hour day at a DST transition still
/// counts as a full day.
pub fn is_at_least_one_calendar_day_apart(
    zone: CalendarZone,
    a: DateTime<Utc>,
    b: DateTime<Utc>,
) -> bool {
    calendar_days_between(zone, a, b) >= 1
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
