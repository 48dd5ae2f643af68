use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};
use chrono_tz::Tz;

/// Weekday names in chrono's Monday-first order
const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Inclusive range of instants covering whole days in the reference timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Calendar view a resolved range maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryView {
    Day,
    Week,
    Month,
}

impl DateRange {
    /// Create a range, rejecting one that ends before it starts
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Range from the first instant of `first` to the last instant of `last`
    pub fn days(tz: &Tz, first: NaiveDate, last: NaiveDate) -> Option<Self> {
        Self::new(start_of_day(tz, first), end_of_day(tz, last))
    }

    /// Range covering a single day
    pub fn day(tz: &Tz, date: NaiveDate) -> Self {
        Self {
            start: start_of_day(tz, date),
            end: end_of_day(tz, date),
        }
    }

    /// Pick the calendar view that fits this range
    pub fn view(&self) -> QueryView {
        let days = (self.end - self.start).num_days();
        if days >= 27 {
            QueryView::Month
        } else if days >= 6 {
            QueryView::Week
        } else {
            QueryView::Day
        }
    }
}

/// Resolves relative date phrases into concrete ranges in a fixed timezone
#[derive(Debug, Clone, Copy)]
pub struct TemporalResolver {
    timezone: Tz,
}

impl TemporalResolver {
    /// Create a resolver for the given reference timezone
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// The reference timezone
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Resolve a phrase such as "next week" or "on friday" relative to `now`.
    ///
    /// Rules are substring matches checked in a fixed order; the first match
    /// wins. "next week" must be tested before the bare "week" rule, since the
    /// latter is a substring of the former.
    pub fn resolve<T: TimeZone>(&self, phrase: &str, now: &DateTime<T>) -> Option<DateRange> {
        let tz = &self.timezone;
        let phrase = phrase.to_lowercase();
        let today = now.with_timezone(tz).date_naive();

        if phrase.contains("today") {
            return Some(DateRange::day(tz, today));
        }

        if phrase.contains("tomorrow") {
            return Some(DateRange::day(tz, today.succ_opt()?));
        }

        let monday = week_start(today);

        if phrase.contains("next week") {
            return week_range(tz, monday + Duration::days(7));
        }

        if contains_any(&phrase, &["last week", "previous week"]) {
            return week_range(tz, monday - Duration::days(7));
        }

        if contains_any(&phrase, &["this week", "the week", "week", "current week"]) {
            return week_range(tz, monday);
        }

        if contains_any(&phrase, &["this month", "current month"]) {
            let (first, last) = month_bounds(today)?;
            return DateRange::days(tz, first, last);
        }

        // Bare or qualified weekday names: "wednesday", "on wednesday", "next wednesday"
        let weekday_index = WEEKDAYS.iter().position(|day| phrase.contains(day))?;
        let current = today.weekday().num_days_from_monday() as i64;
        let mut days_ahead = (weekday_index as i64 - current + 7) % 7;
        if days_ahead == 0 && phrase.contains("next") {
            days_ahead = 7;
        }

        Some(DateRange::day(tz, today + Duration::days(days_ahead)))
    }
}

fn contains_any(phrase: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| phrase.contains(needle))
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_range(tz: &Tz, monday: NaiveDate) -> Option<DateRange> {
    DateRange::days(tz, monday, monday + Duration::days(6))
}

/// First and last day of the month containing `date`
fn month_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)?
    };
    Some((first, next_month.pred_opt()?))
}

/// 00:00:00.000000 of `date` in `tz`
pub fn start_of_day(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    localize(tz, date.and_time(NaiveTime::MIN), false)
}

/// 23:59:59.999999 of `date` in `tz`
pub fn end_of_day(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    localize(tz, date.and_time(last), true)
}

/// Attach `tz` to a wall-clock time, settling DST folds and gaps
pub fn localize(tz: &Tz, naive: NaiveDateTime, prefer_latest: bool) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, latest) => {
            if prefer_latest {
                latest
            } else {
                earliest
            }
        }
        // Wall-clock time skipped by a DST jump
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

/// Parse an event time as produced by the language model or calendar API.
///
/// Offsets are honoured and converted into `tz`; naive values are read as
/// wall-clock time in `tz`; bare dates resolve to midnight.
pub fn parse_event_time(value: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(tz));
    }

    const NAIVE_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(localize(tz, naive, false));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| start_of_day(tz, date))
}

/// Format an event start like "March 05 at 02:30 PM"
pub fn format_event_time(dt: &DateTime<Tz>) -> String {
    dt.format("%B %d at %I:%M %p").to_string()
}
