// Interpretation of raw date cells.
//
// Dates arrive either as spreadsheet serial numbers or as free text, and are
// only interpreted when a report needs them. Text goes through a calendar
// parse first; only if that fails is it split on the first space and then on
// `-` to pull year/month/day positionally. Malformed dates are common in the
// source sheets, so both paths are kept.
use crate::types::RawDate;
use crate::util::parse_int_prefix;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};

const MS_PER_DAY: f64 = 86_400_000.0;
// Far beyond any real sheet; keeps the millisecond offset inside chrono's range.
const MAX_SERIAL_DAYS: f64 = 100_000_000.0;

// `%Y` also accepts one to three digits, so "3/15/24" or "March 2024" can
// "parse" into year 24. Calendar parses outside this range are discarded and
// the next layout is tried.
const YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %I:%M %p",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
    "%b %d, %Y %I:%M:%S %p",
    "%b %d, %Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%m/%d/%y",
    "%d %b %y",
    "%b %d, %y",
];

// Month and year with no day ("March 2024"). Parsed with a day of 1 appended.
const MONTH_YEAR_FORMATS: &[&str] = &["%B %Y %d", "%b %Y %d"];

/// Year/month/day pulled out of a raw date. Any part may be missing when the
/// text fallback could not find it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateParts {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
}

impl DateParts {
    fn from_date(d: NaiveDate) -> Self {
        DateParts {
            year: Some(d.year()),
            month: Some(d.month() as i32),
            day: Some(d.day() as i32),
        }
    }

    /// Full calendar date, when all three parts are present and valid.
    pub fn to_date(self) -> Option<NaiveDate> {
        let (y, m, d) = (self.year?, self.month?, self.day?);
        NaiveDate::from_ymd_opt(y, u32::try_from(m).ok()?, u32::try_from(d).ok()?)
    }
}

/// Convert a spreadsheet serial day number (days since 1899-12-30 UTC,
/// fractional part = time of day) into a timestamp.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL_DAYS {
        return None;
    }
    let day0 = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let offset = Duration::milliseconds((serial * MS_PER_DAY).trunc() as i64);
    day0.checked_add_signed(offset)
}

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    YEARS.contains(&date.year()).then_some(date)
}

/// Strict calendar parse of a text date in the common spreadsheet layouts.
/// The first layout that yields a year in 1900..=2100 wins.
pub fn parse_calendar(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let with_day = format!("{text} 1");

    let rfc3339 = DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive());
    let datetimes = DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date());
    let dates = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok());
    let month_years = MONTH_YEAR_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(&with_day, fmt).ok());

    rfc3339
        .into_iter()
        .chain(datetimes)
        .chain(dates)
        .chain(month_years)
        .find_map(plausible)
}

/// Positional fallback: first space-separated token, split on `-`, read as
/// year-month-day with leading-integer parsing.
pub fn split_parts(text: &str) -> DateParts {
    let head = text.split(' ').next().unwrap_or("");
    let mut parts = head.split('-');
    DateParts {
        year: parts.next().and_then(parse_int_prefix),
        month: parts.next().and_then(parse_int_prefix),
        day: parts.next().and_then(parse_int_prefix),
    }
}

pub fn interpret(date: &RawDate) -> DateParts {
    match date {
        RawDate::Missing => DateParts::default(),
        RawDate::Serial(n) => serial_to_datetime(*n)
            .map(|dt| DateParts::from_date(dt.date()))
            .unwrap_or_default(),
        RawDate::Text(s) => match parse_calendar(s) {
            Some(d) => DateParts::from_date(d),
            None => split_parts(s),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_day_zero_is_1899_12_30() {
        let dt = serial_to_datetime(0.0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(1899, 12, 30).unwrap());
    }

    #[test]
    fn serial_45000_is_march_15_2023() {
        let dt = serial_to_datetime(45000.0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());
        // Fractional days are time of day, not the next date.
        let dt = serial_to_datetime(45000.75).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());
    }

    #[test]
    fn serial_and_text_paths_agree() {
        let serial = interpret(&RawDate::Serial(45000.0));
        let calendar = interpret(&RawDate::Text("2023-03-15".into()));
        // Not a calendar date, so this goes through the split fallback.
        let fallback = interpret(&RawDate::Text("2023-03-15 around noon".into()));
        assert!(parse_calendar("2023-03-15 around noon").is_none());
        assert_eq!(serial, calendar);
        assert_eq!(serial, fallback);
        assert_eq!(serial.month, Some(3));
        assert_eq!(serial.year, Some(2023));
    }

    #[test]
    fn calendar_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_calendar("2024-03-05"), Some(d));
        assert_eq!(parse_calendar("03/05/2024"), Some(d));
        assert_eq!(parse_calendar("2024-03-05 14:30:00"), Some(d));
        assert_eq!(parse_calendar("March 5, 2024"), Some(d));
        assert_eq!(parse_calendar("2024-03-05T08:00:00+08:00"), Some(d));
        assert_eq!(parse_calendar("garbage"), None);
    }

    #[test]
    fn short_years_are_not_read_as_year_24() {
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        assert_eq!(parse_calendar("March 2024"), ymd(2024, 3, 1));
        assert_eq!(parse_calendar("3/15/24"), ymd(2024, 3, 15));
        assert_eq!(parse_calendar("15 Mar 24"), ymd(2024, 3, 15));

        let parts = interpret(&RawDate::Text("March 2024".into()));
        assert_eq!((parts.year, parts.month), (Some(2024), Some(3)));

        // No plausible layout: the positional split takes over.
        assert_eq!(parse_calendar("0024-03-05"), None);
        assert_eq!(interpret(&RawDate::Text("0024-03-05".into())).year, Some(24));
    }

    #[test]
    fn twelve_hour_and_month_name_timestamps() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_calendar("3/15/2024 2:05:07 PM"), d);
        assert_eq!(parse_calendar("03/15/2024 10:30 AM"), d);
        assert_eq!(parse_calendar("Mar 15, 2024 14:05:00"), d);
        assert_eq!(parse_calendar("Mar 15, 2024 2:05 PM"), d);

        let parts = interpret(&RawDate::Text("3/15/2024 2:05:07 PM".into()));
        assert_eq!((parts.year, parts.month), (Some(2024), Some(3)));
    }

    #[test]
    fn fallback_reads_tokens_positionally() {
        let p = split_parts("2024-13-40 bad");
        assert_eq!(p, DateParts { year: Some(2024), month: Some(13), day: Some(40) });
        assert_eq!(p.to_date(), None);

        let p = split_parts("2024");
        assert_eq!(p.year, Some(2024));
        assert_eq!(p.month, None);

        assert_eq!(interpret(&RawDate::Text("n/a".into())).month, None);
        assert_eq!(interpret(&RawDate::Missing), DateParts::default());
    }

    #[test]
    fn calendar_date_for_ranges() {
        assert_eq!(
            interpret(&RawDate::Serial(45000.0)).to_date(),
            NaiveDate::from_ymd_opt(2023, 3, 15)
        );
        assert_eq!(interpret(&RawDate::Text("2024-02".into())).to_date(), None);
    }
}
