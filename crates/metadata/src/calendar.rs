//! Validated construction of dates from regex captures.

use regex::Captures;
use time::{Date, Month, PrimitiveDateTime, Time};

/// Dates outside this range are almost always counters or serial numbers
/// that happen to look like dates.
pub(crate) const YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

fn capture<T: std::str::FromStr>(captures: &Captures<'_>, index: usize) -> Option<T> {
    captures.get(index)?.as_str().parse().ok()
}

/// Build a date-time from six numeric captures (year, month, day, hour,
/// minute, second) starting at group 1. Missing time groups mean midnight.
pub(crate) fn datetime_from_captures(captures: &Captures<'_>) -> Option<PrimitiveDateTime> {
    let date = date(capture(captures, 1)?, capture(captures, 2)?, capture(captures, 3)?)?;
    let time = match captures.get(4) {
        Some(_) => Time::from_hms(capture(captures, 4)?, capture(captures, 5)?, capture(captures, 6)?).ok()?,
        None => Time::MIDNIGHT,
    };
    Some(PrimitiveDateTime::new(date, time))
}

pub(crate) fn date(year: i32, month: u8, day: u8) -> Option<Date> {
    if !YEARS.contains(&year) {
        return None;
    }
    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2019, 7, 14, true)]
    #[case(2020, 2, 29, true)]
    #[case(2019, 2, 29, false)]
    #[case(2019, 13, 1, false)]
    #[case(2019, 0, 1, false)]
    #[case(1899, 12, 31, false)]
    #[case(2101, 1, 1, false)]
    #[case(1900, 1, 1, true)]
    fn test_date_validation(#[case] year: i32, #[case] month: u8, #[case] day: u8, #[case] valid: bool) {
        assert_eq!(date(year, month, day).is_some(), valid);
    }
}
