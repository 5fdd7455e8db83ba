//! EXIF date-time values as reported by exiftool.

use crate::calendar::datetime_from_captures;
use crate::consts::EXIF_DATETIME;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const EXIF_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]:[month]:[day] [hour]:[minute]:[second]");

/// Parse `YYYY:MM:DD HH:MM:SS`, tolerating sub-seconds and a timezone suffix
/// (both discarded). Cameras with an unset clock write all zeroes, which is
/// treated as no date at all.
pub fn parse_exif_datetime(value: &str) -> Option<PrimitiveDateTime> {
    let captures = EXIF_DATETIME.captures(value.trim())?;
    datetime_from_captures(&captures)
}

/// Format a date-time the way EXIF stores it.
pub fn format_exif_datetime(datetime: PrimitiveDateTime) -> String {
    // Only fails for years that cannot be written with four digits, which
    // never get past date resolution.
    datetime.format(EXIF_FORMAT).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    #[rstest]
    #[case("2019:07:14 15:30:12", Some(datetime!(2019-07-14 15:30:12)))]
    #[case(" 2019:07:14 15:30:12 ", Some(datetime!(2019-07-14 15:30:12)))]
    #[case("2019:07:14 15:30:12.123", Some(datetime!(2019-07-14 15:30:12)))]
    #[case("2019:07:14 15:30:12+02:00", Some(datetime!(2019-07-14 15:30:12)))]
    #[case("2019:07:14 15:30:12Z", Some(datetime!(2019-07-14 15:30:12)))]
    #[case("0000:00:00 00:00:00", None)]
    #[case("2019:02:30 10:00:00", None)]
    #[case("2019-07-14", None)]
    #[case("", None)]
    fn test_parse_exif_datetime(#[case] value: &str, #[case] expected: Option<PrimitiveDateTime>) {
        assert_eq!(parse_exif_datetime(value), expected);
    }

    #[test]
    fn test_format_exif_datetime() {
        assert_eq!(format_exif_datetime(datetime!(2008-01-02 03:04:05)), "2008:01:02 03:04:05");
    }
}
