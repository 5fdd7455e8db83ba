//! Capture dates embedded in file names by cameras, phones and messengers.

use crate::calendar::datetime_from_captures;
use crate::consts::{
    FILENAME_COMPACT_DATE, FILENAME_COMPACT_DATETIME, FILENAME_SEPARATED_DATE, FILENAME_SEPARATED_DATETIME,
    FILENAME_WHATSAPP,
};
use regex::Regex;
use std::sync::LazyLock;
use time::PrimitiveDateTime;

/// Patterns in priority order: the most specific first, so a full timestamp
/// is never reduced to its date part.
static PATTERNS: [&LazyLock<Regex>; 5] = [
    &FILENAME_COMPACT_DATETIME,
    &FILENAME_SEPARATED_DATETIME,
    &FILENAME_WHATSAPP,
    &FILENAME_SEPARATED_DATE,
    &FILENAME_COMPACT_DATE,
];

/// Extract a date from a file name (with or without extension).
///
/// The first pattern producing a valid calendar date wins. A pattern that
/// matches digits which don't form a valid date (e.g. month `13`) falls
/// through to the next pattern.
pub fn date_from_filename(name: &str) -> Option<PrimitiveDateTime> {
    PATTERNS.iter().find_map(|pattern| {
        pattern.captures_iter(name).find_map(|captures| datetime_from_captures(&captures))
    })
}
