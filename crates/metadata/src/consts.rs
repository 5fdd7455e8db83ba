use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Property holding the capture time written by the camera.
pub const DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
/// Property holding the comma separated keyword list.
pub const KEYWORDS: &str = "Keywords";
/// Separator used for multi-valued properties, both when reading and writing.
pub const LIST_SEPARATOR: &str = ", ";

// The `regex` crate has no look-around, so digit boundaries are matched with
// `(?:^|\D)` and `(?:\D|$)` instead.
regex!(
    FILENAME_COMPACT_DATETIME,
    r"(?:^|\D)(\d{4})(\d{2})(\d{2})[_-](\d{2})(\d{2})(\d{2})(?:\D|$)"
);
regex!(
    FILENAME_SEPARATED_DATETIME,
    r"(?:^|\D)(\d{4})-(\d{2})-(\d{2})[ _](\d{2})[.\-](\d{2})[.\-](\d{2})(?:\D|$)"
);
regex!(FILENAME_WHATSAPP, r"(?i)IMG-(\d{4})(\d{2})(\d{2})-WA");
regex!(FILENAME_SEPARATED_DATE, r"(?:^|\D)(\d{4})-(\d{2})-(\d{2})(?:\D|$)");
regex!(FILENAME_COMPACT_DATE, r"(?:^|\D)(\d{4})(\d{2})(\d{2})(?:\D|$)");
regex!(
    EXIF_DATETIME,
    r"^(\d{4}):(\d{2}):(\d{2})[ T](\d{2}):(\d{2}):(\d{2})(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?$"
);
regex!(DICTIONARY_VALUE, r"^(\d{4})(?:-(\d{2})(?:-(\d{2}))?)?$");
