use crate::consts::DATE_TIME_ORIGINAL;
use crate::dictionary::DateDictionary;
use crate::exif::parse_exif_datetime;
use crate::filename::date_from_filename;
use crate::PropertyMap;
use derive_more::Display;
use std::path::Path;
use time::{Month, PrimitiveDateTime};

/// Where a resolved date came from.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    #[display("exif")]
    Exif,
    #[display("filename")]
    Filename,
    #[display("dictionary")]
    Dictionary,
}

/// Every date candidate found for one file.
///
/// Candidates are gathered independently and only ranked on
/// [`resolve`](Self::resolve): the camera's own timestamp beats a date in the
/// file name, which beats whatever the containing folder is known to mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompiledDate {
    pub from_filename_pattern: Option<PrimitiveDateTime>,
    pub from_exif_date_time_original: Option<PrimitiveDateTime>,
    pub from_dictionary_lookup: Option<PrimitiveDateTime>,
}

impl CompiledDate {
    pub fn compile(path: &Path, properties: &PropertyMap, dictionary: &DateDictionary) -> Self {
        Self {
            from_filename_pattern: path.file_name().and_then(|n| n.to_str()).and_then(date_from_filename),
            from_exif_date_time_original: properties.get(DATE_TIME_ORIGINAL).and_then(|v| parse_exif_datetime(v)),
            from_dictionary_lookup: dictionary.lookup(path),
        }
    }

    /// The highest priority date present, with where it came from.
    pub fn resolve_with_source(&self) -> Option<(PrimitiveDateTime, DateSource)> {
        self.from_exif_date_time_original
            .map(|d| (d, DateSource::Exif))
            .or_else(|| self.from_filename_pattern.map(|d| (d, DateSource::Filename)))
            .or_else(|| self.from_dictionary_lookup.map(|d| (d, DateSource::Dictionary)))
    }

    pub fn resolve(&self) -> Option<PrimitiveDateTime> {
        self.resolve_with_source().map(|(date, _)| date)
    }

    pub fn year_month(&self) -> Option<(i32, Month)> {
        self.resolve().map(|d| (d.year(), d.month()))
    }

    /// Whether the file itself already carries a capture date.
    pub fn has_exif(&self) -> bool {
        self.from_exif_date_time_original.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeMap;
    use time::macros::datetime;

    const EXIF: PrimitiveDateTime = datetime!(2015-03-04 10:11:12);
    const FILENAME: PrimitiveDateTime = datetime!(2016-05-06 00:00:00);
    const DICTIONARY: PrimitiveDateTime = datetime!(2017-01-01 00:00:00);

    #[rstest]
    #[case(Some(EXIF), Some(FILENAME), Some(DICTIONARY), Some(EXIF))]
    #[case(None, Some(FILENAME), Some(DICTIONARY), Some(FILENAME))]
    #[case(None, None, Some(DICTIONARY), Some(DICTIONARY))]
    #[case(Some(EXIF), None, Some(DICTIONARY), Some(EXIF))]
    #[case(None, None, None, None)]
    fn test_resolve_priority(
        #[case] exif: Option<PrimitiveDateTime>,
        #[case] filename: Option<PrimitiveDateTime>,
        #[case] dictionary: Option<PrimitiveDateTime>,
        #[case] expected: Option<PrimitiveDateTime>,
    ) {
        let compiled = CompiledDate {
            from_filename_pattern: filename,
            from_exif_date_time_original: exif,
            from_dictionary_lookup: dictionary,
        };
        assert_eq!(compiled.resolve(), expected);
        assert_eq!(compiled.year_month(), expected.map(|d| (d.year(), d.month())));
    }

    #[test]
    fn test_compile_gathers_every_source() {
        let dictionary = DateDictionary::new(BTreeMap::from([("Rome".to_string(), "2017".to_string())]));
        let properties = PropertyMap::from([(DATE_TIME_ORIGINAL.to_string(), "2015:03:04 10:11:12".to_string())]);
        let compiled = CompiledDate::compile(Path::new("Rome/2016-05-06 beach.jpg"), &properties, &dictionary);
        assert_eq!(compiled.from_exif_date_time_original, Some(EXIF));
        assert_eq!(compiled.from_filename_pattern, Some(FILENAME));
        assert_eq!(compiled.from_dictionary_lookup, Some(DICTIONARY));
        assert_eq!(compiled.resolve_with_source(), Some((EXIF, DateSource::Exif)));
        assert_eq!(compiled.year_month(), Some((2015, Month::March)));
    }

    #[test]
    fn test_zeroed_exif_falls_back_to_filename() {
        let properties = PropertyMap::from([(DATE_TIME_ORIGINAL.to_string(), "0000:00:00 00:00:00".to_string())]);
        let compiled = CompiledDate::compile(Path::new("IMG_20160506_000000.jpg"), &properties, &DateDictionary::default());
        assert!(!compiled.has_exif());
        assert_eq!(compiled.resolve_with_source(), Some((FILENAME, DateSource::Filename)));
    }
}
