//! Destination path templates.
//!
//! Turns a resolved capture date and the original file name into a
//! library-relative path using a user-configured [upon] template. The syntax
//! follows upon's Mustache-like conventions (`{{ variable }}`,
//! `{{ value|formatter }}`), extended with:
//!
//! - **`slug`**: converts strings to URL-safe slugs, stripping quotation
//!   marks first to avoid leading/trailing hyphens.
//! - **`truncate`**: truncates strings to a maximum byte length at a
//!   character boundary, as `truncate(value, n)` or `{{ value|truncate: n }}`.
//!
//! # Template Variables
//!
//! | Variable   | Example           | Description                               |
//! |------------|-------------------|-------------------------------------------|
//! | `year`     | `2019`            | Four digit year                           |
//! | `month`    | `07`              | Zero padded month                         |
//! | `day`      | `14`              | Zero padded day of month                  |
//! | `hour`     | `15`              | Zero padded hour (24h)                    |
//! | `minute`   | `30`              | Zero padded minute                        |
//! | `second`   | `12`              | Zero padded second                        |
//! | `date`     | `20190714_153012` | Compact timestamp                         |
//! | `filename` | `IMG_0001.JPG`    | Original file name, extension included    |
//! | `stem`     | `IMG_0001`        | Original file name without extension      |
//! | `ext`      | `jpg`             | Lowercased extension, empty if none       |
//!
//! # Example
//!
//! ```
//! use shoebox_library::PathGenerator;
//! use std::path::Path;
//! use time::macros::datetime;
//!
//! let generator: PathGenerator = "{{ year }}/{{ month }}/{{ date }}.{{ ext }}".parse().unwrap();
//! let path = generator.generate(datetime!(2019-07-14 15:30:12), Path::new("inbox/IMG_0001.JPG")).unwrap();
//! assert_eq!(path, Path::new("2019/07/20190714_153012.jpg"));
//! ```

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use shoebox_storage::validate_path;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use time::PrimitiveDateTime;
use tracing::instrument;
use upon::{Engine, Template};

pub const DEFAULT_TEMPLATE: &str = "{{ year }}/{{ month }}/{{ filename }}";

/// Renders destination paths from a compiled template.
///
/// Constructed via [`FromStr`], which compiles eagerly so syntax errors
/// surface before a run starts rather than on the first file.
pub struct PathGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl FromStr for PathGenerator {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}
impl Default for PathGenerator {
    fn default() -> Self {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(DEFAULT_TEMPLATE);
        match template {
            Ok(template) => Self { engine, template },
            Err(err) => unreachable!("built-in template does not compile: {err}"),
        }
    }
}
impl PathGenerator {
    /// Render the destination of `source` (a library-relative path) taken at
    /// `date`.
    ///
    /// Segments are trimmed and the result is validated so it can never
    /// escape the library root.
    #[instrument(skip_all, fields(source = %source.display()))]
    pub fn generate(&self, date: PrimitiveDateTime, source: &Path) -> Result<PathBuf> {
        let path = self
            .template
            .render(&self.engine, Self::parameters(date, source))
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Self::normalize(&path)
    }

    fn normalize(path: &str) -> Result<PathBuf> {
        let path = path.trim().split('/').map(str::trim).collect::<Vec<_>>().join("/");
        validate_path(&path).or_raise(|| ErrorKind::Template)
    }

    fn parameters(date: PrimitiveDateTime, source: &Path) -> upon::Value {
        let filename = source.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let stem = source.file_stem().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let ext = source.extension().map(|e| e.to_string_lossy().to_lowercase()).unwrap_or_default();
        let (month, day) = (u8::from(date.month()), date.day());
        let (hour, minute, second) = (date.hour(), date.minute(), date.second());
        upon::value! {
            year: format!("{:04}", date.year()),
            month: format!("{month:02}"),
            day: format!("{day:02}"),
            hour: format!("{hour:02}"),
            minute: format!("{minute:02}"),
            second: format!("{second:02}"),
            date: format!("{:04}{month:02}{day:02}_{hour:02}{minute:02}{second:02}", date.year()),
            filename: filename,
            stem: stem,
            ext: ext,
        }
    }
}

/// Custom [`upon`] extensions for path-safe string manipulation.
mod addons {
    use rslug::slugify;
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Strips quotation marks before slugifying, so `"hello"` doesn't become
    /// `-hello-`.
    fn slug_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                // Various quotation marks: '"''""„"`«»
                let marks = [
                    '\u{0027}', '\u{0022}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201B}',
                    '\u{0060}', '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}',
                ];
                let stripped: String = s.chars().filter(|c| !marks.contains(c)).collect();
                write!(f, "{}", slugify!(&stripped))?
            },
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> String {
        s[..s.floor_char_boundary(max_bytes)].to_string()
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("slug", slug_formatter);
        engine.add_function("truncate", truncate_to_char_boundary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    const TAKEN: PrimitiveDateTime = datetime!(2019-07-04 09:05:03);

    #[rstest]
    #[case(DEFAULT_TEMPLATE, "inbox/IMG_0001.JPG", "2019/07/IMG_0001.JPG")]
    #[case("{{ year }}/{{ year }}-{{ month }}-{{ day }}/{{ stem }}.{{ ext }}", "a/b/IMG_0001.JPG", "2019/2019-07-04/IMG_0001.jpg")]
    #[case("{{ date }}_{{ hour }}{{ minute }}{{ second }}", "x.mov", "20190704_090503_090503")]
    #[case("{{ year }}/ {{ month }} /{{ filename }}", "x.png", "2019/07/x.png")]
    #[case("/{{ year }}//{{ filename }}", "x.png", "2019/x.png")]
    fn test_generate(#[case] template: &str, #[case] source: &str, #[case] expected: &str) {
        let generator: PathGenerator = template.parse().unwrap();
        assert_eq!(generator.generate(TAKEN, Path::new(source)).unwrap(), PathBuf::from(expected));
    }

    #[test]
    fn test_default_matches_default_template() {
        let generated = PathGenerator::default().generate(TAKEN, Path::new("a.jpg")).unwrap();
        assert_eq!(generated, PathBuf::from("2019/07/a.jpg"));
    }

    #[test]
    fn test_slug_strips_quotes() {
        let generator: PathGenerator = "{{ stem|slug }}.{{ ext }}".parse().unwrap();
        let path = generator.generate(TAKEN, Path::new("\"Hello\" World's 'Test'.JPG")).unwrap();
        assert_eq!(path, PathBuf::from("hello-worlds-test.jpg"));
    }

    #[rstest]
    #[case("{{ truncate(stem, 6)|slug }}")]
    #[case("{{ stem|truncate: 6|slug }}")]
    fn test_truncate(#[case] template: &str) {
        let generator: PathGenerator = template.parse().unwrap();
        let path = generator.generate(TAKEN, Path::new("Summer Holiday.jpg")).unwrap();
        assert_eq!(path, PathBuf::from("summer"));
    }

    #[test]
    fn test_traversal_is_rejected() {
        let generator: PathGenerator = "../{{ filename }}".parse().unwrap();
        let err = generator.generate(TAKEN, Path::new("a.jpg")).unwrap_err();
        assert_eq!(*err, ErrorKind::Template);
    }

    #[test]
    fn test_invalid_template_fails_on_parse() {
        assert!("{{ year ".parse::<PathGenerator>().is_err());
    }

    #[test]
    fn test_unknown_variable_fails_on_render() {
        let generator: PathGenerator = "{{ camera }}/{{ filename }}".parse().unwrap();
        assert!(generator.generate(TAKEN, Path::new("a.jpg")).is_err());
    }
}
