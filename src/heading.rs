use crate::numeral::parse_numeral;
use regex::Regex;

pub const DEFAULT_MARKERS: [&str; 2] = ["CAPÍTULO", "CAPITULO"];

/// A recognized chapter heading line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub numeral: String,
    pub number: u32,
    /// Text trailing the numeral, trimmed. Empty when the heading has no title.
    pub title: String,
}

/// Line-local chapter heading recognizer.
///
/// A heading is a marker word, whitespace, one numeral token (digits or Roman
/// letters) and optional trailing text, matched case-insensitively. Roman
/// numerals must end at a word boundary so "Diez" is not read as "D"; digits
/// may run straight into the title ("1º").
#[derive(Debug, Clone)]
pub struct HeadingMatcher {
    pattern: Regex,
}

impl HeadingMatcher {
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = markers
            .iter()
            .map(|m| m.as_ref().trim())
            .filter(|m| !m.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Self::new(&DEFAULT_MARKERS);
        }

        let pattern = Regex::new(&format!(
            r"(?i)^(?:{})\s+([0-9]+|[IVXLCDM]+\b)(.*)$",
            alternatives.join("|")
        ))?;
        Ok(Self { pattern })
    }

    /// Match a single line. Lines whose numeral decodes to 0 are not headings.
    pub fn match_line(&self, line: &str) -> Option<Heading> {
        let caps = self.pattern.captures(line.trim())?;
        let numeral = caps.get(1)?.as_str().to_string();
        let number = parse_numeral(&numeral);
        if number == 0 {
            return None;
        }

        let title = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        Some(Heading {
            numeral,
            number,
            title,
        })
    }
}

impl Default for HeadingMatcher {
    fn default() -> Self {
        Self::new(&DEFAULT_MARKERS).expect("default markers form a valid pattern")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_heading_with_title_case_insensitively() {
        let matcher = HeadingMatcher::default();
        let heading = matcher.match_line("capitulo III la fuga").unwrap();
        assert_eq!(heading.numeral, "III");
        assert_eq!(heading.number, 3);
        assert_eq!(heading.title, "la fuga");
    }

    #[test]
    fn matches_accented_marker_and_digits() {
        let matcher = HeadingMatcher::default();
        let heading = matcher.match_line("CAPÍTULO 12").unwrap();
        assert_eq!(heading.number, 12);
        assert_eq!(heading.title, "");

        let heading = matcher.match_line("  Capítulo 4   El baile  ").unwrap();
        assert_eq!(heading.number, 4);
        assert_eq!(heading.title, "El baile");
    }

    #[test]
    fn ordinary_lines_are_not_headings() {
        let matcher = HeadingMatcher::default();
        assert!(matcher.match_line("Era una noche oscura.").is_none());
        assert!(matcher.match_line("En el capítulo II se dijo").is_none());
        assert!(matcher.match_line("CAPÍTULO").is_none());
        assert!(matcher.match_line("CAPÍTULO Diez").is_none());
        assert!(matcher.match_line("CAPÍTULO 0").is_none());
    }

    #[test]
    fn digits_may_be_followed_directly_by_text() {
        let matcher = HeadingMatcher::default();
        let heading = matcher.match_line("CAPÍTULO 1º").unwrap();
        assert_eq!(heading.number, 1);
        assert_eq!(heading.title, "º");

        let heading = matcher.match_line("CAPÍTULO 2ª parte").unwrap();
        assert_eq!(heading.number, 2);
        assert_eq!(heading.title, "ª parte");

        let heading = matcher.match_line("CAPÍTULO 12abc").unwrap();
        assert_eq!(heading.number, 12);
        assert_eq!(heading.title, "abc");

        assert!(matcher.match_line("CAPÍTULO Diez").is_none());
        assert!(matcher.match_line("CAPÍTULO IVa").is_none());
    }

    #[test]
    fn custom_markers_replace_defaults() {
        let matcher = HeadingMatcher::new(&["Chapter", "Part"]).unwrap();
        assert_eq!(matcher.match_line("chapter IX").unwrap().number, 9);
        assert_eq!(matcher.match_line("PART 2 Return").unwrap().title, "Return");
        assert!(matcher.match_line("CAPÍTULO I").is_none());
    }

    #[test]
    fn empty_marker_list_falls_back_to_defaults() {
        let none: [&str; 0] = [];
        let matcher = HeadingMatcher::new(&none).unwrap();
        assert!(matcher.match_line("CAPITULO V").is_some());
    }
}
