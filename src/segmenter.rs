use crate::heading::HeadingMatcher;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// One numbered chapter of a segmented manuscript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub number: u32,
    /// Empty when the heading carried no title
    pub title: String,
    pub content_html: String,
}

/// Something about a segmentation result an operator should look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    NoChapters,
    Duplicate(u32),
    OutOfOrder { previous: u32, next: u32 },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::NoChapters => write!(f, "no chapter headings recognized"),
            Anomaly::Duplicate(n) => write!(f, "chapter {} appears more than once", n),
            Anomaly::OutOfOrder { previous, next } => {
                write!(f, "chapter {} follows chapter {}", next, previous)
            }
        }
    }
}

struct OpenChapter {
    number: u32,
    title: String,
    paragraphs: Vec<String>,
}

impl OpenChapter {
    /// A chapter with no accumulated paragraphs is dropped
    fn close(self) -> Option<Chapter> {
        if self.paragraphs.is_empty() {
            return None;
        }
        let content_html = render_chapter(self.number, &self.title, &self.paragraphs);
        Some(Chapter {
            number: self.number,
            title: self.title,
            content_html,
        })
    }
}

/// Partition a paragraph stream into chapters, in encounter order.
///
/// Blank paragraphs are skipped, paragraphs before the first heading are
/// discarded, and numbers are passed through exactly as decoded.
pub fn segment<I, S>(paragraphs: I, matcher: &HeadingMatcher) -> Vec<Chapter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut chapters = Vec::new();
    let mut current: Option<OpenChapter> = None;

    for paragraph in paragraphs {
        let text = paragraph.as_ref().trim();
        if text.is_empty() {
            continue;
        }

        if let Some(heading) = matcher.match_line(text) {
            debug!(numeral = %heading.numeral, number = heading.number, "Chapter heading");
            if let Some(chapter) = current.take().and_then(OpenChapter::close) {
                chapters.push(chapter);
            }
            current = Some(OpenChapter {
                number: heading.number,
                title: heading.title,
                paragraphs: Vec::new(),
            });
        } else if let Some(ref mut open) = current {
            open.paragraphs.push(text.to_string());
        }
    }

    if let Some(chapter) = current.and_then(OpenChapter::close) {
        chapters.push(chapter);
    }

    chapters
}

/// Render a chapter body as `<h2>` plus one `<p>` per paragraph.
///
/// Text is wrapped, not escaped.
pub fn render_chapter<S: AsRef<str>>(number: u32, title: &str, paragraphs: &[S]) -> String {
    let mut parts = Vec::with_capacity(paragraphs.len() + 1);

    if title.is_empty() {
        parts.push(format!("<h2>Capítulo {}</h2>", number));
    } else {
        parts.push(format!("<h2>Capítulo {}: {}</h2>", number, title));
    }

    for paragraph in paragraphs {
        let text = paragraph.as_ref();
        if !text.trim().is_empty() {
            parts.push(format!("<p>{}</p>", text));
        }
    }

    parts.join("\n")
}

pub fn anomalies(chapters: &[Chapter]) -> Vec<Anomaly> {
    if chapters.is_empty() {
        return vec![Anomaly::NoChapters];
    }

    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for (i, chapter) in chapters.iter().enumerate() {
        if !seen.insert(chapter.number) && reported.insert(chapter.number) {
            found.push(Anomaly::Duplicate(chapter.number));
        }
        if i > 0 {
            let previous = chapters[i - 1].number;
            if chapter.number < previous {
                found.push(Anomaly::OutOfOrder {
                    previous,
                    next: chapter.number,
                });
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(paragraphs: &[&str]) -> Vec<Chapter> {
        segment(paragraphs.iter().copied(), &HeadingMatcher::default())
    }

    #[test]
    fn two_chapter_scenario() {
        let chapters = run(&["CAPÍTULO I", "Hola.", "Mundo.", "CAPÍTULO II Viaje", "Adiós."]);
        assert_eq!(chapters.len(), 2);

        assert_eq!(chapters[0].number, 1);
        assert_eq!(chapters[0].title, "");
        assert!(chapters[0].content_html.contains("<h2>Capítulo 1</h2>"));
        assert!(chapters[0].content_html.contains("<p>Hola.</p>"));
        assert!(chapters[0].content_html.contains("<p>Mundo.</p>"));

        assert_eq!(chapters[1].number, 2);
        assert_eq!(chapters[1].title, "Viaje");
        assert!(chapters[1].content_html.contains("<h2>Capítulo 2: Viaje</h2>"));
        assert!(chapters[1].content_html.contains("<p>Adiós.</p>"));
    }

    #[test]
    fn rendering_is_exact() {
        let chapters = run(&["CAPITULO 3 Fin", "Uno.", "Dos."]);
        assert_eq!(
            chapters[0].content_html,
            "<h2>Capítulo 3: Fin</h2>\n<p>Uno.</p>\n<p>Dos.</p>"
        );
    }

    #[test]
    fn blank_paragraphs_never_render() {
        let chapters = run(&["", "CAPÍTULO I", "  ", "Texto.", "\t", "", "Más."]);
        assert_eq!(chapters.len(), 1);
        assert!(!chapters[0].content_html.contains("<p></p>"));
        assert_eq!(chapters[0].content_html.matches("<p>").count(), 2);
    }

    #[test]
    fn paragraphs_before_first_heading_are_discarded() {
        let chapters = run(&["Prólogo suelto.", "Dedicatoria.", "CAPÍTULO 1", "Inicio."]);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].number, 1);
        assert!(!chapters[0].content_html.contains("Prólogo"));
        assert!(!chapters[0].content_html.contains("Dedicatoria"));
    }

    #[test]
    fn adjacent_headings_keep_only_the_second() {
        let chapters = run(&["CAPÍTULO I", "CAPÍTULO II", "Texto."]);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].number, 2);

        let chapters = run(&["CAPÍTULO I", "Texto.", "CAPÍTULO II"]);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].number, 1);
    }

    #[test]
    fn duplicates_and_disorder_pass_through() {
        let chapters = run(&["CAPÍTULO 2", "b", "CAPÍTULO 1", "a", "CAPÍTULO 2", "c"]);
        let numbers: Vec<u32> = chapters.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![2, 1, 2]);

        let found = anomalies(&chapters);
        assert!(found.contains(&Anomaly::Duplicate(2)));
        assert!(found.contains(&Anomaly::OutOfOrder { previous: 2, next: 1 }));
    }

    #[test]
    fn no_headings_is_an_anomaly() {
        let chapters = run(&["Sólo texto.", "Sin capítulos."]);
        assert!(chapters.is_empty());
        assert_eq!(anomalies(&chapters), vec![Anomaly::NoChapters]);
    }

    #[test]
    fn clean_run_has_no_anomalies() {
        let chapters = run(&["CAPÍTULO I", "a", "CAPÍTULO II", "b"]);
        assert!(anomalies(&chapters).is_empty());
    }

    #[test]
    fn reprocessing_is_byte_identical() {
        let input = ["x", "CAPÍTULO IV Cuatro", "a", "", "b", "CAPÍTULO V", "c"];
        assert_eq!(run(&input), run(&input));
    }
}
