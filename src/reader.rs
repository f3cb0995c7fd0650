pub const DEFAULT_TITLE: &str = "Sin Título";
pub const DEFAULT_AUTHOR: &str = "Desconocido";

/// Shared image representation across all input formats
pub struct ImageResource {
    pub original_href: String,
    pub data: Vec<u8>,
}

/// Bibliographic fields read from a source document
#[derive(Debug, Clone, Default)]
pub struct SourceMetadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub description: Option<String>,
}

impl SourceMetadata {
    pub fn title_or_default(&self) -> String {
        non_blank(self.title.as_deref()).unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    /// First non-blank author, as the archive records a single author string
    pub fn author_or_default(&self) -> String {
        self.authors
            .iter()
            .find_map(|a| non_blank(Some(a.as_str())))
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
    }

    pub fn description(&self) -> Option<String> {
        non_blank(self.description.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
