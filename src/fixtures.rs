//! Test documents built on the fly

use docx_rust::document::Paragraph;
use docx_rust::Docx;
use std::fs;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Default)]
pub struct EpubFixture<'a> {
    pub title: Option<&'a str>,
    pub creator: Option<&'a str>,
    /// (href relative to the package, bytes, declared as cover-image)
    pub images: Vec<(&'a str, &'a [u8], bool)>,
}

const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

const NAV: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Índice</title></head>
<body>
  <nav epub:type="toc"><ol><li><a href="ch1.xhtml">Capítulo 1</a></li></ol></nav>
</body>
</html>"#;

const CHAPTER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Capítulo 1</title></head>
<body><h2>Capítulo 1</h2><p>Hola.</p></body>
</html>"#;

pub fn write_epub(path: &Path, fixture: &EpubFixture) {
    let mut metadata = String::from(
        r#"<dc:identifier id="uid">urn:uuid:7d2a4f1e-0000-4000-8000-000000000001</dc:identifier>
    <dc:language>es</dc:language>
    <meta property="dcterms:modified">2024-01-01T00:00:00Z</meta>"#,
    );
    if let Some(title) = fixture.title {
        metadata.push_str(&format!("\n    <dc:title>{}</dc:title>", title));
    }
    if let Some(creator) = fixture.creator {
        metadata.push_str(&format!("\n    <dc:creator>{}</dc:creator>", creator));
    }

    let mut manifest = String::from(
        r#"<item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>"#,
    );
    for (i, (href, _, declared)) in fixture.images.iter().enumerate() {
        let media_type = if href.ends_with(".png") {
            "image/png"
        } else {
            "image/jpeg"
        };
        let properties = if *declared {
            r#" properties="cover-image""#
        } else {
            ""
        };
        manifest.push_str(&format!(
            "\n    <item id=\"img{}\" href=\"{}\" media-type=\"{}\"{}/>",
            i, href, media_type, properties
        ));
    }

    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    {}
  </metadata>
  <manifest>
    {}
  </manifest>
  <spine>
    <itemref idref="ch1"/>
  </spine>
</package>"#,
        metadata, manifest
    );

    let file = fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();

    let entries = [
        ("META-INF/container.xml", CONTAINER),
        ("OEBPS/content.opf", opf.as_str()),
        ("OEBPS/nav.xhtml", NAV),
        ("OEBPS/ch1.xhtml", CHAPTER),
    ];
    for (name, content) in entries {
        zip.start_file(name, stored).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    for (href, data, _) in &fixture.images {
        zip.start_file(format!("OEBPS/{}", href), stored).unwrap();
        zip.write_all(data).unwrap();
    }

    zip.finish().unwrap();
}

pub fn write_docx(path: &Path, paragraphs: &[&str]) {
    let mut docx = Docx::default();
    for text in paragraphs {
        docx.document.push(Paragraph::default().push_text(*text));
    }
    docx.write_file(path).unwrap();
}
