//! Turn reader output into the annotated plain text the extraction prompt
//! consumes. Document structure survives as inline markers so the model can
//! cite section locations.

use serde::Deserialize;

/// Structural role of a paragraph, as classified by the document reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphKind {
    /// Heading / title styles.
    SectionHeader,
    /// Bold lead-in paragraphs.
    Subsection,
    Body,
}

/// One paragraph handed over by the (out-of-process) document reader.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentParagraph {
    pub text: String,
    pub kind: ParagraphKind,
}

/// Render paragraphs with structure markers. Empty paragraphs are dropped.
pub fn annotate(paragraphs: &[DocumentParagraph]) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(paragraphs.len());
    for paragraph in paragraphs {
        let text = paragraph.text.trim();
        if text.is_empty() {
            continue;
        }
        match paragraph.kind {
            ParagraphKind::SectionHeader => {
                parts.push(format!("\n\n=== SECTION_HEADER: {text} ===\n"));
            }
            ParagraphKind::Subsection => {
                parts.push(format!("\n--- SUBSECTION: {text} ---\n"));
            }
            ParagraphKind::Body => parts.push(text.to_string()),
        }
    }
    parts.join("\n")
}

/// Clean extracted text: strip invisible characters, trim every line, drop
/// blank lines. Structure markers stay; the surrounding padding goes.
pub fn clean_text(text: &str) -> String {
    let visible = remove_invisible_chars(text);
    visible
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full normalization: annotate then clean.
pub fn normalize_document(paragraphs: &[DocumentParagraph]) -> String {
    clean_text(&annotate(paragraphs))
}

/// Remove BOM, zero-width and other invisible formatting characters that
/// DOCX exports tend to leak into the text. Bidi marks are kept: this is
/// Hebrew text and they carry meaning for mixed-direction fragments.
fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'   // Zero-width space
                | '\u{200C}' // Zero-width non-joiner
                | '\u{200D}' // Zero-width joiner
                | '\u{2060}' // Word joiner
                | '\u{FEFF}' // BOM / zero-width no-break space
            )
        })
        .collect()
}
