use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// An assembled report, ready for serialization.
///
/// Build-once value: the assembler produces it in a single pass and
/// nothing mutates it afterwards. Section order is fixed and total.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub sections: Vec<Section>,
}

impl GeneratedDocument {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

/// The eight report sections, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Cover,
    TableOfContents,
    Introduction,
    Feasibility,
    Costing,
    Requirements,
    Diagrams,
    Conclusion,
}

/// One formatted element of a section.
#[derive(Debug, Clone)]
pub enum Block {
    /// Styled heading; `level` is 1-3.
    Heading { level: u8, text: String },
    Paragraph(Paragraph),
    Bullet(String),
    Table(Table),
    /// An embedded diagram with its centered caption.
    Image { image: EmbeddedImage, caption: String },
    /// Textual stand-in for a diagram slot that has no embeddable image.
    Placeholder(String),
    /// A link paragraph pointing at the live prototype.
    Hyperlink { url: String },
    /// Field the word processor expands into a table of contents.
    TocField,
    PageBreak,
}

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub align: Alignment,
    /// Extra space above the paragraph, in twentieths of a point.
    pub spacing_before: Option<u32>,
}

impl Paragraph {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
            ..Self::default()
        }
    }

    pub fn runs(runs: Vec<TextRun>) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn centered(mut self) -> Self {
        self.align = Alignment::Center;
        self
    }

    pub fn spaced_before(mut self, twips: u32) -> Self {
        self.spacing_before = Some(twips);
        self
    }
}

#[derive(Debug, Clone)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    /// Font size in half-points, `None` for the document default.
    pub size: Option<u32>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            size: None,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            size: None,
        }
    }

    pub fn sized(mut self, half_points: u32) -> Self {
        self.size = Some(half_points);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

/// Full-width table of plain text cells; header cells are bold.
#[derive(Debug, Clone)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone)]
pub struct TableCell {
    pub text: String,
    pub bold: bool,
}

impl TableRow {
    pub fn header(cells: &[&str]) -> Self {
        Self {
            cells: cells
                .iter()
                .map(|c| TableCell {
                    text: (*c).to_string(),
                    bold: true,
                })
                .collect(),
        }
    }

    pub fn plain(cells: &[&str]) -> Self {
        Self {
            cells: cells
                .iter()
                .map(|c| TableCell {
                    text: (*c).to_string(),
                    bold: false,
                })
                .collect(),
        }
    }
}

/// A decoded raster image ready for embedding.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

/// Raster encodings accepted for diagram uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Read the encoding from a data-URL prefix. Unrecognized encodings
    /// are interpreted as PNG.
    pub fn sniff(data_url: &str) -> Self {
        if data_url.starts_with("data:image/png") {
            Self::Png
        } else if data_url.starts_with("data:image/jpeg") || data_url.starts_with("data:image/jpg")
        {
            Self::Jpeg
        } else if data_url.starts_with("data:image/gif") {
            Self::Gif
        } else if data_url.starts_with("data:image/bmp") {
            Self::Bmp
        } else {
            Self::Png
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }
}

/// Decode an uploaded diagram payload (a base64 data URL, or bare base64)
/// into an [`EmbeddedImage`]. Returns `None` when the payload is not
/// decodable; the assembler renders a placeholder in that case.
pub fn decode_data_url(payload: &str) -> Option<EmbeddedImage> {
    let format = ImageFormat::sniff(payload);
    let encoded = match payload.split_once(',') {
        Some((_, rest)) => rest,
        None => payload,
    };

    let data = BASE64.decode(encoded.trim()).ok()?;
    if data.is_empty() {
        return None;
    }

    Some(EmbeddedImage { format, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(ImageFormat::sniff("data:image/png;base64,AA"), ImageFormat::Png);
        assert_eq!(ImageFormat::sniff("data:image/jpeg;base64,AA"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::sniff("data:image/jpg;base64,AA"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::sniff("data:image/gif;base64,AA"), ImageFormat::Gif);
        assert_eq!(ImageFormat::sniff("data:image/bmp;base64,AA"), ImageFormat::Bmp);
    }

    #[test]
    fn unknown_format_defaults_to_png() {
        assert_eq!(ImageFormat::sniff("data:image/webp;base64,AA"), ImageFormat::Png);
        assert_eq!(ImageFormat::sniff("AAAA"), ImageFormat::Png);
    }

    #[test]
    fn decodes_a_data_url() {
        let img = decode_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(img.format, ImageFormat::Png);
        assert_eq!(&img.data[..4], b"\x89PNG");
    }

    #[test]
    fn rejects_garbage_payloads() {
        assert!(decode_data_url("data:image/png;base64,!!!not-base64!!!").is_none());
        assert!(decode_data_url("data:image/png;base64,").is_none());
    }
}
