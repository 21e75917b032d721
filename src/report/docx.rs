//! DOCX serialization.
//!
//! A DOCX file is an OPC ZIP container of WordprocessingML parts. The
//! writer emits the minimal part set (content types, package rels,
//! `word/document.xml`, styles, bullet numbering, and one media entry per
//! embedded diagram) with the XML built as strings through
//! [`escape_xml`]. Errors here are the fatal class: any container or I/O
//! failure aborts the whole build with no partial output.

use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::document::{
    Alignment, Block, EmbeddedImage, GeneratedDocument, Paragraph, Table, TextRun,
};

/// Fatal serialization failure. Recoverable per-field issues never reach
/// this layer; the assembler has already resolved them to placeholders.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("failed to write document archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to write document part: {0}")]
    Io(#[from] std::io::Error),
}

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// 914400 EMU per inch at 96 px/inch.
const EMU_PER_PIXEL: u64 = 9525;
/// Diagram display size, matching the wizard's 400×280 rendering.
const IMAGE_WIDTH_PX: u64 = 400;
const IMAGE_HEIGHT_PX: u64 = 280;

/// Serialize an assembled document into a DOCX byte blob.
pub fn to_docx_bytes(doc: &GeneratedDocument) -> Result<Vec<u8>, DocxError> {
    let mut body = BodyWriter::new();
    for section in &doc.sections {
        for block in &section.blocks {
            body.write_block(block);
        }
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let put = |zip: &mut ZipWriter<Cursor<Vec<u8>>>,
                   name: &str,
                   bytes: &[u8]|
     -> Result<(), DocxError> {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
        Ok(())
    };

    put(&mut zip, "[Content_Types].xml", content_types_xml().as_bytes())?;
    put(&mut zip, "_rels/.rels", package_rels_xml().as_bytes())?;
    put(&mut zip, "word/document.xml", body.document_xml().as_bytes())?;
    put(
        &mut zip,
        "word/_rels/document.xml.rels",
        body.document_rels_xml().as_bytes(),
    )?;
    put(&mut zip, "word/styles.xml", styles_xml().as_bytes())?;
    put(&mut zip, "word/numbering.xml", numbering_xml().as_bytes())?;
    for media in &body.media {
        put(&mut zip, &format!("word/{}", media.name), &media.data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

enum RelTarget {
    Internal(String),
    External(String),
}

struct Rel {
    id: String,
    kind: &'static str,
    target: RelTarget,
}

struct MediaPart {
    /// Part name relative to `word/`, e.g. `media/image1.png`.
    name: String,
    data: Vec<u8>,
}

struct BodyWriter {
    xml: String,
    rels: Vec<Rel>,
    media: Vec<MediaPart>,
    next_rel_id: u32,
    next_drawing_id: u32,
}

impl BodyWriter {
    fn new() -> Self {
        Self {
            xml: String::new(),
            // rId1/rId2 are reserved for the styles and numbering parts.
            rels: Vec::new(),
            media: Vec::new(),
            next_rel_id: 3,
            next_drawing_id: 1,
        }
    }

    fn alloc_rel(&mut self, kind: &'static str, target: RelTarget) -> String {
        let id = format!("rId{}", self.next_rel_id);
        self.next_rel_id += 1;
        self.rels.push(Rel {
            id: id.clone(),
            kind,
            target,
        });
        id
    }

    fn write_block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, text } => self.write_heading(*level, text),
            Block::Paragraph(p) => self.write_paragraph(p),
            Block::Bullet(text) => self.write_bullet(text),
            Block::Table(table) => self.write_table(table),
            Block::Image { image, caption } => self.write_image(image, caption),
            Block::Placeholder(text) => self.write_paragraph(&Paragraph::text(text.clone())),
            Block::Hyperlink { url } => self.write_hyperlink(url),
            Block::TocField => self.write_toc_field(),
            Block::PageBreak => self
                .xml
                .push_str("<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>"),
        }
    }

    fn write_heading(&mut self, level: u8, text: &str) {
        let level = level.clamp(1, 3);
        self.xml.push_str(&format!(
            "<w:p><w:pPr><w:pStyle w:val=\"Heading{level}\"/></w:pPr>{}</w:p>",
            run_xml(&TextRun::plain(text))
        ));
    }

    fn write_paragraph(&mut self, paragraph: &Paragraph) {
        self.xml.push_str("<w:p>");
        let mut props = String::new();
        if let Some(twips) = paragraph.spacing_before {
            props.push_str(&format!("<w:spacing w:before=\"{twips}\"/>"));
        }
        if paragraph.align == Alignment::Center {
            props.push_str("<w:jc w:val=\"center\"/>");
        }
        if !props.is_empty() {
            self.xml.push_str(&format!("<w:pPr>{props}</w:pPr>"));
        }
        for run in &paragraph.runs {
            self.xml.push_str(&run_xml(run));
        }
        self.xml.push_str("</w:p>");
    }

    fn write_bullet(&mut self, text: &str) {
        self.xml.push_str(&format!(
            "<w:p><w:pPr><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"1\"/></w:numPr></w:pPr>{}</w:p>",
            run_xml(&TextRun::plain(text))
        ));
    }

    fn write_table(&mut self, table: &Table) {
        self.xml.push_str(
            "<w:tbl><w:tblPr><w:tblW w:w=\"5000\" w:type=\"pct\"/><w:tblBorders>\
             <w:top w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
             <w:left w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
             <w:bottom w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
             <w:right w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
             <w:insideH w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
             <w:insideV w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\
             </w:tblBorders></w:tblPr>",
        );
        for row in &table.rows {
            self.xml.push_str("<w:tr>");
            for cell in &row.cells {
                let run = TextRun {
                    text: cell.text.clone(),
                    bold: cell.bold,
                    size: None,
                };
                self.xml.push_str(&format!(
                    "<w:tc><w:tcPr><w:tcW w:w=\"0\" w:type=\"auto\"/></w:tcPr><w:p>{}</w:p></w:tc>",
                    run_xml(&run)
                ));
            }
            self.xml.push_str("</w:tr>");
        }
        self.xml.push_str("</w:tbl>");
    }

    fn write_hyperlink(&mut self, url: &str) {
        let rel_id = self.alloc_rel(REL_HYPERLINK, RelTarget::External(url.to_string()));
        self.xml.push_str(&format!(
            "<w:p><w:hyperlink r:id=\"{rel_id}\" w:history=\"1\">\
             <w:r><w:rPr><w:rStyle w:val=\"Hyperlink\"/></w:rPr>\
             <w:t xml:space=\"preserve\">{}</w:t></w:r></w:hyperlink></w:p>",
            escape_xml(url)
        ));
    }

    fn write_toc_field(&mut self) {
        // The field is populated by the word processor on open/update.
        self.xml.push_str(
            "<w:p><w:fldSimple w:instr=\" TOC \\o &quot;1-3&quot; \\h \\z \\u \">\
             <w:r><w:t xml:space=\"preserve\">Update this field to generate the table of \
             contents.</w:t></w:r></w:fldSimple></w:p>",
        );
    }

    fn write_image(&mut self, image: &EmbeddedImage, caption: &str) {
        let index = self.media.len() + 1;
        let name = format!("media/image{index}.{}", image.format.extension());
        let rel_id = self.alloc_rel(REL_IMAGE, RelTarget::Internal(name.clone()));
        self.media.push(MediaPart {
            name,
            data: image.data.clone(),
        });

        let drawing_id = self.next_drawing_id;
        self.next_drawing_id += 1;
        let cx = IMAGE_WIDTH_PX * EMU_PER_PIXEL;
        let cy = IMAGE_HEIGHT_PX * EMU_PER_PIXEL;

        self.xml.push_str(&format!(
            "<w:p><w:r><w:drawing>\
             <wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">\
             <wp:extent cx=\"{cx}\" cy=\"{cy}\"/>\
             <wp:docPr id=\"{drawing_id}\" name=\"Diagram {drawing_id}\"/>\
             <a:graphic><a:graphicData uri=\"{NS_PIC}\">\
             <pic:pic>\
             <pic:nvPicPr><pic:cNvPr id=\"{drawing_id}\" name=\"Diagram {drawing_id}\"/>\
             <pic:cNvPicPr/></pic:nvPicPr>\
             <pic:blipFill><a:blip r:embed=\"{rel_id}\"/>\
             <a:stretch><a:fillRect/></a:stretch></pic:blipFill>\
             <pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
             <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>\
             </pic:pic></a:graphicData></a:graphic>\
             </wp:inline></w:drawing></w:r></w:p>"
        ));

        // Centered caption directly below the image.
        self.write_paragraph(&Paragraph::text(caption.to_string()).centered());
    }

    fn document_xml(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"{NS_W}\" xmlns:r=\"{NS_R}\" xmlns:wp=\"{NS_WP}\" \
             xmlns:a=\"{NS_A}\" xmlns:pic=\"{NS_PIC}\">\
             <w:body>{}\
             <w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>\
             <w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" \
             w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/></w:sectPr>\
             </w:body></w:document>",
            self.xml
        )
    }

    fn document_rels_xml(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
        );
        xml.push_str(&format!(
            "<Relationship Id=\"rId1\" Type=\"{REL_STYLES}\" Target=\"styles.xml\"/>\
             <Relationship Id=\"rId2\" Type=\"{REL_NUMBERING}\" Target=\"numbering.xml\"/>"
        ));
        for rel in &self.rels {
            match &rel.target {
                RelTarget::Internal(target) => xml.push_str(&format!(
                    "<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"/>",
                    rel.id,
                    rel.kind,
                    escape_xml(target)
                )),
                RelTarget::External(target) => xml.push_str(&format!(
                    "<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\" TargetMode=\"External\"/>",
                    rel.id,
                    rel.kind,
                    escape_xml(target)
                )),
            }
        }
        xml.push_str("</Relationships>");
        xml
    }
}

fn run_xml(run: &TextRun) -> String {
    let mut props = String::new();
    if run.bold {
        props.push_str("<w:b/>");
    }
    if let Some(size) = run.size {
        props.push_str(&format!("<w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/>"));
    }
    let props = if props.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{props}</w:rPr>")
    };
    format!(
        "<w:r>{props}<w:t xml:space=\"preserve\">{}</w:t></w:r>",
        escape_xml(&run.text)
    )
}

fn content_types_xml() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
     <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
     <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
     <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
     <Default Extension=\"png\" ContentType=\"image/png\"/>\
     <Default Extension=\"jpeg\" ContentType=\"image/jpeg\"/>\
     <Default Extension=\"gif\" ContentType=\"image/gif\"/>\
     <Default Extension=\"bmp\" ContentType=\"image/bmp\"/>\
     <Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
     <Override PartName=\"/word/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>\
     <Override PartName=\"/word/numbering.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml\"/>\
     </Types>"
        .to_string()
}

fn package_rels_xml() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
     <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
     <Relationship Id=\"rId1\" \
     Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" \
     Target=\"word/document.xml\"/>\
     </Relationships>"
        .to_string()
}

fn styles_xml() -> String {
    let heading = |id: u8, size: u32| {
        format!(
            "<w:style w:type=\"paragraph\" w:styleId=\"Heading{id}\">\
             <w:name w:val=\"heading {id}\"/><w:basedOn w:val=\"Normal\"/>\
             <w:pPr><w:spacing w:before=\"240\" w:after=\"120\"/>\
             <w:outlineLvl w:val=\"{}\"/></w:pPr>\
             <w:rPr><w:b/><w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/></w:rPr>\
             </w:style>",
            id - 1
        )
    };

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:styles xmlns:w=\"{NS_W}\">\
         <w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val=\"22\"/><w:szCs w:val=\"22\"/></w:rPr>\
         </w:rPrDefault><w:pPrDefault/></w:docDefaults>\
         <w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\">\
         <w:name w:val=\"Normal\"/></w:style>\
         {}{}{}\
         <w:style w:type=\"character\" w:styleId=\"Hyperlink\">\
         <w:name w:val=\"Hyperlink\"/>\
         <w:rPr><w:color w:val=\"0563C1\"/><w:u w:val=\"single\"/></w:rPr>\
         </w:style>\
         </w:styles>",
        heading(1, 32),
        heading(2, 28),
        heading(3, 24)
    )
}

fn numbering_xml() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:numbering xmlns:w=\"{NS_W}\">\
         <w:abstractNum w:abstractNumId=\"0\">\
         <w:lvl w:ilvl=\"0\"><w:start w:val=\"1\"/><w:numFmt w:val=\"bullet\"/>\
         <w:lvlText w:val=\"•\"/><w:lvlJc w:val=\"left\"/>\
         <w:pPr><w:ind w:left=\"720\" w:hanging=\"360\"/></w:pPr></w:lvl>\
         </w:abstractNum>\
         <w:num w:numId=\"1\"><w:abstractNumId w:val=\"0\"/></w:num>\
         </w:numbering>"
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::{Section, SectionKind};

    fn tiny_doc() -> GeneratedDocument {
        GeneratedDocument {
            sections: vec![Section {
                kind: SectionKind::Introduction,
                blocks: vec![
                    Block::Heading {
                        level: 1,
                        text: "1. Introduction".to_string(),
                    },
                    Block::Paragraph(Paragraph::text("Costs < budget & time > zero")),
                ],
            }],
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_xml("<a href=\"x\">&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&apos;&lt;/a&gt;"
        );
    }

    #[test]
    fn produces_a_zip_container() {
        let bytes = to_docx_bytes(&tiny_doc()).expect("serialization failed");
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn document_part_contains_escaped_text() {
        let body = {
            let mut w = BodyWriter::new();
            for block in &tiny_doc().sections[0].blocks {
                w.write_block(block);
            }
            w.document_xml()
        };
        assert!(body.contains("Heading1"));
        assert!(body.contains("Costs &lt; budget &amp; time &gt; zero"));
    }

    #[test]
    fn image_blocks_allocate_media_and_rels() {
        let mut w = BodyWriter::new();
        w.write_block(&Block::Image {
            image: EmbeddedImage {
                format: crate::report::document::ImageFormat::Png,
                data: vec![1, 2, 3],
            },
            caption: "Fig 1: Use Case Diagram".to_string(),
        });
        assert_eq!(w.media.len(), 1);
        assert_eq!(w.media[0].name, "media/image1.png");
        assert!(w.document_rels_xml().contains("media/image1.png"));
        assert!(w.xml.contains("r:embed=\"rId3\""));
    }
}
