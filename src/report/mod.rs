//! Lab report assembly.
//!
//! [`assemble`] transforms a [`ProjectForm`] into a [`GeneratedDocument`]
//! in one synchronous pass: cover page, table of contents, introduction,
//! feasibility study, COCOMO costing, requirements, diagrams, conclusion.
//! Missing fields resolve to display fallbacks and missing diagrams to
//! explicit placeholders; per-field issues are never fatal. The only
//! fatal errors live in the serialization step ([`to_docx_bytes`]).

mod document;
mod docx;

pub use document::*;
pub use docx::{to_docx_bytes, DocxError};

use crate::models::{DiagramKind, Estimate, ProjectForm};

/// Build the complete report for a form.
///
/// `demo_url` is the live-prototype link rendered in the introduction;
/// the caller derives it from the stored project id (or "local" for
/// unsaved forms).
pub fn assemble(form: &ProjectForm, demo_url: &str) -> GeneratedDocument {
    let sections = vec![
        cover(form),
        table_of_contents(),
        introduction(form, demo_url),
        feasibility(form),
        costing(form),
        requirements(),
        diagrams(form),
        conclusion(form),
    ];

    GeneratedDocument { sections }
}

/// Attachment filename for a report download: the title with every
/// non-alphanumeric character (other than `-` and `_`) replaced by `_`.
pub fn suggested_filename(title: Option<&str>) -> String {
    let stem = match title {
        Some(t) if !t.is_empty() => t,
        _ => "LabReport",
    };
    let safe: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}_Report.docx")
}

fn title_display(form: &ProjectForm, fallback: &str) -> String {
    match form.title.as_deref() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => fallback.to_string(),
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "—".to_string(),
    }
}

fn cover(form: &ProjectForm) -> Section {
    let mut blocks = vec![
        Block::Paragraph(Paragraph::empty().spaced_before(2400)),
        Block::Paragraph(
            Paragraph::runs(vec![TextRun::bold("[University Name]").sized(28)]).centered(),
        ),
        Block::Paragraph(Paragraph::empty().spaced_before(400)),
        Block::Paragraph(
            Paragraph::runs(vec![TextRun::plain("Software Engineering Lab").sized(24)]).centered(),
        ),
        Block::Paragraph(Paragraph::empty().spaced_before(1200)),
        Block::Paragraph(
            Paragraph::runs(vec![
                TextRun::bold(title_display(form, "Project Title")).sized(36)
            ])
            .centered(),
        ),
        Block::Paragraph(Paragraph::empty().spaced_before(800)),
        Block::Paragraph(Paragraph::runs(vec![TextRun::bold("Submitted By:").sized(22)]).centered()),
        Block::Paragraph(Paragraph::empty().spaced_before(200)),
    ];

    for member in form.team_members.iter().filter(|m| m.listed()) {
        blocks.push(Block::Paragraph(
            Paragraph::runs(vec![TextRun::plain(member.display_line()).sized(20)]).centered(),
        ));
    }

    blocks.push(Block::Paragraph(Paragraph::empty()));
    blocks.push(Block::PageBreak);

    Section {
        kind: SectionKind::Cover,
        blocks,
    }
}

fn table_of_contents() -> Section {
    Section {
        kind: SectionKind::TableOfContents,
        blocks: vec![
            Block::Heading {
                level: 1,
                text: "Index".to_string(),
            },
            Block::TocField,
            Block::Paragraph(Paragraph::empty()),
            Block::PageBreak,
        ],
    }
}

fn introduction(form: &ProjectForm, demo_url: &str) -> Section {
    let title = title_display(form, "the project");
    let domain = match form.domain.as_deref() {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => "software".to_string(),
    };
    let features = match form.features.as_deref() {
        Some(f) if !f.is_empty() => f.to_string(),
        _ => "as specified in the project scope".to_string(),
    };

    Section {
        kind: SectionKind::Introduction,
        blocks: vec![
            Block::Heading {
                level: 1,
                text: "1. Introduction".to_string(),
            },
            Block::Paragraph(Paragraph::text(format!(
                "This document describes the software requirements and feasibility study \
                 for \"{title}\", a {domain} project. The system aims to deliver the \
                 following capabilities: {features}."
            ))),
            Block::Paragraph(Paragraph::empty()),
            Block::Paragraph(Paragraph::runs(vec![TextRun::bold("Live Prototype Link: ")])),
            Block::Hyperlink {
                url: demo_url.to_string(),
            },
            Block::Paragraph(Paragraph::empty()),
            Block::PageBreak,
        ],
    }
}

fn feasibility(form: &ProjectForm) -> Section {
    let stack = &form.tech_stack;
    Section {
        kind: SectionKind::Feasibility,
        blocks: vec![
            Block::Heading {
                level: 1,
                text: "2. Feasibility Study".to_string(),
            },
            Block::Heading {
                level: 2,
                text: "2.1 Technical Feasibility".to_string(),
            },
            Block::Table(Table {
                rows: vec![
                    TableRow::header(&["Aspect", "Choice"]),
                    TableRow::plain(&["Frontend", &or_dash(stack.frontend.as_deref())]),
                    TableRow::plain(&["Backend", &or_dash(stack.backend.as_deref())]),
                    TableRow::plain(&["Database", &or_dash(stack.database.as_deref())]),
                ],
            }),
            Block::Paragraph(Paragraph::empty()),
            Block::Heading {
                level: 2,
                text: "2.2 Economic Feasibility".to_string(),
            },
            Block::Paragraph(Paragraph::text(
                "The project is economically feasible within the estimated budget as \
                 derived from the COCOMO model (see Section 3).",
            )),
            Block::Paragraph(Paragraph::empty()),
            Block::PageBreak,
        ],
    }
}

fn costing(form: &ProjectForm) -> Section {
    let estimate = form.cocomo.unwrap_or_else(Estimate::zero);
    Section {
        kind: SectionKind::Costing,
        blocks: vec![
            Block::Heading {
                level: 1,
                text: "3. COCOMO Costing".to_string(),
            },
            Block::Paragraph(Paragraph::text(
                "Effort (Person-Months) = 2.4 × (KLOC)^1.05. Time and cost are derived \
                 from the standard COCOMO organic model.",
            )),
            Block::Paragraph(Paragraph::empty()),
            Block::Table(Table {
                rows: vec![
                    TableRow::header(&["Metric", "Value"]),
                    TableRow::plain(&["Estimated KLOC", &format!("{:.2}", estimate.kloc)]),
                    TableRow::plain(&[
                        "Effort (Person-Months)",
                        &format!("{:.2}", estimate.effort),
                    ]),
                    TableRow::plain(&[
                        "Development Time (Months)",
                        &format!("{:.2}", estimate.time),
                    ]),
                    TableRow::plain(&["Estimated Cost ($)", &format!("{:.2}", estimate.cost)]),
                ],
            }),
            Block::Paragraph(Paragraph::empty()),
            Block::PageBreak,
        ],
    }
}

fn requirements() -> Section {
    Section {
        kind: SectionKind::Requirements,
        blocks: vec![
            Block::Heading {
                level: 1,
                text: "4. Requirements".to_string(),
            },
            Block::Heading {
                level: 2,
                text: "4.1 Functional Requirements".to_string(),
            },
            Block::Bullet(
                "The system shall implement the features as described in the introduction \
                 and prototype."
                    .to_string(),
            ),
            Block::Bullet("User authentication and authorization where applicable.".to_string()),
            Block::Bullet(
                "Data persistence and retrieval using the chosen database.".to_string(),
            ),
            Block::Paragraph(Paragraph::empty()),
            Block::Heading {
                level: 2,
                text: "4.2 Non-Functional Requirements".to_string(),
            },
            Block::Heading {
                level: 3,
                text: "Security:".to_string(),
            },
            Block::Bullet("Sensitive data shall be protected and access controlled.".to_string()),
            Block::Heading {
                level: 3,
                text: "Performance:".to_string(),
            },
            Block::Bullet(
                "The system shall respond within acceptable limits under normal load."
                    .to_string(),
            ),
            Block::Paragraph(Paragraph::empty()),
            Block::PageBreak,
        ],
    }
}

/// Every diagram slot appears exactly once: embedded when the payload
/// decodes, otherwise as an explicit placeholder.
fn diagrams(form: &ProjectForm) -> Section {
    let mut blocks = vec![Block::Heading {
        level: 1,
        text: "5. Diagrams".to_string(),
    }];

    for kind in DiagramKind::ALL {
        let caption = kind.caption();
        match form.diagrams.payload(kind) {
            Some(payload) => match decode_data_url(payload) {
                Some(image) => blocks.push(Block::Image {
                    image,
                    caption: caption.to_string(),
                }),
                None => blocks.push(Block::Placeholder(format!(
                    "{caption} — [Image not embedded]"
                ))),
            },
            None => blocks.push(Block::Placeholder(format!("{caption} — [Not uploaded]"))),
        }
        blocks.push(Block::Paragraph(Paragraph::empty()));
    }

    blocks.push(Block::PageBreak);

    Section {
        kind: SectionKind::Diagrams,
        blocks,
    }
}

fn conclusion(form: &ProjectForm) -> Section {
    let title = title_display(form, "the project");
    let stack = &form.tech_stack;
    let parts: Vec<&str> = [
        stack.frontend.as_deref(),
        stack.backend.as_deref(),
        stack.database.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .collect();
    let stack_label = if parts.is_empty() {
        "N/A".to_string()
    } else {
        parts.join(", ")
    };

    Section {
        kind: SectionKind::Conclusion,
        blocks: vec![
            Block::Heading {
                level: 1,
                text: "6. Conclusion".to_string(),
            },
            Block::Paragraph(Paragraph::text(format!(
                "This report summarized the feasibility, cost estimation, and requirements \
                 for \"{title}\". The live prototype is available at the link provided in \
                 the Introduction. The chosen tech stack ({stack_label}) supports the \
                 project goals."
            ))),
        ],
    }
}
