use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Estimate;

/// A member of the project team as entered in the wizard.
///
/// All fields are free text; blank fields are omitted from the roster
/// rendering. A member with neither a name nor a class roll number is
/// excluded from the roster entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roll_no: String,
    #[serde(default)]
    pub univ_roll_no: String,
}

impl TeamMember {
    /// Whether the member appears in the report roster.
    pub fn listed(&self) -> bool {
        !self.name.is_empty() || !self.roll_no.is_empty()
    }

    /// Roster line: non-blank fields joined with " — ".
    pub fn display_line(&self) -> String {
        let parts: Vec<&str> = [
            self.name.as_str(),
            self.roll_no.as_str(),
            self.univ_roll_no.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();

        if parts.is_empty() {
            "Team Member".to_string()
        } else {
            parts.join(" — ")
        }
    }
}

/// Technology choices for the project, all optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechStack {
    pub frontend: Option<String>,
    pub backend: Option<String>,
    pub database: Option<String>,
}

/// Uploaded diagram payloads, one optional slot per diagram kind.
///
/// Each payload is a base64 data URL in a common raster encoding
/// (PNG, JPEG, GIF, BMP). Slots are rendered in this fixed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSet {
    pub use_case: Option<String>,
    pub dfd0: Option<String>,
    pub dfd1: Option<String>,
    pub class_diagram: Option<String>,
}

/// Identifies one of the four diagram slots of a lab report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    UseCase,
    DfdLevel0,
    DfdLevel1,
    ClassDiagram,
}

impl DiagramKind {
    /// All slots in report order.
    pub const ALL: [DiagramKind; 4] = [
        Self::UseCase,
        Self::DfdLevel0,
        Self::DfdLevel1,
        Self::ClassDiagram,
    ];

    /// Figure caption used in the diagrams section.
    pub fn caption(&self) -> &'static str {
        match self {
            Self::UseCase => "Fig 1: Use Case Diagram",
            Self::DfdLevel0 => "Fig 2: DFD Level 0",
            Self::DfdLevel1 => "Fig 3: DFD Level 1",
            Self::ClassDiagram => "Fig 4: Class Diagram",
        }
    }
}

impl DiagramSet {
    /// The payload for a slot, `None` when absent or blank.
    pub fn payload(&self, kind: DiagramKind) -> Option<&str> {
        let slot = match kind {
            DiagramKind::UseCase => &self.use_case,
            DiagramKind::DfdLevel0 => &self.dfd0,
            DiagramKind::DfdLevel1 => &self.dfd1,
            DiagramKind::ClassDiagram => &self.class_diagram,
        };
        slot.as_deref().filter(|s| !s.is_empty())
    }
}

/// Everything a user enters in the report wizard.
///
/// All fields are optional; the assembler substitutes display fallbacks
/// for whatever is missing. The `cocomo` record is derived data: only its
/// `kloc` is read from input, the rest is recomputed (see [`Estimate`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectForm {
    pub title: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub tech_stack: TechStack,
    pub cocomo: Option<Estimate>,
    #[serde(default)]
    pub diagrams: DiagramSet,
    pub features: Option<String>,
}

impl ProjectForm {
    /// The size estimate the user asked for, clamped to the estimator's
    /// contract: missing input is 0, negative input is 0.
    pub fn requested_kloc(&self) -> f64 {
        self.cocomo.map(|c| c.kloc).unwrap_or(0.0).max(0.0)
    }
}

/// A stored project form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    #[serde(flatten)]
    pub form: ProjectForm,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for updating a stored project. All fields are optional for
/// partial updates; a new `kloc` triggers estimate recomputation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    pub title: Option<String>,
    pub domain: Option<String>,
    pub team_members: Option<Vec<TeamMember>>,
    pub tech_stack: Option<TechStack>,
    pub kloc: Option<f64>,
    pub diagrams: Option<DiagramSet>,
    pub features: Option<String>,
}

/// Compact listing row, used for dashboard responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: Option<String>,
    pub domain: Option<String>,
    pub kloc: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectSummary {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            title: p.form.title,
            domain: p.form.domain,
            kloc: p.form.cocomo.map(|c| c.kloc).unwrap_or(0.0),
            updated_at: p.updated_at,
        }
    }
}
