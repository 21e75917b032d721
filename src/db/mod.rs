mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::estimator;
use crate::models::*;

/// SQLite-backed store for project forms.
///
/// Saving a form recomputes its estimate from the submitted kloc;
/// client-supplied figures are never stored (the estimate is a pure
/// function of kloc).
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "docuverse")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("docuverse.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_all_projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, title, domain, team_members, tech_stack, kloc, effort, time_months,
                    cost, diagrams, features, created_at, updated_at
             FROM projects ORDER BY updated_at DESC",
        )?;

        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, title, domain, team_members, tech_stack, kloc, effort, time_months,
                    cost, diagrams, features, created_at, updated_at
             FROM projects WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_project(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_project(&self, mut form: ProjectForm) -> Result<Project> {
        let estimate = estimator::estimate(form.requested_kloc());
        form.cocomo = Some(estimate);

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO projects (id, title, domain, team_members, tech_stack, kloc, effort,
                                   time_months, cost, diagrams, features, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &form.title,
                &form.domain,
                serde_json::to_string(&form.team_members)?,
                serde_json::to_string(&form.tech_stack)?,
                estimate.kloc,
                estimate.effort,
                estimate.time,
                estimate.cost,
                serde_json::to_string(&form.diagrams)?,
                &form.features,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Project {
            id,
            form,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_project(&self, id: Uuid, input: UpdateProjectInput) -> Result<Option<Project>> {
        let Some(existing) = self.get_project(id)? else {
            return Ok(None);
        };

        let mut form = existing.form;
        form.title = input.title.or(form.title);
        form.domain = input.domain.or(form.domain);
        form.features = input.features.or(form.features);
        if let Some(members) = input.team_members {
            form.team_members = members;
        }
        if let Some(stack) = input.tech_stack {
            form.tech_stack = stack;
        }
        if let Some(diagrams) = input.diagrams {
            form.diagrams = diagrams;
        }
        // A new kloc invalidates the stored estimate; derive the rest.
        if let Some(kloc) = input.kloc {
            form.cocomo = Some(estimator::estimate(kloc.max(0.0)));
        }
        let estimate = form.cocomo.unwrap_or_else(Estimate::zero);

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "UPDATE projects SET title = ?, domain = ?, team_members = ?, tech_stack = ?,
                                 kloc = ?, effort = ?, time_months = ?, cost = ?, diagrams = ?,
                                 features = ?, updated_at = ?
             WHERE id = ?",
            (
                &form.title,
                &form.domain,
                serde_json::to_string(&form.team_members)?,
                serde_json::to_string(&form.tech_stack)?,
                estimate.kloc,
                estimate.effort,
                estimate.time,
                estimate.cost,
                serde_json::to_string(&form.diagrams)?,
                &form.features,
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(Project {
            id,
            form,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_project(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    let team_json: String = row.get(3)?;
    let stack_json: String = row.get(4)?;
    let diagrams_json: String = row.get(9)?;

    Ok(Project {
        id: parse_uuid(row.get::<_, String>(0)?),
        form: ProjectForm {
            title: row.get(1)?,
            domain: row.get(2)?,
            team_members: serde_json::from_str(&team_json).unwrap_or_default(),
            tech_stack: serde_json::from_str(&stack_json).unwrap_or_default(),
            cocomo: Some(Estimate {
                kloc: row.get(5)?,
                effort: row.get(6)?,
                time: row.get(7)?,
                cost: row.get(8)?,
            }),
            diagrams: serde_json::from_str(&diagrams_json).unwrap_or_default(),
            features: row.get(10)?,
        },
        created_at: parse_datetime(row.get::<_, String>(11)?),
        updated_at: parse_datetime(row.get::<_, String>(12)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
