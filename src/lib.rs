//! DocuVerse backend: lab report and SRS document generation for student
//! projects.
//!
//! The service persists project forms (title, team roster, tech stack,
//! size estimate, diagram uploads, feature list), computes COCOMO
//! organic-model cost estimates, and assembles downloadable DOCX lab
//! reports from them.
//!
//! - [`estimator`]: pure COCOMO effort/time/cost computation.
//! - [`report`]: document assembly and DOCX serialization.
//! - [`db`]: SQLite persistence for project forms.
//! - [`api`]: axum HTTP surface.

pub mod api;
pub mod db;
pub mod estimator;
pub mod models;
pub mod report;
