//! Domain models for DocuVerse.
//!
//! # Core Concepts
//!
//! - [`ProjectForm`]: everything a user enters in the report wizard:
//!   identity, team roster, tech stack, size estimate, diagram uploads,
//!   and the free-text feature list. All fields are optional; display
//!   fallbacks are applied at assembly time.
//! - [`Estimate`]: COCOMO (organic mode) effort/time/cost figures. This
//!   is derived data, a pure function of `kloc`, recomputed on every
//!   save rather than trusted from the client.
//! - [`Project`]: a stored form with identity and timestamps.
//!
//! Wire names follow the original wizard's JSON (camelCase).

mod estimate;
mod project;

pub use estimate::*;
pub use project::*;
