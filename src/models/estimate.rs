use serde::{Deserialize, Serialize};

/// A COCOMO cost estimate derived from a project's size.
///
/// Every field is a pure function of `kloc` and the organic-model
/// constants; the store and the report handlers recompute the record
/// whenever a form is saved, so client-supplied figures are never kept.
/// All fields are rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Estimated size in thousand lines of code.
    pub kloc: f64,
    /// Effort in person-months.
    pub effort: f64,
    /// Development time in months.
    pub time: f64,
    /// Cost in currency units.
    pub cost: f64,
}

impl Estimate {
    pub fn zero() -> Self {
        Self {
            kloc: 0.0,
            effort: 0.0,
            time: 0.0,
            cost: 0.0,
        }
    }
}
