//! COCOMO cost estimation (organic mode).
//!
//! Maps a single size input (estimated thousand lines of code) to
//! effort, development time, and cost using the fixed organic-model
//! constants. Pure and deterministic: the same `kloc` always produces a
//! bit-identical [`Estimate`], so it is safe to call repeatedly and
//! concurrently.

use crate::models::Estimate;

/// Effort coefficient `a` in `effort = a * kloc^b`.
const EFFORT_COEFF: f64 = 2.4;
/// Effort exponent `b`.
const EFFORT_EXP: f64 = 1.05;
/// Schedule coefficient `c` in `time = c * effort^d`.
const TIME_COEFF: f64 = 2.5;
/// Schedule exponent `d`.
const TIME_EXP: f64 = 0.38;
/// Currency units per person-month.
const COST_PER_PERSON_MONTH: f64 = 5000.0;

/// Compute the organic-mode estimate for a project of `kloc` thousand
/// lines of code.
///
/// The caller must supply `kloc >= 0`; the API boundary clamps negative
/// and missing input to 0. Derived figures are computed from the
/// unrounded effort, then every field is rounded to 2 decimal places.
pub fn estimate(kloc: f64) -> Estimate {
    let effort = EFFORT_COEFF * kloc.powf(EFFORT_EXP);
    let time = TIME_COEFF * effort.powf(TIME_EXP);
    let cost = effort * COST_PER_PERSON_MONTH;

    Estimate {
        kloc: round2(kloc),
        effort: round2(effort),
        time: round2(time),
        cost: round2(cost),
    }
}

/// Round half away from zero to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
