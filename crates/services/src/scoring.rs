//! # Gravity Scoring
//!
//! The time-decayed ranking score: `votes / (age_hours + 2)^gravity`.
//! Pure and deterministic; the storage layer only ever supplies raw
//! `(vote_count, created_at)` pairs, never a precomputed score.

use chrono::{DateTime, Utc};

/// Ranking score for one entry.
///
/// The `+2` offset keeps the denominator finite and non-zero at age 0, so
/// a brand-new entry caps at `votes / 2^gravity` instead of blowing up.
/// Negative ages (clock skew, future timestamps) are treated as age 0,
/// and a negative vote count scores like zero votes.
pub fn gravity_score(vote_count: i64, age_hours: f64, gravity: f64) -> f64 {
    let votes = vote_count.max(0) as f64;
    let age = age_hours.max(0.0);
    votes / (age + 2.0).powf(gravity)
}

/// Hours elapsed between `created_at` and `now`, clamped non-negative.
pub fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed_ms = now.signed_duration_since(created_at).num_milliseconds();
    (elapsed_ms as f64 / 3_600_000.0).max(0.0)
}
