//! The two output formatters (spec.md §6): a grouped human-readable
//! listing and a structured JSON report. Both are pure functions over the
//! leak list -- no I/O, no shared state, and neither affects the other's
//! output.

pub mod human;
pub mod json;
