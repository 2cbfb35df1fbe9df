//! Grade classification.
//!
//! Maps portal score tokens onto the fixed standards-based scale, tallies
//! them per class and rolls the tallies up into a [`Report`].

pub mod aggregate;
pub mod grade;
pub mod types;
pub mod utility;

pub use grade::{GradeToken, Tier};
pub use types::{Assignment, AssignmentStatus, ClassCounts, ClassSummary, Report, StandardScore};
