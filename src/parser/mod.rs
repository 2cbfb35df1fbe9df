//! HTML parsers for the portal pages.
//!
//! Everything here is pure: the same markup always produces the same records.

pub mod details;
pub mod overview;
pub mod text;

pub use details::{ClassDetails, StandardNode, has_standards, parse_class_details};
pub use overview::{
    ClassOverview, GradesOverview, MissingWork, PortalStatus, has_class_payload,
    parse_grades_overview,
};
