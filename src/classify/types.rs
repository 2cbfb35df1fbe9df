//! Normalized grade records shared by the parser, classifier and formatter.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::iter::Sum;
use std::ops::Add;

use crate::classify::grade::{GradeToken, Tier};
use crate::parser::overview::{MissingWork, PortalStatus};

/// How an assignment row was flagged by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AssignmentStatus {
    #[default]
    Normal,
    Missing,
    Excused,
    HandedIn,
    Late,
}

impl AssignmentStatus {
    /// Maps the `title` of a status icon in the grade cell.
    pub fn from_icon_title(title: &str) -> Option<Self> {
        match title.trim().to_ascii_lowercase().as_str() {
            "missing" => Some(AssignmentStatus::Missing),
            "excused" => Some(AssignmentStatus::Excused),
            "handed in" | "handedin" | "turned in" => Some(AssignmentStatus::HandedIn),
            "late" => Some(AssignmentStatus::Late),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssignmentStatus::Normal => "",
            AssignmentStatus::Missing => "Missing",
            AssignmentStatus::Excused => "Excused",
            AssignmentStatus::HandedIn => "Handed In",
            AssignmentStatus::Late => "Late",
        }
    }
}

/// One row of a class's assignment table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub name: String,
    pub due_date: Option<String>,
    pub class_name: String,
    /// Standard the row was listed under.
    pub skill_area: String,
    pub score: Option<GradeToken>,
    pub numeric: Option<f64>,
    /// Grade cell as shown on the page (score text or icon title).
    pub raw_grade: String,
    pub weight: Option<String>,
    pub feedback: Option<String>,
    pub status: AssignmentStatus,
}

impl Assignment {
    pub fn tier(&self) -> Option<Tier> {
        self.score.map(GradeToken::tier)
    }

    pub fn is_missing(&self) -> bool {
        self.status == AssignmentStatus::Missing
    }
}

/// Score for one standard (skill area) in a class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardScore {
    pub skill_area: String,
    pub score_token: Option<GradeToken>,
    pub raw_value: String,
    pub numeric: Option<f64>,
    /// 0 for root standards, +1 per nesting level.
    pub depth: usize,
}

impl StandardScore {
    pub fn tier(&self) -> Option<Tier> {
        self.score_token.map(GradeToken::tier)
    }
}

/// Per-class (and, summed, per-report) tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClassCounts {
    /// Assignments flagged missing.
    pub missing: usize,
    /// Scored items (assignments and standards) below Meeting.
    pub below_meeting: usize,
    /// Scored items in the Critical tier. Always `<= below_meeting`.
    pub critical: usize,
    /// Scored items at Meeting.
    pub meeting: usize,
}

impl Add for ClassCounts {
    type Output = ClassCounts;

    fn add(self, rhs: ClassCounts) -> ClassCounts {
        ClassCounts {
            missing: self.missing + rhs.missing,
            below_meeting: self.below_meeting + rhs.below_meeting,
            critical: self.critical + rhs.critical,
            meeting: self.meeting + rhs.meeting,
        }
    }
}

impl<'a> Sum<&'a ClassCounts> for ClassCounts {
    fn sum<I: Iterator<Item = &'a ClassCounts>>(iter: I) -> Self {
        iter.fold(ClassCounts::default(), |acc, c| acc + *c)
    }
}

/// Classified view of one class. Built by `ClassSummary::classify`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub(crate) class_name: String,
    pub(crate) instructor: String,
    pub(crate) portal_status: PortalStatus,
    pub(crate) overall_status: Tier,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) standards: Vec<StandardScore>,
    pub(crate) counts: ClassCounts,
}

impl ClassSummary {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn instructor(&self) -> &str {
        &self.instructor
    }

    pub fn portal_status(&self) -> PortalStatus {
        self.portal_status
    }

    pub fn overall_status(&self) -> Tier {
        self.overall_status
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn standards(&self) -> &[StandardScore] {
        &self.standards
    }

    pub fn counts(&self) -> ClassCounts {
        self.counts
    }
}

/// Everything a single run produces. Built once by `Report::new`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub(crate) student_name: String,
    pub(crate) generation_date: DateTime<Local>,
    pub(crate) classes: Vec<ClassSummary>,
    pub(crate) missing_work: Vec<MissingWork>,
    pub(crate) totals: ClassCounts,
}

impl Report {
    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    pub fn generation_date(&self) -> DateTime<Local> {
        self.generation_date
    }

    /// Classes ordered Critical, Attention, Meeting; portal order within a tier.
    pub fn classes(&self) -> &[ClassSummary] {
        &self.classes
    }

    /// Missing-work entries listed on the grades overview page.
    pub fn missing_work(&self) -> &[MissingWork] {
        &self.missing_work
    }

    pub fn totals(&self) -> ClassCounts {
        self.totals
    }

    pub fn classes_in(&self, tier: Tier) -> impl Iterator<Item = &ClassSummary> {
        self.classes
            .iter()
            .filter(move |c| c.overall_status == tier)
    }
}
