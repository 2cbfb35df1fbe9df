use chrono::{DateTime, Local};
use tracing::debug;

use crate::classify::grade::Tier;
use crate::classify::types::{Assignment, ClassCounts, ClassSummary, Report, StandardScore};
use crate::classify::utility::mean;
use crate::parser::{ClassDetails, ClassOverview, MissingWork};

/// Tallies scored items and missing work.
///
/// Unscored items (no recognised token) only count when flagged missing.
pub fn count_items(assignments: &[Assignment], standards: &[StandardScore]) -> ClassCounts {
    let mut counts = ClassCounts::default();

    let tiers = assignments
        .iter()
        .filter_map(Assignment::tier)
        .chain(standards.iter().filter_map(StandardScore::tier));
    for tier in tiers {
        match tier {
            Tier::Meeting => counts.meeting += 1,
            Tier::Attention => counts.below_meeting += 1,
            Tier::Critical => {
                counts.below_meeting += 1;
                counts.critical += 1;
            }
        }
    }
    counts.missing = assignments.iter().filter(|a| a.is_missing()).count();

    counts
}

/// Class tier from its tallies.
///
/// Any Critical item makes the class Critical. Otherwise any item below
/// Meeting, or any missing assignment, makes it Attention.
pub fn tier_for(counts: &ClassCounts) -> Tier {
    if counts.critical > 0 {
        Tier::Critical
    } else if counts.below_meeting > 0 || counts.missing > 0 {
        Tier::Attention
    } else {
        Tier::Meeting
    }
}

impl ClassSummary {
    /// Flattens a class's standards tree (pre-order) and classifies it.
    ///
    /// `details` is `None` for classes the portal has not assessed yet.
    pub fn classify(overview: &ClassOverview, details: Option<&ClassDetails>) -> Self {
        let mut assignments = Vec::new();
        let mut standards = Vec::new();
        if let Some(details) = details {
            for node in details.standards.iter().flat_map(|s| s.walk()) {
                standards.push(node.score.clone());
                assignments.extend(node.assignments.iter().cloned());
            }
        }

        let counts = count_items(&assignments, &standards);
        let overall_status = tier_for(&counts);
        debug!(
            class = %overview.name,
            tier = %overall_status,
            missing = counts.missing,
            below_meeting = counts.below_meeting,
            critical = counts.critical,
            "Classified class"
        );

        ClassSummary {
            class_name: overview.name.clone(),
            instructor: overview.instructor.clone(),
            portal_status: overview.status,
            overall_status,
            assignments,
            standards,
            counts,
        }
    }

    /// Mean grade weight over every scored item, `None` when nothing is scored.
    pub fn mean_weight(&self) -> Option<f64> {
        let weights: Vec<f64> = self
            .assignments
            .iter()
            .filter_map(|a| a.score)
            .chain(self.standards.iter().filter_map(|s| s.score_token))
            .map(|t| t.weight())
            .collect();
        if weights.is_empty() {
            None
        } else {
            Some(mean(&weights))
        }
    }
}

impl Report {
    /// Orders classes worst tier first (stable within a tier) and sums the
    /// per-class counts.
    pub fn new(
        student_name: impl Into<String>,
        generation_date: DateTime<Local>,
        mut classes: Vec<ClassSummary>,
        missing_work: Vec<MissingWork>,
    ) -> Self {
        classes.sort_by(|a, b| b.overall_status.cmp(&a.overall_status));
        let totals: ClassCounts = classes.iter().map(|c| &c.counts).sum();

        Report {
            student_name: student_name.into(),
            generation_date,
            classes,
            missing_work,
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::grade::GradeToken;
    use crate::classify::types::AssignmentStatus;
    use crate::parser::{PortalStatus, StandardNode};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn overview(name: &str) -> ClassOverview {
        ClassOverview {
            name: name.into(),
            instructor: "Teacher".into(),
            status: PortalStatus::NeedsAttention,
            class_id: Some("1".into()),
            cgp_id: Some("2".into()),
            targets_meeting: 0,
            targets_not_meeting: 0,
            total_targets: 0,
        }
    }

    fn assignment(score: Option<GradeToken>, status: AssignmentStatus) -> Assignment {
        Assignment {
            name: "Quiz".into(),
            due_date: None,
            class_name: "Science 7".into(),
            skill_area: "Inquiry".into(),
            score,
            numeric: score.map(|t| t.weight()),
            raw_grade: String::new(),
            weight: None,
            feedback: None,
            status,
        }
    }

    fn standard(token: Option<GradeToken>, depth: usize) -> StandardScore {
        StandardScore {
            skill_area: "Inquiry".into(),
            score_token: token,
            raw_value: token.map(|t| t.to_string()).unwrap_or_default(),
            numeric: None,
            depth,
        }
    }

    fn details(root: Option<GradeToken>, assignments: Vec<Assignment>) -> ClassDetails {
        ClassDetails {
            class_name: "Science 7".into(),
            standards: vec![StandardNode {
                score: standard(root, 0),
                children: vec![StandardNode {
                    score: standard(Some(GradeToken::M), 1),
                    children: vec![],
                    assignments,
                }],
                assignments: vec![],
            }],
        }
    }

    #[test]
    fn test_all_meeting_class_is_meeting() {
        let d = details(
            Some(GradeToken::M),
            vec![
                assignment(Some(GradeToken::M), AssignmentStatus::Normal),
                assignment(None, AssignmentStatus::Excused),
            ],
        );
        let summary = ClassSummary::classify(&overview("Science 7"), Some(&d));
        assert_eq!(summary.overall_status(), Tier::Meeting);
        assert_eq!(summary.counts().meeting, 3);
    }

    #[test]
    fn test_one_critical_item_forces_critical() {
        for token in [GradeToken::B, GradeToken::NY] {
            let d = details(
                Some(GradeToken::M),
                vec![
                    assignment(Some(GradeToken::M), AssignmentStatus::Normal),
                    assignment(Some(GradeToken::M), AssignmentStatus::Normal),
                    assignment(Some(token), AssignmentStatus::Normal),
                ],
            );
            let summary = ClassSummary::classify(&overview("Science 7"), Some(&d));
            assert_eq!(summary.overall_status(), Tier::Critical);
            assert_eq!(summary.counts().critical, 1);
        }
    }

    #[test]
    fn test_progressing_item_is_attention() {
        let d = details(
            Some(GradeToken::P),
            vec![assignment(Some(GradeToken::M), AssignmentStatus::Normal)],
        );
        let summary = ClassSummary::classify(&overview("Science 7"), Some(&d));
        assert_eq!(summary.overall_status(), Tier::Attention);
    }

    #[test]
    fn test_missing_work_alone_is_attention() {
        let d = details(
            Some(GradeToken::M),
            vec![assignment(None, AssignmentStatus::Missing)],
        );
        let summary = ClassSummary::classify(&overview("Science 7"), Some(&d));
        assert_eq!(summary.overall_status(), Tier::Attention);
        assert_eq!(summary.counts().missing, 1);
        assert_eq!(summary.counts().below_meeting, 0);
    }

    #[test]
    fn test_counts_equal_sum_over_items() {
        let assignments = vec![
            assignment(Some(GradeToken::M), AssignmentStatus::Normal),
            assignment(Some(GradeToken::P), AssignmentStatus::Late),
            assignment(Some(GradeToken::B), AssignmentStatus::Normal),
            assignment(None, AssignmentStatus::Missing),
            assignment(None, AssignmentStatus::Missing),
        ];
        let d = details(Some(GradeToken::NY), assignments);
        let summary = ClassSummary::classify(&overview("Science 7"), Some(&d));

        let items: Vec<Tier> = summary
            .assignments()
            .iter()
            .filter_map(Assignment::tier)
            .chain(summary.standards().iter().filter_map(StandardScore::tier))
            .collect();
        let counts = summary.counts();
        assert_eq!(counts.meeting, items.iter().filter(|t| **t == Tier::Meeting).count());
        assert_eq!(counts.critical, items.iter().filter(|t| **t == Tier::Critical).count());
        assert_eq!(counts.below_meeting, items.iter().filter(|t| **t != Tier::Meeting).count());
        assert_eq!(counts.missing, 2);
        assert_eq!(summary.assignments().len(), 5);
        assert_eq!(summary.standards().len(), 2);
    }

    #[test]
    fn test_unassessed_class_has_no_items() {
        let mut o = overview("Band");
        o.status = PortalStatus::NotAssessed;
        let summary = ClassSummary::classify(&o, None);
        assert_eq!(summary.overall_status(), Tier::Meeting);
        assert_eq!(summary.counts(), ClassCounts::default());
        assert_eq!(summary.mean_weight(), None);
    }

    #[test]
    fn test_mean_weight() {
        let d = details(
            Some(GradeToken::P),
            vec![assignment(Some(GradeToken::B), AssignmentStatus::Normal)],
        );
        let summary = ClassSummary::classify(&overview("Science 7"), Some(&d));
        // P=2, M=3, B=1
        assert_eq!(summary.mean_weight(), Some(2.0));
    }

    #[test]
    fn test_report_totals_and_order() {
        let meeting = ClassSummary::classify(
            &overview("Art 7"),
            Some(&details(Some(GradeToken::M), vec![])),
        );
        let critical = ClassSummary::classify(
            &overview("Science 7"),
            Some(&details(
                Some(GradeToken::B),
                vec![assignment(None, AssignmentStatus::Missing)],
            )),
        );
        let attention = ClassSummary::classify(
            &overview("French 7"),
            Some(&details(Some(GradeToken::P), vec![])),
        );
        let date = Local.with_ymd_and_hms(2025, 9, 15, 7, 0, 0).unwrap();

        let report = Report::new(
            "Sam",
            date,
            vec![meeting.clone(), critical.clone(), attention.clone()],
            vec![],
        );

        let names: Vec<&str> = report.classes().iter().map(|c| c.class_name()).collect();
        assert_eq!(names, vec!["Science 7", "French 7", "Art 7"]);

        let expected = meeting.counts() + critical.counts() + attention.counts();
        assert_eq!(report.totals(), expected);
        assert_eq!(report.totals().missing, 1);
        assert_eq!(report.totals().critical, 1);
        assert_eq!(report.classes_in(Tier::Attention).count(), 1);
    }
}
