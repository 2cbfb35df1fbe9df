//! Plain-text rendering of a [`Report`] for the parent email.

use std::fmt::Write;

use crate::classify::{Assignment, AssignmentStatus, ClassSummary, Report, Tier};

pub fn subject(report: &Report) -> String {
    format!(
        "TeacherEase Update: {} - {}",
        report.student_name(),
        report.generation_date().format("%Y-%m-%d")
    )
}

/// Rows worth showing a parent: missing, below Meeting, or not graded yet.
fn is_flagged(a: &Assignment) -> bool {
    a.is_missing()
        || a.tier().is_some_and(|t| t != Tier::Meeting)
        || matches!(a.status, AssignmentStatus::Excused | AssignmentStatus::HandedIn)
        || a.raw_grade.is_empty()
}

fn grade_label(a: &Assignment) -> String {
    if a.is_missing() {
        return "MISSING".to_string();
    }
    if a.raw_grade.is_empty() {
        return "Not Graded".to_string();
    }
    match a.status {
        AssignmentStatus::Late if a.score.is_some() => format!("{} (late)", a.raw_grade),
        AssignmentStatus::Excused | AssignmentStatus::HandedIn => a.status.label().to_string(),
        _ => a.raw_grade.clone(),
    }
}

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let totals = report.totals();
    let attention: Vec<&ClassSummary> = report
        .classes()
        .iter()
        .filter(|c| c.overall_status() != Tier::Meeting)
        .collect();
    let meeting: Vec<&ClassSummary> = report.classes_in(Tier::Meeting).collect();

    let _ = writeln!(out, "TeacherEase Grade Report - {}", report.student_name());
    let _ = writeln!(
        out,
        "Report Date: {}",
        report.generation_date().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "  Total classes:        {}", report.classes().len());
    let _ = writeln!(out, "  Meeting expectations: {}", meeting.len());
    let _ = writeln!(out, "  Needs attention:      {}", attention.len());
    let _ = writeln!(out, "  Missing assignments:  {}", totals.missing);
    let _ = writeln!(out, "  Below Meeting:        {}", totals.below_meeting);
    let _ = writeln!(out, "  Critical (B / NY):    {}", totals.critical);

    if !report.missing_work().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "MISSING WORK ({})", report.missing_work().len());
        for item in report.missing_work() {
            let _ = writeln!(
                out,
                "  - {} | {} | due {}",
                item.assignment, item.class_name, item.due
            );
        }
    }

    if !attention.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "CLASSES NEEDING ATTENTION");
        for class in &attention {
            render_class(&mut out, class);
        }
    }

    if !meeting.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "CLASSES MEETING EXPECTATIONS");
        for class in &meeting {
            let _ = writeln!(
                out,
                "  - {} ({})",
                class.class_name(),
                class.portal_status().label()
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--");
    let _ = writeln!(out, "Generated automatically by grade_digest");
    out
}

fn render_class(out: &mut String, class: &ClassSummary) {
    let counts = class.counts();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {} [{}] - {}",
        class.class_name(),
        class.overall_status(),
        class.instructor()
    );
    let _ = writeln!(
        out,
        "    missing {}, below Meeting {}, critical {}",
        counts.missing, counts.below_meeting, counts.critical
    );
    if let Some(w) = class.mean_weight() {
        let _ = writeln!(out, "    average level {w:.2} (M = 3.00)");
    }

    let standards: Vec<_> = class
        .standards()
        .iter()
        .filter(|s| s.tier().is_some_and(|t| t != Tier::Meeting))
        .collect();
    if !standards.is_empty() {
        let _ = writeln!(out, "    Standards below Meeting:");
        for s in standards {
            let indent = "  ".repeat(s.depth);
            let label = s.score_token.map(|t| t.label()).unwrap_or("");
            let _ = writeln!(out, "      {indent}{}: {} {label}", s.skill_area, s.raw_value);
        }
    }

    let flagged: Vec<&Assignment> = class.assignments().iter().filter(|a| is_flagged(a)).collect();
    if !flagged.is_empty() {
        let _ = writeln!(out, "    Assignments:");
        for a in flagged {
            let _ = writeln!(
                out,
                "      - {} | due {} | {}",
                a.name,
                a.due_date.as_deref().unwrap_or("-"),
                grade_label(a)
            );
        }
    }
}
