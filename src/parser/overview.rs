//! Grades overview page: embedded class list and the missing-work section.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::PortalError;
use crate::parser::text::{normalize_ws, visible_lines};

/// The list view on the overview page is initialised from an inline JSON blob.
static CLASS_PAYLOAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)"data":\{"Data":\[(.*?)\],"Total""#).expect("valid regex"));

/// `9/11/2025 11:59 PM French 7 Gimkit - avoir`
static MISSING_WORK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}/\d{1,2}/\d{4})\s+(\d{1,2}:\d{2}\s*[AP]M)\s+([A-Z][^\n]*?\d+)\s+([^\n]+)")
        .expect("valid regex")
});

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").expect("valid regex"));

const MAX_ASSIGNMENT_NAME: usize = 200;

/// Class-level status reported by the portal itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortalStatus {
    Meeting,
    /// Shown as "Click on Details" on the page.
    NeedsAttention,
    NotAssessed,
}

impl PortalStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => PortalStatus::Meeting,
            2 => PortalStatus::NeedsAttention,
            _ => PortalStatus::NotAssessed,
        }
    }

    pub fn is_assessed(self) -> bool {
        self != PortalStatus::NotAssessed
    }

    pub fn label(self) -> &'static str {
        match self {
            PortalStatus::Meeting => "Meeting",
            PortalStatus::NeedsAttention => "Click on Details",
            PortalStatus::NotAssessed => "Not Assessed",
        }
    }
}

/// One entry of the overview class list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassOverview {
    pub name: String,
    pub instructor: String,
    pub status: PortalStatus,
    pub class_id: Option<String>,
    pub cgp_id: Option<String>,
    pub targets_meeting: u32,
    pub targets_not_meeting: u32,
    pub total_targets: u32,
}

/// A row from the overview page's missing-work section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingWork {
    pub due: String,
    pub class_name: String,
    pub assignment: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GradesOverview {
    pub classes: Vec<ClassOverview>,
    pub missing_work: Vec<MissingWork>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawClass {
    class_description: Option<String>,
    instructor_description: Option<Vec<String>>,
    grade_status: Option<RawGradeStatus>,
    progress: Option<RawProgress>,
    #[serde(rename = "ClassID")]
    class_id: Option<Value>,
    #[serde(rename = "CurrentCGPID")]
    current_cgp_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawGradeStatus {
    #[serde(default)]
    status: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawProgress {
    learning_targets_meeting: u32,
    learning_targets_not_meeting: u32,
    total_leaf_learning_targets: u32,
}

/// True when the page carries the inline class list.
pub fn has_class_payload(html: &str) -> bool {
    CLASS_PAYLOAD_RE.is_match(html)
}

/// Parses the grades overview page.
///
/// # Errors
///
/// `StructuralChange` when the inline class list is absent, `Parse` when it
/// is present but is not valid JSON.
pub fn parse_grades_overview(html: &str) -> Result<GradesOverview, PortalError> {
    let classes = extract_classes(html)?;
    let doc = Html::parse_document(html);
    let missing_work = parse_missing_work(&visible_lines(&doc).join("\n"));

    let needs_attention = classes
        .iter()
        .filter(|c| c.status == PortalStatus::NeedsAttention)
        .count();
    info!(
        classes = classes.len(),
        needs_attention,
        missing = missing_work.len(),
        "Parsed grades overview"
    );

    Ok(GradesOverview {
        classes,
        missing_work,
    })
}

fn extract_classes(html: &str) -> Result<Vec<ClassOverview>, PortalError> {
    let caps = CLASS_PAYLOAD_RE
        .captures(html)
        .ok_or_else(|| PortalError::StructuralChange {
            page: "grades overview".into(),
            expected: "embedded class data".into(),
        })?;

    let json = format!("[{}]", &caps[1]);
    let raw: Vec<RawClass> =
        serde_json::from_str(&json).map_err(|e| PortalError::parse("overview class data", e))?;
    debug!(count = raw.len(), "Decoded embedded class data");

    Ok(raw.into_iter().map(ClassOverview::from).collect())
}

impl From<RawClass> for ClassOverview {
    fn from(raw: RawClass) -> Self {
        let progress = raw.progress.unwrap_or_default();
        ClassOverview {
            name: raw
                .class_description
                .map(|s| normalize_ws(&s))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Unknown Class".to_string()),
            instructor: raw
                .instructor_description
                .and_then(|v| v.into_iter().next())
                .map(|s| normalize_ws(&s))
                .unwrap_or_else(|| "Unknown".to_string()),
            status: PortalStatus::from_code(raw.grade_status.map(|g| g.status).unwrap_or(0)),
            class_id: raw.class_id.and_then(id_string),
            cgp_id: raw.current_cgp_id.and_then(id_string),
            targets_meeting: progress.learning_targets_meeting,
            targets_not_meeting: progress.learning_targets_not_meeting,
            total_targets: progress.total_leaf_learning_targets,
        }
    }
}

/// IDs show up as numbers or strings depending on the page version.
fn id_string(v: Value) -> Option<String> {
    match v {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Scans visible page text for `date time class assignment` sequences.
///
/// An entry's assignment name stops at the next date, which starts the next
/// entry even when both sit on the same line.
pub fn parse_missing_work(text: &str) -> Vec<MissingWork> {
    let mut missing = Vec::new();
    let mut pos = 0;
    while let Some(cap) = MISSING_WORK_RE.captures_at(text, pos) {
        let Some(tail) = cap.get(4) else { break };
        let end = DATE_RE
            .find(tail.as_str())
            .map_or(tail.end(), |next| tail.start() + next.start());
        pos = end;

        let assignment = normalize_ws(&text[tail.start()..end]);
        if assignment.is_empty() || assignment.len() >= MAX_ASSIGNMENT_NAME {
            warn!(len = assignment.len(), "Skipping implausible missing-work entry");
            continue;
        }
        missing.push(MissingWork {
            due: format!("{} {}", &cap[1], normalize_ws(&cap[2])),
            class_name: normalize_ws(&cap[3]),
            assignment,
        });
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r##"<html><body>
        <h2>Missing Work</h2>
        <div class="mw"><span>9/11/2025</span> <span>11:59 PM</span>
          <span>French 7</span><span>Gimkit - avoir</span></div>
        <script>
        $("#list").kendoListView({"dataSource":{"data":{"Data":[
          {"ClassDescription":"Mathematics 7","InstructorDescription":["Ms. Lane"],
           "GradeStatus":{"Status":1},"Progress":{"LearningTargetsMeeting":5,"LearningTargetsNotMeeting":0,"TotalLeafLearningTargets":5},
           "ClassID":101,"CurrentCGPID":"9001"},
          {"ClassDescription":"French 7","InstructorDescription":["M. Roy"],
           "GradeStatus":{"Status":2},"Progress":{"LearningTargetsMeeting":2,"LearningTargetsNotMeeting":3,"TotalLeafLearningTargets":5},
           "ClassID":102,"CurrentCGPID":9002},
          {"ClassDescription":"Band","GradeStatus":{"Status":0}}
        ],"Total":3}}});
        </script></body></html>"##;

    #[test]
    fn test_has_class_payload() {
        assert!(has_class_payload(PAGE));
        assert!(!has_class_payload("<html><body>Student Main</body></html>"));
    }

    #[test]
    fn test_parse_classes() {
        let overview = parse_grades_overview(PAGE).unwrap();
        assert_eq!(overview.classes.len(), 3);

        let math = &overview.classes[0];
        assert_eq!(math.name, "Mathematics 7");
        assert_eq!(math.instructor, "Ms. Lane");
        assert_eq!(math.status, PortalStatus::Meeting);
        assert_eq!(math.class_id.as_deref(), Some("101"));
        assert_eq!(math.cgp_id.as_deref(), Some("9001"));
        assert_eq!(math.total_targets, 5);

        let french = &overview.classes[1];
        assert_eq!(french.status, PortalStatus::NeedsAttention);
        assert_eq!(french.cgp_id.as_deref(), Some("9002"));
        assert_eq!(french.targets_not_meeting, 3);

        let band = &overview.classes[2];
        assert_eq!(band.status, PortalStatus::NotAssessed);
        assert_eq!(band.instructor, "Unknown");
        assert_eq!(band.class_id, None);
    }

    #[test]
    fn test_parse_missing_work_from_page() {
        let overview = parse_grades_overview(PAGE).unwrap();
        assert_eq!(
            overview.missing_work,
            vec![MissingWork {
                due: "9/11/2025 11:59 PM".into(),
                class_name: "French 7".into(),
                assignment: "Gimkit - avoir".into(),
            }]
        );
    }

    #[test]
    fn test_missing_work_same_line_entries() {
        let text = "9/11/2025 11:59 PM French 7 Gimkit 9/12/2025 8:00 AM Science 7 Lab report";
        let items = parse_missing_work(text);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].assignment, "Gimkit");
        assert_eq!(items[1].due, "9/12/2025 8:00 AM");
        assert_eq!(items[1].class_name, "Science 7");
        assert_eq!(items[1].assignment, "Lab report");
    }

    #[test]
    fn test_missing_payload_is_structural() {
        let err = parse_grades_overview("<html></html>").unwrap_err();
        assert_eq!(err.kind(), "structural_change");
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let html = r#"{"data":{"Data":[{"ClassDescription": oops}],"Total":1}}"#;
        let err = parse_grades_overview(html).unwrap_err();
        assert_eq!(err.kind(), "parse_error");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PortalStatus::from_code(1), PortalStatus::Meeting);
        assert_eq!(PortalStatus::from_code(2), PortalStatus::NeedsAttention);
        assert_eq!(PortalStatus::from_code(0), PortalStatus::NotAssessed);
        assert_eq!(PortalStatus::from_code(7), PortalStatus::NotAssessed);
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(
            parse_grades_overview(PAGE).unwrap(),
            parse_grades_overview(PAGE).unwrap()
        );
    }
}
