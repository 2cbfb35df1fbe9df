//! Per-class standards detail page.
//!
//! The page is a tree of standards (`ul.root-standard-item > li`, nested
//! through `ul.standard-item > li`), each carrying a score and optionally an
//! assignment table. Rows and standards that are missing optional pieces are
//! kept with those fields empty; only rows with too few cells are dropped.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::classify::grade::parse_score;
use crate::classify::types::{Assignment, AssignmentStatus, StandardScore};
use crate::parser::text::{child_elements, has_class, non_empty, text_of};

static ROOT_LIST: Lazy<Selector> = Lazy::new(|| sel("ul.root-standard-item"));
static STD_DATA: Lazy<Selector> = Lazy::new(|| sel("div.standard-item-data"));
static STD_DESC: Lazy<Selector> = Lazy::new(|| sel("span.standard-item-desc"));
static STD_SCORE: Lazy<Selector> = Lazy::new(|| sel("span.standard-item-score-inner"));
static ASN_ROWS: Lazy<Selector> = Lazy::new(|| sel("table.assignmentTable tbody tr"));
static CELL_CONTENT: Lazy<Selector> = Lazy::new(|| sel("span.tablesaw-cell-content"));
static LINK: Lazy<Selector> = Lazy::new(|| sel("a"));
static ICON: Lazy<Selector> = Lazy::new(|| sel("img[title]"));

const MIN_ROW_CELLS: usize = 4;

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// A standard with its nested standards and the assignments listed under it.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardNode {
    pub score: StandardScore,
    pub children: Vec<StandardNode>,
    pub assignments: Vec<Assignment>,
}

impl StandardNode {
    /// Pre-order walk over this node and all of its descendants.
    pub fn walk(&self) -> Vec<&StandardNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDetails {
    pub class_name: String,
    pub standards: Vec<StandardNode>,
}

/// True when the page has at least one root standard list.
pub fn has_standards(html: &str) -> bool {
    Html::parse_document(html).select(&ROOT_LIST).next().is_some()
}

pub fn parse_class_details(html: &str, class_name: &str) -> ClassDetails {
    let doc = Html::parse_document(html);

    let mut standards = Vec::new();
    for root in doc.select(&ROOT_LIST) {
        for li in child_elements(root).filter(|e| e.value().name() == "li") {
            if let Some(node) = parse_standard(li, class_name, 0) {
                standards.push(node);
            }
        }
    }

    let missing: usize = standards
        .iter()
        .flat_map(StandardNode::walk)
        .flat_map(|n| n.assignments.iter())
        .filter(|a| a.is_missing())
        .count();
    info!(class = class_name, standards = standards.len(), missing, "Parsed class details");

    ClassDetails {
        class_name: class_name.to_string(),
        standards,
    }
}

fn parse_standard(li: ElementRef<'_>, class_name: &str, depth: usize) -> Option<StandardNode> {
    let data = child_elements(li)
        .find(|e| e.value().name() == "div" && has_class(*e, "standard-item-data"))
        .or_else(|| li.select(&STD_DATA).next())?;

    let skill_area = data.select(&STD_DESC).next().map(text_of).unwrap_or_default();
    let raw_value = data
        .select(&STD_SCORE)
        .next()
        .map(text_of)
        .and_then(|t| t.split_whitespace().next().map(str::to_string))
        .unwrap_or_default();
    let parsed = parse_score(&raw_value);

    let score = StandardScore {
        skill_area,
        score_token: parsed.token,
        raw_value,
        numeric: parsed.numeric,
        depth,
    };

    let mut children = Vec::new();
    for ul in child_elements(li).filter(|e| e.value().name() == "ul" && has_class(*e, "standard-item")) {
        for child_li in child_elements(ul).filter(|e| e.value().name() == "li") {
            if let Some(child) = parse_standard(child_li, class_name, depth + 1) {
                children.push(child);
            }
        }
    }

    let mut assignments = Vec::new();
    if let Some(container) =
        child_elements(li).find(|e| e.value().name() == "div" && has_class(*e, "divAsnContainer"))
    {
        for row in container.select(&ASN_ROWS) {
            match parse_assignment_row(row, class_name, &score.skill_area) {
                Some(a) => assignments.push(a),
                None => debug!(standard = %score.skill_area, "Skipping short assignment row"),
            }
        }
    }

    Some(StandardNode {
        score,
        children,
        assignments,
    })
}

/// Cell layout: due date, name, weight, grade, then optional feedback.
pub fn parse_assignment_row(
    row: ElementRef<'_>,
    class_name: &str,
    skill_area: &str,
) -> Option<Assignment> {
    let cells: Vec<ElementRef<'_>> = child_elements(row)
        .filter(|e| e.value().name() == "td")
        .collect();
    if cells.len() < MIN_ROW_CELLS {
        return None;
    }

    let due_date = cell_content(cells[0]).map(text_of).and_then(non_empty);

    let mut status = AssignmentStatus::Normal;
    let mut red_name = false;
    let name = match cell_content(cells[1]) {
        Some(span) => match span.select(&LINK).next() {
            Some(link) => {
                red_name = link
                    .value()
                    .attr("style")
                    .map(|s| s.replace(' ', "").to_ascii_lowercase().contains("color:red"))
                    .unwrap_or(false);
                text_of(link)
            }
            None => text_of(span),
        },
        None => String::new(),
    };

    let weight = cell_content(cells[2]).map(text_of).and_then(non_empty);

    let mut raw_grade = String::new();
    let mut score = None;
    let mut numeric = None;
    if let Some(span) = cell_content(cells[3]) {
        match span.select(&ICON).next().and_then(|img| img.value().attr("title")) {
            Some(title) if !title.trim().is_empty() => {
                raw_grade = title.trim().to_string();
                if let Some(s) = AssignmentStatus::from_icon_title(title) {
                    status = s;
                }
            }
            _ => {
                raw_grade = text_of(span);
                let parsed = parse_score(&raw_grade);
                score = parsed.token;
                numeric = parsed.numeric;
            }
        }
    }

    let feedback = cells
        .get(4)
        .and_then(|c| cell_content(*c))
        .map(text_of)
        .and_then(non_empty);

    if red_name || row.value().attr("data-bmissing") == Some("1") {
        status = AssignmentStatus::Missing;
    }

    Some(Assignment {
        name,
        due_date,
        class_name: class_name.to_string(),
        skill_area: skill_area.to_string(),
        score,
        numeric,
        raw_grade,
        weight,
        feedback,
        status,
    })
}

fn cell_content(cell: ElementRef<'_>) -> Option<ElementRef<'_>> {
    cell.select(&CELL_CONTENT).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::grade::GradeToken;
    use pretty_assertions::assert_eq;

    fn row(cells: &str, attrs: &str) -> String {
        format!(
            r#"<ul class="root-standard-item"><li>
                 <div class="standard-item-data">
                   <span class="standard-item-desc">Speaking</span>
                   <span class="standard-item-score-inner">2.5=P</span>
                 </div>
                 <div class="divAsnContainer"><table class="assignmentTable"><tbody>
                   <tr {attrs}>{cells}</tr>
                 </tbody></table></div>
               </li></ul>"#
        )
    }

    fn cell(inner: &str) -> String {
        format!(r#"<td><b class="tablesaw-cell-label">x</b><span class="tablesaw-cell-content">{inner}</span></td>"#)
    }

    fn only_assignment(html: &str) -> Assignment {
        let details = parse_class_details(html, "French 7");
        details.standards[0].assignments[0].clone()
    }

    #[test]
    fn test_scored_row() {
        let cells = [
            cell("9/3/2025"),
            cell("<a href='#'>Oral check-in</a>"),
            cell("1"),
            cell("3=M"),
            cell("Nice work"),
        ]
        .concat();
        let a = only_assignment(&row(&cells, ""));
        assert_eq!(a.name, "Oral check-in");
        assert_eq!(a.due_date.as_deref(), Some("9/3/2025"));
        assert_eq!(a.class_name, "French 7");
        assert_eq!(a.skill_area, "Speaking");
        assert_eq!(a.score, Some(GradeToken::M));
        assert_eq!(a.numeric, Some(3.0));
        assert_eq!(a.weight.as_deref(), Some("1"));
        assert_eq!(a.feedback.as_deref(), Some("Nice work"));
        assert_eq!(a.status, AssignmentStatus::Normal);
    }

    #[test]
    fn test_missing_icon_row_without_due_date() {
        let cells = [
            cell(""),
            cell("<a>Gimkit - avoir</a>"),
            cell(""),
            cell(r#"<img src="m.png" title="Missing">"#),
        ]
        .concat();
        let a = only_assignment(&row(&cells, ""));
        assert_eq!(a.due_date, None);
        assert_eq!(a.weight, None);
        assert_eq!(a.feedback, None);
        assert_eq!(a.score, None);
        assert_eq!(a.raw_grade, "Missing");
        assert_eq!(a.status, AssignmentStatus::Missing);
    }

    #[test]
    fn test_icon_statuses() {
        for (title, expected) in [
            ("Excused", AssignmentStatus::Excused),
            ("Handed In", AssignmentStatus::HandedIn),
            ("Late", AssignmentStatus::Late),
            ("Something New", AssignmentStatus::Normal),
        ] {
            let grade = format!(r#"<img title="{title}">"#);
            let cells = [cell("9/1/2025"), cell("<a>Essay</a>"), cell("1"), cell(&grade)].concat();
            assert_eq!(only_assignment(&row(&cells, "")).status, expected, "{title}");
        }
    }

    #[test]
    fn test_red_link_and_row_flag_mark_missing() {
        let cells = [cell("9/1/2025"), cell(r#"<a style="color: red">Poster</a>"#), cell("1"), cell("")].concat();
        assert_eq!(only_assignment(&row(&cells, "")).status, AssignmentStatus::Missing);

        let cells = [cell("9/1/2025"), cell("<a>Poster</a>"), cell("1"), cell("")].concat();
        assert_eq!(
            only_assignment(&row(&cells, r#"data-bmissing="1""#)).status,
            AssignmentStatus::Missing
        );
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let cells = [cell("9/1/2025"), cell("<a>Poster</a>")].concat();
        let details = parse_class_details(&row(&cells, ""), "Art 7");
        assert!(details.standards[0].assignments.is_empty());
    }

    #[test]
    fn test_nested_standards() {
        let html = r#"<ul class="root-standard-item"><li>
            <div class="standard-item-data">
              <span class="standard-item-desc"> Number &amp;  Operations </span>
              <span class="standard-item-score-inner">2.35=P <i class="chart"></i></span>
            </div>
            <ul class="standard-item"><li>
              <div class="standard-item-data">
                <span class="standard-item-desc">Fractions</span>
                <span class="standard-item-score-inner">1=B</span>
              </div>
            </li><li>
              <div class="standard-item-data">
                <span class="standard-item-desc">Decimals</span>
                <span class="standard-item-score-inner"></span>
              </div>
            </li></ul>
          </li></ul>"#;
        let details = parse_class_details(html, "Mathematics 7");
        assert_eq!(details.standards.len(), 1);

        let root = &details.standards[0];
        assert_eq!(root.score.skill_area, "Number & Operations");
        assert_eq!(root.score.raw_value, "2.35=P");
        assert_eq!(root.score.score_token, Some(GradeToken::P));
        assert_eq!(root.score.depth, 0);
        assert_eq!(root.children.len(), 2);

        let fractions = &root.children[0];
        assert_eq!(fractions.score.score_token, Some(GradeToken::B));
        assert_eq!(fractions.score.depth, 1);

        let decimals = &root.children[1];
        assert_eq!(decimals.score.score_token, None);
        assert_eq!(decimals.score.raw_value, "");

        assert_eq!(root.walk().len(), 3);
    }

    #[test]
    fn test_has_standards() {
        assert!(has_standards(r#"<ul class="root-standard-item"></ul>"#));
        assert!(!has_standards("<p>Session expired</p>"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let cells = [cell("9/1/2025"), cell("<a>Essay</a>"), cell("1"), cell("2=P")].concat();
        let html = row(&cells, "");
        assert_eq!(
            parse_class_details(&html, "English 7"),
            parse_class_details(&html, "English 7")
        );
    }
}
