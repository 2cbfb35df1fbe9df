use serde::Serialize;
use std::fmt;

/// Severity of a grade or of a whole class, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    Meeting,
    Attention,
    Critical,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Meeting => "Meeting",
            Tier::Attention => "Attention",
            Tier::Critical => "Critical",
        })
    }
}

/// Standards-based grading levels used by the portal.
///
/// | Token | Meaning     | Weight | Tier      |
/// |-------|-------------|--------|-----------|
/// | M     | Meeting     | 3.0    | Meeting   |
/// | P     | Progressing | 2.0    | Attention |
/// | B     | Beginning   | 1.0    | Critical  |
/// | NY    | Not Yet     | 0.5    | Critical  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GradeToken {
    M,
    P,
    B,
    NY,
}

impl GradeToken {
    pub const ALL: [GradeToken; 4] = [GradeToken::M, GradeToken::P, GradeToken::B, GradeToken::NY];

    pub fn weight(self) -> f64 {
        match self {
            GradeToken::M => 3.0,
            GradeToken::P => 2.0,
            GradeToken::B => 1.0,
            GradeToken::NY => 0.5,
        }
    }

    pub fn tier(self) -> Tier {
        match self {
            GradeToken::M => Tier::Meeting,
            GradeToken::P => Tier::Attention,
            GradeToken::B | GradeToken::NY => Tier::Critical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeToken::M => "Meeting",
            GradeToken::P => "Progressing",
            GradeToken::B => "Beginning",
            GradeToken::NY => "Not Yet",
        }
    }

    /// Matches a bare letter code (`"M"`, `"ny"`, ...). Anything else is `None`.
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim().to_ascii_uppercase().as_str() {
            "M" => Some(GradeToken::M),
            "P" => Some(GradeToken::P),
            "B" => Some(GradeToken::B),
            "NY" => Some(GradeToken::NY),
            _ => None,
        }
    }
}

impl fmt::Display for GradeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GradeToken::M => "M",
            GradeToken::P => "P",
            GradeToken::B => "B",
            GradeToken::NY => "NY",
        })
    }
}

/// A portal score split into its parts, e.g. `"2.35=P"`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreText {
    pub numeric: Option<f64>,
    pub letter: String,
    pub token: Option<GradeToken>,
}

/// Splits `"<number>=<letter>"` score text.
///
/// Text without `=` is treated as a bare letter. A numeric part that does not
/// parse is dropped while the letter is still honored.
pub fn parse_score(text: &str) -> ScoreText {
    let text = text.trim();
    let (numeric, letter) = match text.split_once('=') {
        Some((n, l)) => (n.trim().parse::<f64>().ok(), l),
        None => (None, text),
    };
    let letter: String = letter
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let token = GradeToken::from_letter(&letter);

    ScoreText {
        numeric,
        letter,
        token,
    }
}
