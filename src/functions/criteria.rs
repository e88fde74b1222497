//! Criteria parsing and matching shared by the COUNTIF/SUMIF family, the
//! database functions, and multi-criteria tallies. A criterion like
//! `">=10"`, `"<>a*"`, `5`, or `""` becomes a typed comparison that
//! candidate cells are tested against.

use std::cmp::Ordering;

use crate::coerce::parse_number_text;
use crate::locale::{compare_text, Culture};
use crate::value::{ErrorKind, Scalar};

use super::wildcard::WildcardPattern;

/// Longest lookup or criteria text the legacy functions accept.
pub const LEGACY_TEXT_LIMIT: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    None,
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

// Two-character prefixes first so `<` never shadows `<=` or `<>`.
const PREFIXES: [(&str, Comparison); 6] = [
    ("<>", Comparison::NotEqual),
    (">=", Comparison::GreaterOrEqual),
    ("<=", Comparison::LessOrEqual),
    ("=", Comparison::Equal),
    (">", Comparison::GreaterThan),
    ("<", Comparison::LessThan),
];

#[derive(Debug, Clone)]
enum Operand {
    Blank,
    Number(f64),
    Logical(bool),
    Error(ErrorKind),
    Text {
        raw: String,
        pattern: WildcardPattern,
    },
}

#[derive(Debug, Clone)]
pub struct Criteria {
    comparison: Comparison,
    operand: Operand,
}

impl Criteria {
    /// Builds a criterion from the user-supplied scalar. Text is scanned
    /// for a comparison prefix and the remainder re-typed (number first,
    /// then error code, else text). A genuinely blank criterion means
    /// "equal to zero", not "no criterion".
    pub fn create(criterion: &Scalar, culture: &Culture) -> Criteria {
        match criterion {
            Scalar::Text(text) => {
                let (comparison, rest) = split_comparison(text);
                Criteria {
                    comparison,
                    operand: parse_operand(rest, culture),
                }
            }
            Scalar::Blank => Criteria {
                comparison: Comparison::Equal,
                operand: Operand::Number(0.0),
            },
            Scalar::Number(n) => Criteria {
                comparison: Comparison::None,
                operand: Operand::Number(*n),
            },
            Scalar::Logical(b) => Criteria {
                comparison: Comparison::None,
                operand: Operand::Logical(*b),
            },
            Scalar::Error(e) => Criteria {
                comparison: Comparison::None,
                operand: Operand::Error(*e),
            },
        }
    }

    /// Tests one candidate cell. Dispatch is on the operand's type; a
    /// candidate of a different type never matches except under `<>`.
    pub fn matches(&self, candidate: &Scalar) -> bool {
        match &self.operand {
            Operand::Blank => self.matches_blank_operand(candidate),
            Operand::Number(n) => match candidate {
                Scalar::Number(c) => {
                    ord_allows(self.comparison, c.partial_cmp(n).unwrap_or(Ordering::Equal))
                }
                _ => self.comparison == Comparison::NotEqual,
            },
            Operand::Logical(b) => match candidate {
                Scalar::Logical(c) => ord_allows(self.comparison, c.cmp(b)),
                _ => self.comparison == Comparison::NotEqual,
            },
            Operand::Error(e) => match candidate {
                Scalar::Error(c) => {
                    ord_allows(self.comparison, c.type_number().cmp(&e.type_number()))
                }
                _ => self.comparison == Comparison::NotEqual,
            },
            Operand::Text { raw, pattern } => match candidate {
                Scalar::Text(c) => match self.comparison {
                    Comparison::None | Comparison::Equal => pattern.matches(c),
                    Comparison::NotEqual => !pattern.matches(c),
                    _ => ord_allows(self.comparison, compare_text(c, raw)),
                },
                _ => self.comparison == Comparison::NotEqual,
            },
        }
    }

    /// Whether a Blank cell would satisfy this criterion. Tallies over
    /// multiple areas use this so unset cells need no per-area handling.
    pub fn can_blank_match(&self) -> bool {
        self.matches(&Scalar::Blank)
    }

    fn matches_blank_operand(&self, candidate: &Scalar) -> bool {
        let is_blank = matches!(candidate, Scalar::Blank);
        match self.comparison {
            // A bare "" criterion also accepts empty text; "=" is stricter.
            Comparison::None => {
                is_blank || matches!(candidate, Scalar::Text(t) if t.is_empty())
            }
            Comparison::Equal => is_blank,
            Comparison::NotEqual => !is_blank,
            _ => false,
        }
    }
}

fn split_comparison(text: &str) -> (Comparison, &str) {
    for (prefix, comparison) in PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            return (comparison, rest);
        }
    }
    (Comparison::None, text)
}

fn parse_operand(rest: &str, culture: &Culture) -> Operand {
    if rest.is_empty() {
        return Operand::Blank;
    }
    if let Some(n) = parse_number_text(rest, culture) {
        return Operand::Number(n);
    }
    if rest.starts_with('#') {
        if let Some(kind) = ErrorKind::from_code(rest) {
            return Operand::Error(kind);
        }
    }
    Operand::Text {
        raw: rest.to_string(),
        pattern: WildcardPattern::new(rest),
    }
}

fn ord_allows(comparison: Comparison, found: Ordering) -> bool {
    match comparison {
        Comparison::None | Comparison::Equal => found == Ordering::Equal,
        Comparison::NotEqual => found != Ordering::Equal,
        Comparison::LessThan => found == Ordering::Less,
        Comparison::LessOrEqual => found != Ordering::Greater,
        Comparison::GreaterThan => found == Ordering::Greater,
        Comparison::GreaterOrEqual => found != Ordering::Less,
    }
}
