//! Wildcard text matching for criteria and exact-mode lookups: `*` matches
//! any run (including empty), `?` exactly one character, `~` escapes the
//! next wildcard. Matching is case-insensitive.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Star,
    AnyChar,
    Literal(char),
}

#[derive(Debug, Clone)]
pub struct WildcardPattern {
    tokens: Vec<Token>,
    has_wildcards: bool,
    ascii_only: bool,
}

impl WildcardPattern {
    pub fn new(pattern: &str) -> WildcardPattern {
        let mut tokens = Vec::with_capacity(pattern.len());
        let mut has_wildcards = false;
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' => {
                    // Collapse runs of stars; they match the same inputs.
                    if tokens.last() != Some(&Token::Star) {
                        tokens.push(Token::Star);
                    }
                    has_wildcards = true;
                }
                '?' => {
                    tokens.push(Token::AnyChar);
                    has_wildcards = true;
                }
                '~' => match chars.peek() {
                    // `~` only escapes a wildcard (or itself); anywhere else
                    // it is an ordinary character.
                    Some(&next @ ('*' | '?' | '~')) => {
                        chars.next();
                        push_literal(&mut tokens, next);
                    }
                    _ => push_literal(&mut tokens, '~'),
                },
                other => push_literal(&mut tokens, other),
            }
        }
        let ascii_only = tokens
            .iter()
            .all(|t| !matches!(t, Token::Literal(c) if !c.is_ascii()));
        WildcardPattern {
            tokens,
            has_wildcards,
            ascii_only,
        }
    }

    /// True when the pattern contains an unescaped `*` or `?`. A pattern
    /// without wildcards still matches, as case-insensitive equality.
    pub fn has_wildcards(&self) -> bool {
        self.has_wildcards
    }

    pub fn matches(&self, text: &str) -> bool {
        if self.ascii_only && text.is_ascii() {
            let folded: Vec<char> = text.chars().map(|c| c.to_ascii_uppercase()).collect();
            return match_folded(&self.tokens, &folded);
        }
        let folded: Vec<char> = text.chars().flat_map(char::to_uppercase).collect();
        match_folded(&self.tokens, &folded)
    }

    /// Earliest character position `>= from` (counted in the caller's
    /// characters) where the pattern matches some prefix of the remaining
    /// text; SEARCH's matcher. Folding can expand characters, so an origin
    /// map carries each folded index back to the character it came from.
    pub fn find_in(&self, text: &str, from: usize) -> Option<usize> {
        let mut folded = Vec::new();
        let mut origin = Vec::new();
        let mut char_count = 0usize;
        for (i, c) in text.chars().enumerate() {
            char_count = i + 1;
            for up in c.to_uppercase() {
                folded.push(up);
                origin.push(i);
            }
        }
        (0..=folded.len()).find_map(|start| {
            let position = if start == folded.len() {
                char_count
            } else {
                origin[start]
            };
            if position < from {
                return None;
            }
            if match_some_prefix(&self.tokens, &folded[start..]) {
                Some(position)
            } else {
                None
            }
        })
    }
}

fn push_literal(tokens: &mut Vec<Token>, c: char) {
    // Fold at tokenize time so the matcher compares folded-to-folded;
    // one-to-many uppercasings (ß → SS) expand into several literals.
    for up in c.to_uppercase() {
        tokens.push(Token::Literal(up));
    }
}

/// Iterative greedy match with a single backtrack point per star, linear in
/// the candidate for non-pathological patterns.
fn match_folded(tokens: &[Token], text: &[char]) -> bool {
    let mut t = 0usize;
    let mut s = 0usize;
    let mut star: Option<(usize, usize)> = None;
    while s < text.len() {
        match tokens.get(t) {
            Some(Token::Star) => {
                star = Some((t + 1, s));
                t += 1;
            }
            Some(Token::AnyChar) => {
                t += 1;
                s += 1;
            }
            Some(Token::Literal(c)) if *c == text[s] => {
                t += 1;
                s += 1;
            }
            _ => match star {
                Some((restart, star_s)) => {
                    t = restart;
                    s = star_s + 1;
                    star = Some((restart, star_s + 1));
                }
                None => return false,
            },
        }
    }
    while matches!(tokens.get(t), Some(Token::Star)) {
        t += 1;
    }
    t == tokens.len()
}

/// Can the pattern consume some prefix of `text`? Trailing text is free,
/// which is what makes this a find rather than a full match.
fn match_some_prefix(tokens: &[Token], text: &[char]) -> bool {
    match tokens.split_first() {
        None => true,
        Some((Token::Star, rest)) => {
            (0..=text.len()).any(|skip| match_some_prefix(rest, &text[skip..]))
        }
        Some((Token::AnyChar, rest)) => !text.is_empty() && match_some_prefix(rest, &text[1..]),
        Some((Token::Literal(c), rest)) => {
            text.first() == Some(c) && match_some_prefix(rest, &text[1..])
        }
    }
}

/// Whether lookup text should take the wildcard path at all.
pub fn contains_wildcards(s: &str) -> bool {
    s.contains(['*', '?', '~'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, text: &str) -> bool {
        WildcardPattern::new(pattern).matches(text)
    }

    #[test]
    fn stars_match_any_run() {
        assert!(matches("*", ""));
        assert!(matches("*", "anything"));
        assert!(matches("a*", "apple"));
        assert!(matches("*le", "apple"));
        assert!(matches("a*e", "apple"));
        assert!(matches("a**e", "apple"));
        assert!(!matches("a*z", "apple"));
        assert!(matches("*a*b*", "xaxbx"));
    }

    #[test]
    fn question_marks_match_exactly_one() {
        assert!(matches("a?c", "abc"));
        assert!(!matches("a?c", "ac"));
        assert!(!matches("a?c", "abbc"));
        assert!(matches("???", "abc"));
    }

    #[test]
    fn matching_ignores_case() {
        assert!(matches("APPLE", "apple"));
        assert!(matches("a*E", "ApplE"));
        assert!(matches("straße", "STRASSE"));
    }

    #[test]
    fn tilde_escapes_only_wildcards() {
        assert!(matches("10~*", "10*"));
        assert!(!matches("10~*", "10x"));
        assert!(matches("a~?b", "a?b"));
        assert!(matches("~~", "~"));
        // A tilde before an ordinary character is literal.
        assert!(matches("a~b", "a~b"));
        assert!(matches("end~", "end~"));
    }

    #[test]
    fn no_wildcards_means_plain_equality() {
        let p = WildcardPattern::new("plain");
        assert!(!p.has_wildcards());
        assert!(p.matches("PLAIN"));
        assert!(!p.matches("plain2"));
        assert!(WildcardPattern::new("esc~*").has_wildcards() == false);
        assert!(WildcardPattern::new("a?").has_wildcards());
    }

    #[test]
    fn empty_pattern_matches_only_empty_text() {
        assert!(matches("", ""));
        assert!(!matches("", "x"));
    }

    #[test]
    fn find_reports_earliest_start() {
        let p = WildcardPattern::new("a?c");
        assert_eq!(p.find_in("xxabcx", 0), Some(2));
        assert_eq!(p.find_in("xxabcx", 3), None);
        assert_eq!(p.find_in("abcabc", 1), Some(3));
        assert_eq!(WildcardPattern::new("b*d").find_in("abcd", 0), Some(1));
    }

    #[test]
    fn find_without_wildcards_is_substring_search() {
        let p = WildcardPattern::new("BC");
        assert_eq!(p.find_in("abcbc", 0), Some(1));
        assert_eq!(p.find_in("abcbc", 2), Some(3));
        assert_eq!(p.find_in("xyz", 0), None);
    }

    #[test]
    fn find_positions_survive_expanding_case_folds() {
        // ß uppercases to SS; positions must still count original chars.
        let p = WildcardPattern::new("asse");
        assert_eq!(p.find_in("straße", 0), Some(3));
    }

    #[test]
    fn empty_pattern_finds_the_from_position() {
        let p = WildcardPattern::new("");
        assert_eq!(p.find_in("abc", 1), Some(1));
        assert_eq!(p.find_in("", 0), Some(0));
    }
}
