//! Culture settings used when parsing and comparing *values* (text →
//! number/date). Formula-language localization (function names, argument
//! separators in source text) is the parser collaborator's concern, not ours.

use std::cmp::Ordering;

/// Date component order to use when parsing ambiguous numeric dates like
/// `1/2/2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// Month-Day-Year (`1/2/2024` -> Jan 2, 2024).
    MDY,
    /// Day-Month-Year (`1/2/2024` -> Feb 1, 2024).
    DMY,
    /// Year-Month-Day (`2024/1/2` -> Jan 2, 2024).
    YMD,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Culture {
    pub decimal_sep: char,
    pub group_sep: char,
    pub currency: char,
    pub date_order: DateOrder,
}

impl Default for Culture {
    fn default() -> Self {
        Self::en_us()
    }
}

impl Culture {
    #[must_use]
    pub const fn en_us() -> Culture {
        Culture {
            decimal_sep: '.',
            group_sep: ',',
            currency: '$',
            date_order: DateOrder::MDY,
        }
    }

    /// Same separators as `en-US`; ambiguous numeric dates read day-first.
    #[must_use]
    pub const fn en_gb() -> Culture {
        Culture {
            decimal_sep: '.',
            group_sep: ',',
            currency: '£',
            date_order: DateOrder::DMY,
        }
    }

    #[must_use]
    pub const fn de_de() -> Culture {
        Culture {
            decimal_sep: ',',
            group_sep: '.',
            currency: '€',
            date_order: DateOrder::DMY,
        }
    }

    #[must_use]
    pub const fn fr_fr() -> Culture {
        Culture {
            decimal_sep: ',',
            group_sep: '\u{a0}',
            currency: '€',
            date_order: DateOrder::DMY,
        }
    }

    #[must_use]
    pub const fn es_es() -> Culture {
        Culture {
            decimal_sep: ',',
            group_sep: '.',
            currency: '€',
            date_order: DateOrder::DMY,
        }
    }

    #[must_use]
    pub fn for_locale_id(id: &str) -> Option<Culture> {
        let key = id.trim().to_ascii_lowercase().replace('_', "-");
        let mut parts = key.split('-');
        let lang = parts.next()?;
        let region = parts.next();
        match lang {
            "en" => match region {
                Some("gb") | Some("uk") => Some(Culture::en_gb()),
                _ => Some(Culture::en_us()),
            },
            "de" => Some(Culture::de_de()),
            "fr" => Some(Culture::fr_fr()),
            "es" => Some(Culture::es_es()),
            _ => None,
        }
    }
}

/// Case-insensitive text ordering used by criteria comparisons and lookup
/// scans. Reference text comparison ignores case but not accents.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    if a.is_ascii() && b.is_ascii() {
        let mut a_bytes = a.bytes().map(|b| b.to_ascii_uppercase());
        let mut b_bytes = b.bytes().map(|b| b.to_ascii_uppercase());
        loop {
            match (a_bytes.next(), b_bytes.next()) {
                (Some(x), Some(y)) => match x.cmp(&y) {
                    Ordering::Equal => continue,
                    ord => return ord,
                },
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            }
        }
    }

    let mut a_iter = a.chars().flat_map(char::to_uppercase);
    let mut b_iter = b.chars().flat_map(char::to_uppercase);
    loop {
        match (a_iter.next(), b_iter.next()) {
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => continue,
                ord => return ord,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
        }
    }
}

pub fn text_eq(a: &str, b: &str) -> bool {
    compare_text(a, b) == Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_ignores_case() {
        assert_eq!(compare_text("apple", "APPLE"), Ordering::Equal);
        assert_eq!(compare_text("apple", "banana"), Ordering::Less);
        assert!(text_eq("STRASSE", "strasse"));
        // German sharp s uppercases to SS.
        assert!(text_eq("straße", "STRASSE"));
    }

    #[test]
    fn locale_ids_map_to_presets() {
        assert_eq!(Culture::for_locale_id("en-US"), Some(Culture::en_us()));
        assert_eq!(Culture::for_locale_id("en_GB"), Some(Culture::en_gb()));
        assert_eq!(Culture::for_locale_id("de"), Some(Culture::de_de()));
        assert_eq!(Culture::for_locale_id("zz"), None);
    }
}
