use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeSet, HashSet};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref CONTROL: Regex = Regex::new(r"[\x00-\x1F\x7F]").expect("valid regex");
}

/// Characters that end a token when collecting similars, besides whitespace.
const TOKEN_DELIMITERS: &str = r#",;()\[\]{}<>"|"#;
/// Punctuation stripped from both ends of a collected similar.
const EDGE_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', '(', ')', '[', ']', '{', '}', '<', '>'];

/// NFKC-normalize and fold the Unicode dash family to ASCII `-`.
pub fn normalize_text(text: &str) -> String {
    text.nfkc()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => '-',
            _ => c,
        })
        .collect()
}

/// Whitespace-delimited tokens in first-seen order, without duplicates.
pub fn unique_tokens(text: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    text.split_whitespace().filter(|t| seen.insert(*t)).collect()
}

/// Remove ASCII control characters so values are safe for tabular output.
pub fn clean_control_chars(s: &str) -> String {
    CONTROL.replace_all(s, "").into_owned()
}

/// Case-insensitive literal search for one part identifier.
pub struct LiteralPattern {
    needle: String,
    exact: Option<Regex>,
    token: Option<Regex>,
}

impl LiteralPattern {
    pub fn new(needle: &str) -> Self {
        let escaped = regex::escape(needle);
        let exact = RegexBuilder::new(&escaped).case_insensitive(true).build().ok();
        let token_pattern = format!(r"[^\s{d}]*{escaped}[^\s{d}]*", d = TOKEN_DELIMITERS);
        let token = RegexBuilder::new(&token_pattern).case_insensitive(true).build().ok();
        Self { needle: needle.to_string(), exact, token }
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        match &self.exact {
            Some(re) => re.is_match(haystack),
            None => find_case_insensitive(haystack, &self.needle).is_some(),
        }
    }

    /// Every maximal token of `haystack` that contains the needle, trimmed of edge punctuation.
    pub fn similars(&self, haystack: &str) -> BTreeSet<String> {
        let Some(re) = &self.token else { return BTreeSet::new() };
        re.find_iter(haystack)
            .map(|m| {
                let raw = m.as_str().trim();
                let trimmed = raw.trim_matches(EDGE_PUNCTUATION);
                if self.is_match(trimmed) { trimmed } else { raw }
            })
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.to_lowercase();
    let n = needle.to_lowercase();
    h.find(&n)
}
