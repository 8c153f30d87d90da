//! Ratcliff/Obershelp sequence similarity.
//!
//! The ratio is `2 * M / T`, where `T` is the total number of characters in both strings
//! and `M` the number of characters in the matching blocks found by repeatedly taking the
//! longest common substring and recursing on both sides of it. Works on `char`s, has no
//! junk heuristic.

use std::cmp::Ordering;
use std::collections::HashMap;

/// Compares many candidate strings against one fixed target.
///
/// The target's index is built once, so scoring a candidate costs roughly
/// `O(len(candidate) * occurrences)`.
pub struct SequenceMatcher {
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
    bcount: HashMap<char, usize>,
}

impl SequenceMatcher {
    pub fn new(target: &str) -> Self {
        let b: Vec<char> = target.chars().collect();
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        let mut bcount: HashMap<char, usize> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
            *bcount.entry(c).or_insert(0) += 1;
        }
        Self { b, b2j, bcount }
    }

    /// Similarity of `candidate` to the target in `[0, 1]`.
    pub fn ratio(&self, candidate: &str) -> f64 {
        let a: Vec<char> = candidate.chars().collect();
        self.ratio_chars(&a)
    }

    fn ratio_chars(&self, a: &[char]) -> f64 {
        calculate_ratio(self.matching_chars(a), a.len() + self.b.len())
    }

    /// Upper bound on [`ratio`](Self::ratio) from character multiset overlap.
    pub fn quick_ratio(&self, a: &[char]) -> f64 {
        let mut avail: HashMap<char, isize> = HashMap::new();
        let mut matches = 0;
        for c in a {
            let n = avail.entry(*c).or_insert_with(|| self.bcount.get(c).copied().unwrap_or(0) as isize);
            *n -= 1;
            if *n >= 0 {
                matches += 1;
            }
        }
        calculate_ratio(matches, a.len() + self.b.len())
    }

    /// Upper bound on [`ratio`](Self::ratio) from lengths alone.
    pub fn real_quick_ratio(&self, a_len: usize) -> f64 {
        calculate_ratio(a_len.min(self.b.len()), a_len + self.b.len())
    }

    fn matching_chars(&self, a: &[char]) -> usize {
        let mut total = 0;
        let mut pending = vec![(0, a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, k) = self.longest_match(a, alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given windows. Ties go to the
    /// earliest `i`, then the earliest `j`.
    fn longest_match(&self, a: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(js) = self.b2j.get(c) {
                for &j in js {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }
        (besti, bestj, bestsize)
    }
}

fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length == 0 {
        return 1.0;
    }
    2.0 * matches as f64 / length as f64
}

/// Similarity ratio of two strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(b).ratio(a)
}

/// Best candidate scoring at least `cutoff` against `word`.
///
/// Candidates are ranked by score, and equal scores go to the lexicographically greater
/// candidate, so the result does not depend on iteration order.
pub fn closest_match<'a, I>(word: &str, candidates: I, cutoff: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    best_by(word, candidates, cutoff, |c| c.to_string())
}

/// [`closest_match`] comparing lowercased forms; the returned candidate keeps its casing.
pub fn closest_match_ignore_case<'a, I>(word: &str, candidates: I, cutoff: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    best_by(&word.to_lowercase(), candidates, cutoff, str::to_lowercase)
}

fn best_by<'a, I, F>(word: &str, candidates: I, cutoff: f64, key: F) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(&str) -> String,
{
    let matcher = SequenceMatcher::new(word);
    let mut best: Option<(f64, &'a str)> = None;
    for candidate in candidates {
        let a: Vec<char> = key(candidate).chars().collect();
        if matcher.real_quick_ratio(a.len()) < cutoff || matcher.quick_ratio(&a) < cutoff {
            continue;
        }
        let score = matcher.ratio_chars(&a);
        if score < cutoff {
            continue;
        }
        let better = match best {
            None => true,
            Some((s, c)) => match score.partial_cmp(&s) {
                Some(Ordering::Greater) => true,
                Some(Ordering::Equal) => candidate > c,
                _ => false,
            },
        };
        if better {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

    #[test]
    fn ratio_of_shifted_strings() {
        assert!(approx(ratio("abcd", "bcde"), 0.75));
        assert!(approx(ratio("", ""), 1.0));
        assert!(approx(ratio("abc", ""), 0.0));
    }

    #[test]
    fn ratio_counts_recursive_blocks() {
        // "qabxcd" vs "abycdf": blocks "ab" and "cd"
        assert!(approx(ratio("qabxcd", "abycdf"), 2.0 * 4.0 / 12.0));
    }

    #[test]
    fn one_character_typo_in_part_number() {
        let r = ratio("ABC-123", "ABC-124");
        assert!(approx(r, 12.0 / 14.0));
    }

    #[test]
    fn bounds_never_undercut_ratio() {
        let m = SequenceMatcher::new("LM317T");
        for cand in ["LM317", "LM7805", "TL431", "lm317t", "LM317TG-ND"] {
            let a: Vec<char> = cand.chars().collect();
            let r = m.ratio(cand);
            assert!(m.quick_ratio(&a) >= r);
            assert!(m.real_quick_ratio(a.len()) >= m.quick_ratio(&a));
        }
    }

    #[test]
    fn closest_match_picks_best_above_cutoff() {
        let words = ["ape", "apple", "peach", "puppy"];
        assert_eq!(closest_match("appel", words, 0.6), Some("apple"));
        assert_eq!(closest_match("wheel", words, 0.6), None);
    }

    #[test]
    fn ties_go_to_greater_candidate() {
        // both are one substitution away
        assert_eq!(closest_match("AB-10", ["AB-11", "AB-12"], 0.6), Some("AB-12"));
        assert_eq!(closest_match("AB-10", ["AB-12", "AB-11"], 0.6), Some("AB-12"));
    }

    #[test]
    fn ignore_case_keeps_candidate_casing() {
        assert_eq!(closest_match_ignore_case("abc-124", ["ABC-123"], 0.65), Some("ABC-123"));
        assert_eq!(closest_match("abc-124", ["ABC-123"], 0.65), None);
    }
}
