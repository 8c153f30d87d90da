//! Per-part classification against a [`Corpus`].
//!
//! Tiers, first hit wins: literal case-insensitive match (with similars), fuzzy nearest
//! token, not found. A part scoped to one document only looks there; an unscoped part
//! scans the whole corpus and falls back to fuzzy matching on document references.

use crate::config::MatchConfig;
use crate::corpus::Corpus;
use crate::similarity::closest_match_ignore_case;
use crate::tokenizer::{normalize_text, unique_tokens, LiteralPattern};
use crate::{DocumentRef, MatchVerdict, PartRecord};
use std::thread;

/// Classify every record. The output has one verdict per record, in input order.
///
/// Records are split into contiguous chunks, one per worker thread; each worker owns its
/// chunk's output and the chunks are concatenated afterwards.
pub fn match_parts(corpus: &Corpus, parts: &[PartRecord], config: &MatchConfig) -> Vec<MatchVerdict> {
    if parts.is_empty() {
        return Vec::new();
    }
    let workers = config.worker_count().clamp(1, parts.len());
    let chunk_size = parts.len().div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = parts
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || chunk.iter().map(|r| match_part(corpus, r, config)).collect::<Vec<_>>())
            })
            .collect();

        let mut verdicts = Vec::with_capacity(parts.len());
        for handle in handles {
            match handle.join() {
                Ok(chunk) => verdicts.extend(chunk),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        verdicts
    })
}

/// Classify one record.
pub fn match_part(corpus: &Corpus, record: &PartRecord, config: &MatchConfig) -> MatchVerdict {
    let part = record.part.trim();
    if part.is_empty() {
        return MatchVerdict::not_found(part);
    }
    // Searched text is normalized at extraction; the needle has to match that form.
    let needle = Needle { part, normalized: normalize_text(part) };
    match &record.document {
        Some(reference) => match_scoped(corpus, &needle, reference, config),
        None => match_unscoped(corpus, &needle, config),
    }
}

/// A trimmed part identifier as supplied, and the form it is searched with.
struct Needle<'a> {
    part: &'a str,
    normalized: String,
}

fn match_scoped(
    corpus: &Corpus,
    needle: &Needle<'_>,
    reference: &DocumentRef,
    config: &MatchConfig,
) -> MatchVerdict {
    let part = needle.part;
    let (Some(text), Some(chars)) = (corpus.get(reference.as_str()), corpus.char_count(reference.as_str())) else {
        return MatchVerdict::missing_document(part);
    };
    if chars <= config.unreadable_threshold {
        return MatchVerdict::unreadable(part);
    }
    let pattern = LiteralPattern::new(&needle.normalized);
    if pattern.is_match(text) {
        return MatchVerdict::exact(part, pattern.similars(text), reference.clone());
    }
    match closest_match_ignore_case(&needle.normalized, unique_tokens(text), config.fuzzy_cutoff) {
        Some(token) => MatchVerdict::fuzzy(part, token.to_string(), reference.clone()),
        None => MatchVerdict::not_found(part),
    }
}

/// What a corpus-wide scan has seen so far.
#[derive(Clone, Copy)]
enum Scan<'a> {
    Nothing,
    TooShortSeen,
    Literal(&'a DocumentRef, &'a str),
}

fn match_unscoped(corpus: &Corpus, needle: &Needle<'_>, config: &MatchConfig) -> MatchVerdict {
    let part = needle.part;
    let pattern = LiteralPattern::new(&needle.normalized);
    let mut scan = Scan::Nothing;
    for (reference, text, chars) in corpus.iter() {
        if chars <= config.unreadable_threshold {
            scan = Scan::TooShortSeen;
            continue;
        }
        if pattern.is_match(text) {
            scan = Scan::Literal(reference, text);
            break;
        }
    }

    match scan {
        Scan::Literal(reference, text) => MatchVerdict::exact(part, pattern.similars(text), reference.clone()),
        Scan::TooShortSeen | Scan::Nothing => {
            let refs = corpus.references().map(DocumentRef::as_str);
            if let Some(hit) = closest_match_ignore_case(&needle.normalized, refs, config.fuzzy_cutoff) {
                return MatchVerdict::fuzzy(part, hit.to_string(), DocumentRef::from(hit));
            }
            if matches!(scan, Scan::TooShortSeen) {
                MatchVerdict::unreadable(part)
            } else {
                MatchVerdict::not_found(part)
            }
        }
    }
}
