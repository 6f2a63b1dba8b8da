//! Binder specification parser.
//!
//! # Format
//! ```text
//! # comments and blank lines are skipped
//! **4x3
//! =NEO
//! 1-12
//! 12+JP
//! Lightning Bolt;2XM;117
//! 2;backface
//! ```
//!
//! `=SETCODE` lines set the set for the data lines that follow. Data lines
//! before the first header are ignored. Each data line is expanded by the
//! grammar in [`crate::grammar`]; no line is ever rejected.

use crate::cache::{self, BinderCache};
use crate::grammar;
use crate::images::FaceImages;
use crate::types::{CardEntry, FetchRequest, ParsedSpec, VariantPairHint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Classification of one raw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType<'a> {
    Empty,
    Comment,
    /// Body after the leading `**`.
    Directive(&'a str),
    /// Set code after the leading `=`.
    SetHeader(&'a str),
    Data(&'a str),
}

/// Drop a leading UTF-8 byte-order mark, which `trim` leaves in place.
pub fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

pub fn classify(line: &str) -> LineType<'_> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        LineType::Empty
    } else if let Some(rest) = trimmed.strip_prefix("**") {
        LineType::Directive(rest.trim())
    } else if trimmed.starts_with('#') {
        LineType::Comment
    } else if let Some(rest) = trimmed.strip_prefix('=') {
        LineType::SetHeader(rest.trim())
    } else {
        LineType::Data(trimmed)
    }
}

/// Output of a live parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedBinder {
    pub file_hash: String,
    pub specs: Vec<ParsedSpec>,
    pub fetch_requests: Vec<FetchRequest>,
    /// Spec indices covering the first two pages, fetched before the rest.
    pub initial_indices: BTreeSet<usize>,
    pub variant_hints: Vec<VariantPairHint>,
}

impl ParsedBinder {
    pub fn backface_count(&self) -> usize {
        self.specs.iter().filter(|s| s.is_backface()).count()
    }

    pub fn explicit_count(&self) -> usize {
        self.specs.iter().filter(|s| s.explicit_entry).count()
    }
}

/// Result of [`parse_binder`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The cache held a complete resolution for this exact file.
    Cached {
        file_hash: String,
        entries: Vec<CardEntry>,
    },
    Parsed(ParsedBinder),
}

impl ParseOutcome {
    pub fn file_hash(&self) -> &str {
        match self {
            Self::Cached { file_hash, .. } => file_hash,
            Self::Parsed(parsed) => &parsed.file_hash,
        }
    }
}

/// Parse a binder file, short-circuiting through the cache when possible.
///
/// Both paths leave `images` with the backface mapping registered if the
/// binder contains backface slots.
pub fn parse_binder(
    content: &str,
    slots_per_page: usize,
    cache: Option<&dyn BinderCache>,
    images: &mut FaceImages,
) -> ParseOutcome {
    let file_hash = cache::file_hash(content);

    if let Some(cache) = cache {
        if let Some(entries) = cache::check(cache, &file_hash) {
            tracing::info!(%file_hash, entries = entries.len(), "binder served from cache");
            if entries.iter().any(CardEntry::is_backface_placeholder) {
                images.register_backface();
            }
            return ParseOutcome::Cached { file_hash, entries };
        }
    }

    let parsed = parse_lines_with_hash(content, slots_per_page, file_hash);
    if parsed.specs.iter().any(ParsedSpec::is_backface) {
        images.register_backface();
    }
    ParseOutcome::Parsed(parsed)
}

/// Live parse without cache or side effects.
pub fn parse_lines(content: &str, slots_per_page: usize) -> ParsedBinder {
    parse_lines_with_hash(content, slots_per_page, cache::file_hash(content))
}

fn parse_lines_with_hash(content: &str, slots_per_page: usize, file_hash: String) -> ParsedBinder {
    let mut parser = Parser::new();

    for (idx, line) in strip_bom(content).lines().enumerate() {
        parser.process_line(line, idx + 1);
    }

    parser.finish(file_hash, slots_per_page)
}

struct Parser {
    current_set: Option<String>,
    specs: Vec<ParsedSpec>,
    fetch_requests: Vec<FetchRequest>,
    variant_hints: Vec<VariantPairHint>,
}

impl Parser {
    fn new() -> Self {
        Self {
            current_set: None,
            specs: Vec::new(),
            fetch_requests: Vec::new(),
            variant_hints: Vec::new(),
        }
    }

    fn process_line(&mut self, line: &str, line_num: usize) {
        match classify(line) {
            LineType::Empty | LineType::Comment | LineType::Directive(_) => {}
            LineType::SetHeader(code) => {
                self.current_set = (!code.is_empty()).then(|| code.to_string());
            }
            LineType::Data(text) => self.handle_data(text, line_num),
        }
    }

    fn handle_data(&mut self, text: &str, line_num: usize) {
        let Some(set_code) = self.current_set.as_deref() else {
            tracing::debug!(line = line_num, text, "data line outside any set, ignored");
            return;
        };

        let expansion = grammar::expand_line(text, set_code);
        tracing::trace!(line = line_num, rule = ?expansion.rule, specs = expansion.specs.len());

        for spec in expansion.specs {
            let spec_index = self.specs.len();
            if spec.needs_fetch() {
                self.fetch_requests.push(FetchRequest {
                    set_code: spec.set_code.clone(),
                    number: spec.number.clone(),
                    override_name: spec.override_name.clone(),
                    spec_index,
                });
            }
            self.specs.push(spec);
        }
        self.variant_hints.extend(expansion.hints);
    }

    fn finish(self, file_hash: String, slots_per_page: usize) -> ParsedBinder {
        let needed = slots_per_page.saturating_mul(2);
        let initial_indices = (0..self.specs.len().min(needed)).collect();

        ParsedBinder {
            file_hash,
            specs: self.specs,
            fetch_requests: self.fetch_requests,
            initial_indices,
            variant_hints: self.variant_hints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::MemoryCache;
    use crate::types::{BACKFACE_NUMBER, BACKFACE_SET};
    use pretty_assertions::assert_eq;

    fn numbers(parsed: &ParsedBinder) -> Vec<&str> {
        parsed.specs.iter().map(|s| s.number.as_str()).collect()
    }

    fn assert_request_accounting(parsed: &ParsedBinder) {
        assert_eq!(
            parsed.specs.len(),
            parsed.fetch_requests.len() + parsed.backface_count() + parsed.explicit_count()
        );
    }

    #[test]
    fn classify_lines() {
        assert_eq!(classify("   "), LineType::Empty);
        assert_eq!(classify("# note"), LineType::Comment);
        assert_eq!(classify("**4x4"), LineType::Directive("4x4"));
        assert_eq!(classify(" =NEO "), LineType::SetHeader("NEO"));
        assert_eq!(classify(" 1-3 "), LineType::Data("1-3"));
    }

    #[test]
    fn parse_mixed_file() {
        let content = "\
# my binder
**4x3

=NEO
1-3
12+JP
Lightning Bolt;2XM;117
2;backface
=DMU
ABC001-002;Promo";
        let parsed = parse_lines(content, 12);

        assert_eq!(
            numbers(&parsed),
            vec!["1", "2", "3", "12", "12/jp", "117", "BACK", "BACK", "ABC001", "ABC002"]
        );
        assert_eq!(parsed.fetch_requests.len(), 7);
        assert_eq!(parsed.explicit_count(), 1);
        assert_eq!(parsed.backface_count(), 2);
        assert_eq!(parsed.specs[8].set_code, "DMU");
        assert_eq!(parsed.specs[8].override_name.as_deref(), Some("Promo"));
        assert_eq!(
            parsed.variant_hints,
            vec![VariantPairHint::new("NEO", "12", "12/jp")]
        );
        assert_request_accounting(&parsed);
    }

    #[test]
    fn fetch_requests_point_back_to_their_spec() {
        let parsed = parse_lines("=NEO\n1\n1;backface\nX;NEO;5\n2-3", 12);
        for request in &parsed.fetch_requests {
            let spec = &parsed.specs[request.spec_index];
            assert_eq!(spec.number, request.number);
            assert!(spec.needs_fetch());
        }
        assert_eq!(
            parsed
                .fetch_requests
                .iter()
                .map(|r| r.spec_index)
                .collect::<Vec<_>>(),
            vec![0, 3, 4]
        );
        assert_request_accounting(&parsed);
    }

    #[test]
    fn backface_specs_are_pre_resolved() {
        let parsed = parse_lines("=NEO\n2;backface", 12);
        assert_eq!(parsed.specs.len(), 2);
        assert!(parsed.fetch_requests.is_empty());
        for spec in &parsed.specs {
            assert_eq!(spec.set_code, BACKFACE_SET);
            assert_eq!(spec.number, BACKFACE_NUMBER);
            assert!(spec.resolved.as_ref().unwrap().is_backface_placeholder());
        }
    }

    #[test]
    fn lines_without_set_are_ignored() {
        let parsed = parse_lines("1-3\n2;backface\n=NEO\n4", 12);
        assert_eq!(numbers(&parsed), vec!["4"]);
    }

    #[test]
    fn empty_set_header_clears_context() {
        let parsed = parse_lines("=NEO\n1\n=\n2", 12);
        assert_eq!(numbers(&parsed), vec!["1"]);
    }

    #[test]
    fn initial_indices_cover_two_pages() {
        let parsed = parse_lines("=NEO\n1-10", 4);
        assert_eq!(parsed.initial_indices, (0..8).collect());

        let parsed = parse_lines("=NEO\n1-3", 4);
        assert_eq!(parsed.initial_indices, (0..3).collect());
    }

    #[test]
    fn leading_bom_keeps_first_set() {
        let with_bom = parse_lines("\u{feff}=NEO\n1-3", 12);
        let plain = parse_lines("=NEO\n1-3", 12);
        assert_eq!(numbers(&with_bom), vec!["1", "2", "3"]);
        assert_eq!(with_bom.file_hash, plain.file_hash);
    }

    #[test]
    fn parse_is_deterministic() {
        let content = "=NEO\n1-5\n7+JP\n1-2||3-4\n★8-9\n1;backface";
        let first = parse_lines(content, 12);
        let second = parse_lines(content, 12);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_file() {
        let parsed = parse_lines("", 12);
        assert!(parsed.specs.is_empty());
        assert!(parsed.initial_indices.is_empty());
    }

    #[test]
    fn cache_hit_skips_parsing_and_registers_backfaces() {
        let content = "=NEO\n1\n1;backface";
        let hash = cache::file_hash(content);
        let cache = MemoryCache::default();
        let entries = vec![
            CardEntry::new("Island", "1", Some("NEO")),
            CardEntry::backface_placeholder(),
        ];
        cache.persist(&hash, &entries).unwrap();
        cache.mark_complete(&hash).unwrap();

        let mut images = FaceImages::default();
        let outcome = parse_binder(content, 12, Some(&cache), &mut images);
        assert_eq!(
            outcome,
            ParseOutcome::Cached {
                file_hash: hash,
                entries
            }
        );
        assert!(images.has_backface());
    }

    #[test]
    fn cache_and_live_paths_register_the_same_backface() {
        let content = "=NEO\n2;backface";
        let mut live_images = FaceImages::default();
        let outcome = parse_binder(content, 12, None, &mut live_images);
        let ParseOutcome::Parsed(parsed) = outcome else {
            panic!("expected live parse");
        };

        let cache = MemoryCache::default();
        let entries: Vec<CardEntry> = parsed
            .specs
            .iter()
            .filter_map(|s| s.resolved.clone())
            .collect();
        cache.persist(&parsed.file_hash, &entries).unwrap();
        cache.mark_complete(&parsed.file_hash).unwrap();

        let mut cached_images = FaceImages::default();
        let outcome = parse_binder(content, 12, Some(&cache), &mut cached_images);
        assert!(matches!(outcome, ParseOutcome::Cached { .. }));
        assert_eq!(
            live_images.lookup(BACKFACE_SET, BACKFACE_NUMBER),
            cached_images.lookup(BACKFACE_SET, BACKFACE_NUMBER)
        );
    }

    #[test]
    fn incomplete_cache_falls_back_to_live_parse() {
        let content = "=NEO\n1-2";
        let cache = MemoryCache::default();
        cache
            .persist(&cache::file_hash(content), &[CardEntry::new("Island", "1", None)])
            .unwrap();

        let mut images = FaceImages::default();
        let outcome = parse_binder(content, 12, Some(&cache), &mut images);
        let ParseOutcome::Parsed(parsed) = outcome else {
            panic!("expected live parse");
        };
        assert_eq!(numbers(&parsed), vec!["1", "2"]);
        assert!(!images.has_backface());
    }
}
