//! Data-line grammar.
//!
//! Rules are tried in declaration order and the first one that produces an
//! expansion wins. A rule that matches syntactically but cannot expand (a
//! descending range, mismatched paired lengths) declines, and the cascade
//! continues. When nothing matches, the token is used literally.
//!
//! | Rule            | Example            | Numbers                        |
//! |-----------------|--------------------|--------------------------------|
//! | backface        | `2;backface`       | two `BACK` placeholders        |
//! | explicit        | `Bolt;2XM;117`     | `117`, no lookup               |
//! | prefix range    | `PR 5-7`           | `PR5 PR6 PR7`                  |
//! | paired ranges   | `296-297&&361-362` | `296` shown as `296(361)`, ... |
//! | attached prefix | `ABC001-003`       | `ABC001 ABC002 ABC003`         |
//! | spaced prefix   | `A1 01-02`         | `A101 A102`                    |
//! | suffix range    | `1-3a`             | `1a 2a 3a`                     |
//! | suffixed        | `12a`              | `12a`                          |
//! | star            | `★8-9`             | `8★ 9★`                        |
//! | interleave      | `1-2\|\|3-4`       | `1 3 2 4`                      |
//! | language range  | `01-02+JP`         | `01 01/jp 02 02/jp`            |
//! | plain range     | `01-03`            | `01 02 03`                     |
//! | base variant    | `12+JP`            | `12 12/jp`                     |

use crate::types::{ParsedSpec, VariantPairHint};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const STAR: char = '★';

static BACKFACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d+)\s*;\s*backface$").unwrap());
static PREFIX_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)\s+(\d+)(?:-(\d+))?$").unwrap());
static PAIRED_RANGES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:-(\d+))?\s*&&\s*(\d+)(?:-(\d+))?$").unwrap());
static ATTACHED_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9]*[A-Za-z])(\d+)(?:-([A-Za-z0-9]*[A-Za-z])?(\d+))?$").unwrap()
});
static SPACED_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9]*[A-Za-z][A-Za-z0-9]*)\s+(\d+)(?:-(\d+))?$").unwrap()
});
static SUFFIX_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)-(\d+)([A-Za-z]+)$").unwrap());
static SUFFIXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)([A-Za-z]+)$").unwrap());
static STAR_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^★(\d+)(?:-(\d+))?$").unwrap());
static LANGUAGE_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)-(\d+)\+([A-Za-z]+)$").unwrap());
static PLAIN_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)-(\d+)$").unwrap());
static BASE_VARIANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9★]+)\+([A-Za-z0-9]+)$").unwrap());

/// Separators accepted between interleaved segments.
const INTERLEAVE_SEPARATORS: [&str; 2] = ["||", "‖"];

/// Grammar rules in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Backface,
    Explicit,
    PrefixRange,
    PairedRanges,
    AttachedPrefix,
    SpacedPrefix,
    SuffixRange,
    Suffixed,
    Star,
    Interleave,
    LanguageRange,
    PlainRange,
    BaseVariant,
    Literal,
}

const RULES: &[Rule] = &[
    Rule::Backface,
    Rule::Explicit,
    Rule::PrefixRange,
    Rule::PairedRanges,
    Rule::AttachedPrefix,
    Rule::SpacedPrefix,
    Rule::SuffixRange,
    Rule::Suffixed,
    Rule::Star,
    Rule::Interleave,
    Rule::LanguageRange,
    Rule::PlainRange,
    Rule::BaseVariant,
];

/// Rules that may appear inside an interleaved segment. They only produce
/// plain numbers.
const SEGMENT_RULES: &[Rule] = &[
    Rule::PrefixRange,
    Rule::AttachedPrefix,
    Rule::SpacedPrefix,
    Rule::SuffixRange,
    Rule::Suffixed,
    Rule::Star,
    Rule::PlainRange,
];

/// Specs and pairing hints produced by one data line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineExpansion {
    pub rule: Rule,
    pub specs: Vec<ParsedSpec>,
    pub hints: Vec<VariantPairHint>,
}

/// One trimmed data line under an active set.
struct DataLine<'a> {
    raw: &'a str,
    /// `raw` with any `;name` override removed.
    token: &'a str,
    override_name: Option<&'a str>,
    set_code: &'a str,
}

impl<'a> DataLine<'a> {
    fn new(raw: &'a str, set_code: &'a str) -> Self {
        let (token, override_name) = match raw.split_once(';') {
            Some((token, name)) => {
                let name = name.trim();
                (token.trim(), (!name.is_empty()).then_some(name))
            }
            None => (raw, None),
        };
        Self {
            raw,
            token,
            override_name,
            set_code,
        }
    }

    fn spec(&self, number: impl Into<String>) -> ParsedSpec {
        ParsedSpec::lookup(self.set_code, number, self.override_name)
    }

    fn specs(&self, numbers: Vec<String>) -> Vec<ParsedSpec> {
        numbers.into_iter().map(|n| self.spec(n)).collect()
    }
}

/// Expand one data line under `set_code`.
pub fn expand_line(raw: &str, set_code: &str) -> LineExpansion {
    let line = DataLine::new(raw.trim(), set_code);

    for rule in RULES {
        if let Some(expansion) = rule.apply(&line) {
            return expansion;
        }
    }

    tracing::debug!(token = line.token, "no grammar rule matched, using literal");
    LineExpansion {
        rule: Rule::Literal,
        specs: vec![line.spec(line.token)],
        hints: Vec::new(),
    }
}

impl Rule {
    fn apply(self, line: &DataLine<'_>) -> Option<LineExpansion> {
        match self {
            Self::Backface => backface(line),
            Self::Explicit => explicit(line),
            Self::PairedRanges => paired_ranges(line),
            Self::Interleave => interleave(line),
            Self::LanguageRange => language_range(line),
            Self::BaseVariant => base_variant(line),
            Self::Literal => None,
            _ => {
                let numbers = self.numbers(line.token)?;
                Some(self.expansion(line.specs(numbers), Vec::new()))
            }
        }
    }

    fn expansion(self, specs: Vec<ParsedSpec>, hints: Vec<VariantPairHint>) -> LineExpansion {
        LineExpansion {
            rule: self,
            specs,
            hints,
        }
    }

    /// Number-only rules, shared by whole lines and interleaved segments.
    fn numbers(self, token: &str) -> Option<Vec<String>> {
        match self {
            Self::PrefixRange => {
                let caps = PREFIX_RANGE.captures(token)?;
                let (start, end) = bounds(&caps, 2, 3);
                let values = numeric_range(start, end, Padding::None)?;
                Some(prefixed(&caps[1], values))
            }
            Self::AttachedPrefix => {
                let caps = ATTACHED_PREFIX.captures(token)?;
                let prefix = &caps[1];
                if let Some(end_prefix) = caps.get(3) {
                    if !end_prefix.as_str().eq_ignore_ascii_case(prefix) {
                        return None;
                    }
                }
                let (start, end) = bounds(&caps, 2, 4);
                let values = numeric_range(start, end, Padding::Width(start.len()))?;
                Some(prefixed(prefix, values))
            }
            Self::SpacedPrefix => {
                let caps = SPACED_PREFIX.captures(token)?;
                let (start, end) = bounds(&caps, 2, 3);
                let values = numeric_range(start, end, Padding::Width(start.len()))?;
                Some(prefixed(&caps[1], values))
            }
            Self::SuffixRange => {
                let caps = SUFFIX_RANGE.captures(token)?;
                let suffix = &caps[3];
                let values = numeric_range(&caps[1], &caps[2], Padding::Width(caps[1].len()))?;
                Some(values.into_iter().map(|v| format!("{v}{suffix}")).collect())
            }
            Self::Suffixed => {
                SUFFIXED.is_match(token).then(|| vec![token.to_string()])
            }
            Self::Star => {
                let caps = STAR_NUMBER.captures(token)?;
                let (start, end) = bounds(&caps, 1, 2);
                let values = numeric_range(start, end, Padding::Width(start.len()))?;
                Some(values.into_iter().map(|v| format!("{v}{STAR}")).collect())
            }
            Self::PlainRange => {
                let caps = PLAIN_RANGE.captures(token)?;
                plain_range(&caps[1], &caps[2])
            }
            _ => None,
        }
    }
}

fn backface(line: &DataLine<'_>) -> Option<LineExpansion> {
    let caps = BACKFACE.captures(line.raw)?;
    let count: usize = caps[1].parse().ok()?;
    let specs = (0..count).map(|_| ParsedSpec::backface()).collect();
    Some(Rule::Backface.expansion(specs, Vec::new()))
}

/// `Name;SET;Number` with a numeric third field.
fn explicit(line: &DataLine<'_>) -> Option<LineExpansion> {
    let fields: Vec<&str> = line.raw.split(';').map(str::trim).collect();
    if fields.len() < 3 {
        return None;
    }
    let (name, set_code, number) = (fields[0], fields[1], fields[2]);
    if name.is_empty() || set_code.is_empty() || !is_digits(number) {
        return None;
    }
    let spec = ParsedSpec::explicit(name, set_code, number);
    Some(Rule::Explicit.expansion(vec![spec], Vec::new()))
}

/// `296-297&&361-362`: primary numbers shown with their secondary in parentheses.
fn paired_ranges(line: &DataLine<'_>) -> Option<LineExpansion> {
    let caps = PAIRED_RANGES.captures(line.token)?;
    let (p_start, p_end) = bounds(&caps, 1, 2);
    let (s_start, s_end) = bounds(&caps, 3, 4);
    let primary = plain_range(p_start, p_end)?;
    let secondary = plain_range(s_start, s_end)?;
    if primary.len() != secondary.len() {
        return None;
    }

    let mut specs = Vec::with_capacity(primary.len());
    let mut hints = Vec::with_capacity(primary.len());
    for (p, s) in primary.into_iter().zip(secondary) {
        let mut spec = line.spec(p.clone());
        spec.number_display_override = Some(format!("{p}({s})"));
        hints.push(VariantPairHint::new(line.set_code, &p, &s));
        specs.push(spec);
    }
    Some(Rule::PairedRanges.expansion(specs, hints))
}

/// Round-robin over `||`-separated segments.
fn interleave(line: &DataLine<'_>) -> Option<LineExpansion> {
    let separator = INTERLEAVE_SEPARATORS
        .iter()
        .find(|sep| line.token.contains(*sep))?;

    let segments: Vec<Vec<String>> = line
        .token
        .split(separator)
        .map(str::trim)
        .filter(|seg| !seg.is_empty())
        .map(expand_segment)
        .collect();
    if segments.len() < 2 {
        return None;
    }

    let longest = segments.iter().map(Vec::len).max().unwrap_or(0);
    let mut numbers = Vec::with_capacity(segments.iter().map(Vec::len).sum());
    for i in 0..longest {
        for segment in &segments {
            if let Some(number) = segment.get(i) {
                numbers.push(number.clone());
            }
        }
    }
    Some(Rule::Interleave.expansion(line.specs(numbers), Vec::new()))
}

fn expand_segment(segment: &str) -> Vec<String> {
    SEGMENT_RULES
        .iter()
        .find_map(|rule| rule.numbers(segment))
        .unwrap_or_else(|| vec![segment.to_string()])
}

/// `01-02+JP`: each base number followed by its language variant.
fn language_range(line: &DataLine<'_>) -> Option<LineExpansion> {
    let caps = LANGUAGE_RANGE.captures(line.token)?;
    let lang = &caps[3];
    let bases = plain_range(&caps[1], &caps[2])?;

    let mut specs = Vec::with_capacity(bases.len() * 2);
    let mut hints = Vec::with_capacity(bases.len());
    for base in bases {
        let variant = variant_number(&base, lang);
        let mut variant_spec = line.spec(variant.clone());
        variant_spec.number_display_override = Some(format!("{base} ({lang})"));
        hints.push(VariantPairHint::new(line.set_code, &base, &variant));
        specs.push(line.spec(base));
        specs.push(variant_spec);
    }
    Some(Rule::LanguageRange.expansion(specs, hints))
}

/// `12+JP`: one base and one variant.
fn base_variant(line: &DataLine<'_>) -> Option<LineExpansion> {
    let caps = BASE_VARIANT.captures(line.token)?;
    let base = &caps[1];
    let variant = variant_number(base, &caps[2]);
    let hints = vec![VariantPairHint::new(line.set_code, base, &variant)];
    let specs = vec![line.spec(base), line.spec(variant)];
    Some(Rule::BaseVariant.expansion(specs, hints))
}

fn variant_number(base: &str, segment: &str) -> String {
    format!("{base}/{}", segment.to_lowercase())
}

#[derive(Debug, Clone, Copy)]
enum Padding {
    None,
    Width(usize),
}

/// Inclusive numeric range. Declines when the bounds are descending or do
/// not fit in a `u32`.
fn numeric_range(start: &str, end: &str, padding: Padding) -> Option<Vec<String>> {
    let first: u32 = start.parse().ok()?;
    let last: u32 = end.parse().ok()?;
    if first > last {
        return None;
    }
    Some(
        (first..=last)
            .map(|n| match padding {
                Padding::None => n.to_string(),
                Padding::Width(width) => format!("{n:0width$}"),
            })
            .collect(),
    )
}

/// Padded only when both ends share a width and the start has a leading zero.
fn plain_range(start: &str, end: &str) -> Option<Vec<String>> {
    let padding = if start.len() == end.len() && start.len() > 1 && start.starts_with('0') {
        Padding::Width(start.len())
    } else {
        Padding::None
    };
    numeric_range(start, end, padding)
}

/// Start and end captures; a missing end means a single value.
fn bounds<'t>(caps: &Captures<'t>, start: usize, end: usize) -> (&'t str, &'t str) {
    let first = caps.get(start).map_or("", |m| m.as_str());
    let last = caps.get(end).map_or(first, |m| m.as_str());
    (first, last)
}

fn prefixed(prefix: &str, values: Vec<String>) -> Vec<String> {
    values.into_iter().map(|v| format!("{prefix}{v}")).collect()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
