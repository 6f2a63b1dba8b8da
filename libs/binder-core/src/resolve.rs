//! Catalog resolution seam and assembly of the pre-layout face sequence.

use crate::parser::ParsedBinder;
use crate::types::{CardEntry, FetchRequest, ParsedSpec};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of resolving one fetch request.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub spec_index: usize,
    pub entry: Option<CardEntry>,
    /// Back face synthesized for a two-sided result.
    pub back: Option<CardEntry>,
}

impl Resolution {
    pub fn missing(spec_index: usize) -> Self {
        Self {
            spec_index,
            entry: None,
            back: None,
        }
    }
}

/// Turns fetch requests into card entries.
pub trait Resolver {
    /// Resolve the requests whose `spec_index` is in `targets`.
    /// `progress(done, total)` is called after each one.
    fn resolve(
        &mut self,
        requests: &[FetchRequest],
        targets: &BTreeSet<usize>,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Vec<Resolution>;
}

/// Resolve the initial (visible) indices first, then everything else, and
/// write results back into `parsed.specs`.
///
/// Returns the back faces of two-sided results keyed by spec index.
pub fn resolve_all(
    resolver: &mut dyn Resolver,
    parsed: &mut ParsedBinder,
    progress: &mut dyn FnMut(usize, usize),
) -> BTreeMap<usize, CardEntry> {
    let all: BTreeSet<usize> = parsed.fetch_requests.iter().map(|r| r.spec_index).collect();
    let first: BTreeSet<usize> = all
        .intersection(&parsed.initial_indices)
        .copied()
        .collect();
    let rest: BTreeSet<usize> = all.difference(&first).copied().collect();

    let mut backs = BTreeMap::new();
    for targets in [first, rest] {
        if targets.is_empty() {
            continue;
        }
        for resolution in resolver.resolve(&parsed.fetch_requests, &targets, progress) {
            let Some(spec) = parsed.specs.get_mut(resolution.spec_index) else {
                tracing::warn!(spec_index = resolution.spec_index, "resolution for unknown spec");
                continue;
            };
            if !targets.contains(&resolution.spec_index) {
                continue;
            }
            spec.resolved = resolution.entry;
            if let Some(back) = resolution.back {
                backs.insert(resolution.spec_index, back);
            }
        }
    }
    backs
}

/// Build the pre-layout sequence in spec order.
///
/// Two-sided fronts are immediately followed by their back face. Unresolved
/// specs become placeholders so later slots keep their position.
pub fn assemble_entries(
    specs: &[ParsedSpec],
    backs: &BTreeMap<usize, CardEntry>,
) -> Vec<CardEntry> {
    let mut entries = Vec::with_capacity(specs.len() + backs.len());

    for (idx, spec) in specs.iter().enumerate() {
        let mut entry = match &spec.resolved {
            Some(entry) => entry.clone(),
            None => {
                tracing::warn!(set = %spec.set_code, number = %spec.number, "spec did not resolve");
                CardEntry::unresolved(spec)
            }
        };
        if let Some(display) = &spec.number_display_override {
            entry.display_number = Some(display.clone());
        }

        let back = entry.is_modal_double_faced.then(|| {
            backs
                .get(&idx)
                .cloned()
                .unwrap_or_else(|| CardEntry::back_of(&entry))
        });

        entries.push(entry);
        if let Some(mut back) = back {
            back.is_back_face = true;
            entries.push(back);
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_lines;
    use pretty_assertions::assert_eq;

    /// Resolves every number to a card named after it; `51` is two-sided and
    /// `404` is missing.
    #[derive(Default)]
    struct NumberResolver {
        calls: Vec<Vec<usize>>,
    }

    impl Resolver for NumberResolver {
        fn resolve(
            &mut self,
            requests: &[FetchRequest],
            targets: &BTreeSet<usize>,
            progress: &mut dyn FnMut(usize, usize),
        ) -> Vec<Resolution> {
            self.calls.push(targets.iter().copied().collect());
            let selected: Vec<_> = requests
                .iter()
                .filter(|r| targets.contains(&r.spec_index))
                .collect();
            let total = selected.len();
            selected
                .into_iter()
                .enumerate()
                .map(|(done, request)| {
                    progress(done + 1, total);
                    let set = Some(request.set_code.as_str());
                    match request.number.as_str() {
                        "404" => Resolution::missing(request.spec_index),
                        "51" => Resolution {
                            spec_index: request.spec_index,
                            entry: Some(CardEntry::two_sided("Delver", "Aberration", "51", set)),
                            back: None,
                        },
                        n => Resolution {
                            spec_index: request.spec_index,
                            entry: Some(CardEntry::new(&format!("Card {n}"), n, set)),
                            back: None,
                        },
                    }
                })
                .collect()
        }
    }

    #[test]
    fn resolves_initial_pages_first() {
        let mut parsed = parse_lines("=NEO\n1-5", 1);
        let mut resolver = NumberResolver::default();
        let mut ticks = 0;
        resolve_all(&mut resolver, &mut parsed, &mut |_, _| ticks += 1);

        assert_eq!(resolver.calls, vec![vec![0, 1], vec![2, 3, 4]]);
        assert_eq!(ticks, 5);
        assert!(parsed.specs.iter().all(|s| s.resolved.is_some()));
    }

    #[test]
    fn assembles_back_faces_and_placeholders() {
        let mut parsed = parse_lines("=ISD\n50-51\n404\n1;backface\nBolt;2XM;117", 12);
        let mut resolver = NumberResolver::default();
        let backs = resolve_all(&mut resolver, &mut parsed, &mut |_, _| {});
        let entries = assemble_entries(&parsed.specs, &backs);

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Card 50", "Delver // Aberration", "Aberration", "ISD #404", "Card Back", "Bolt"]
        );
        assert!(entries[2].is_back_of(&entries[1]));
        assert!(entries[3].unresolved);
        assert!(entries[4].is_backface_placeholder());
    }

    #[test]
    fn display_override_reaches_entry() {
        let mut parsed = parse_lines("=MOM\n296&&361", 12);
        let mut resolver = NumberResolver::default();
        let backs = resolve_all(&mut resolver, &mut parsed, &mut |_, _| {});
        let entries = assemble_entries(&parsed.specs, &backs);
        assert_eq!(entries[0].display_number.as_deref(), Some("296(361)"));
    }

    #[test]
    fn collaborator_back_face_is_preferred() {
        let mut front = CardEntry::two_sided("Front", "Back", "9", Some("SET"));
        front.image_url = Some("front.jpg".into());
        let mut spec = ParsedSpec::lookup("SET", "9", None);
        spec.resolved = Some(front.clone());

        let mut back = CardEntry::back_of(&front);
        back.image_url = Some("back.jpg".into());
        let backs = BTreeMap::from([(0, back.clone())]);

        let entries = assemble_entries(&[spec], &backs);
        assert_eq!(entries, vec![front, back]);
    }
}
