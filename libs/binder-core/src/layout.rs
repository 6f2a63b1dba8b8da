//! Face pairing and page layout.
//!
//! Produces the left-to-right, page-by-page order of faces. Faces that belong
//! together are kept in adjacent columns starting on an even column:
//!
//! 1. a two-sided front and its back face,
//! 2. two faces sharing a pair key,
//! 3. exactly two consecutive ordinary faces with the same name.
//!
//! When a pair would start on an odd or last column, the next free single is
//! pulled forward to fill the slot. If there is none, the pair is placed
//! straddling the boundary.

use crate::pairing::PairKeyMap;
use crate::types::{BinderSettings, CardEntry, LayoutMode, BACKFACE_NAME};

/// Inputs that shape the layout besides the faces themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    pub layout_mode: LayoutMode,
    pub slots_per_page: usize,
    pub columns_per_page: usize,
    /// Names never auto-paired by name equality.
    pub excluded_pair_names: Vec<String>,
}

impl LayoutOptions {
    pub fn from_settings(settings: &BinderSettings) -> Self {
        let mode = settings.layout_mode;
        Self {
            layout_mode: mode,
            slots_per_page: mode.slots_per_page(),
            columns_per_page: mode.columns(),
            excluded_pair_names: settings.excluded_pair_names.clone(),
        }
    }
}

/// One placement decision, by index into the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Single(usize),
    Pair(usize, usize),
}

/// Indices of `entries` in display order. Always a permutation of `0..len`.
pub fn order_faces(entries: &[CardEntry], keys: &PairKeyMap, options: &LayoutOptions) -> Vec<usize> {
    let mut order = Vec::with_capacity(entries.len());
    for placement in plan_faces(entries, keys, options) {
        match placement {
            Placement::Single(i) => order.push(i),
            Placement::Pair(a, b) => order.extend([a, b]),
        }
    }
    order
}

/// Reorder `entries` for display.
pub fn arrange(entries: Vec<CardEntry>, keys: &PairKeyMap, options: &LayoutOptions) -> Vec<CardEntry> {
    let order = order_faces(&entries, keys, options);
    let mut slots: Vec<Option<CardEntry>> = entries.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// Placement decisions in display order.
pub fn plan_faces(entries: &[CardEntry], keys: &PairKeyMap, options: &LayoutOptions) -> Vec<Placement> {
    if !options.layout_mode.pairs_faces() {
        return (0..entries.len()).map(Placement::Single).collect();
    }
    if options.slots_per_page == 0 || options.columns_per_page == 0 {
        tracing::warn!(?options, "degenerate page geometry, faces left in file order");
        return (0..entries.len()).map(Placement::Single).collect();
    }

    Sequencer::new(entries, keys, options).run()
}

/// Marks every face in a run of three or more consecutive ordinary faces with
/// the same name. Such runs are laid out as singles.
pub fn long_runs(entries: &[CardEntry]) -> Vec<bool> {
    let mut marked = vec![false; entries.len()];
    let mut start = 0;

    while start < entries.len() {
        let mut end = start + 1;
        if entries[start].is_ordinary() {
            let name = entries[start].name_key();
            while end < entries.len() && entries[end].is_ordinary() && entries[end].name_key() == name {
                end += 1;
            }
            if end - start >= 3 {
                marked[start..end].iter_mut().for_each(|m| *m = true);
            }
        }
        start = end;
    }

    marked
}

/// Greedy consumption over the input with a consumed bitset. "Next" always
/// means the next face not yet placed.
struct Sequencer<'a> {
    entries: &'a [CardEntry],
    keys: &'a PairKeyMap,
    options: &'a LayoutOptions,
    long_run: Vec<bool>,
    consumed: Vec<bool>,
    head: usize,
}

impl<'a> Sequencer<'a> {
    fn new(entries: &'a [CardEntry], keys: &'a PairKeyMap, options: &'a LayoutOptions) -> Self {
        Self {
            entries,
            keys,
            options,
            long_run: long_runs(entries),
            consumed: vec![false; entries.len()],
            head: 0,
        }
    }

    fn run(mut self) -> Vec<Placement> {
        let columns = self.options.columns_per_page;
        let mut placements = Vec::with_capacity(self.entries.len());
        let mut global_slot = 0usize;

        while let Some(first) = self.first_live() {
            let col = (global_slot % self.options.slots_per_page) % columns;

            let second = self.pair_partner(first);
            let Some(second) = second else {
                self.take(first);
                placements.push(Placement::Single(first));
                global_slot += 1;
                continue;
            };

            if col % 2 == 1 || col == columns - 1 {
                if let Some(single) = self.substitute_after(second) {
                    self.take(single);
                    placements.push(Placement::Single(single));
                    global_slot += 1;
                    continue;
                }
                tracing::debug!(first, second, col, "no single to realign, pair straddles boundary");
            }

            self.take(first);
            self.take(second);
            placements.push(Placement::Pair(first, second));
            global_slot += 2;
        }

        placements
    }

    fn take(&mut self, idx: usize) {
        self.consumed[idx] = true;
        while self.head < self.consumed.len() && self.consumed[self.head] {
            self.head += 1;
        }
    }

    fn first_live(&self) -> Option<usize> {
        (self.head < self.entries.len()).then_some(self.head)
    }

    fn next_live(&self, after: usize) -> Option<usize> {
        (after + 1..self.entries.len()).find(|&i| !self.consumed[i])
    }

    fn prev_live(&self, before: usize) -> Option<usize> {
        (self.head..before).rev().find(|&i| !self.consumed[i])
    }

    /// The face that would complete a pair started at `idx`.
    fn pair_partner(&self, idx: usize) -> Option<usize> {
        let next = self.next_live(idx)?;
        self.starts_pair(idx, next).then_some(next)
    }

    fn starts_pair(&self, idx: usize, next: usize) -> bool {
        let current = &self.entries[idx];
        let following = &self.entries[next];

        if following.is_back_of(current) {
            return true;
        }
        if self.keys.shares_key(idx, next) {
            return true;
        }
        self.is_name_pair(idx, next)
    }

    fn is_name_pair(&self, idx: usize, next: usize) -> bool {
        let current = &self.entries[idx];
        let following = &self.entries[next];

        if !current.is_ordinary() || !following.is_ordinary() {
            return false;
        }
        let name = current.name_key();
        if name != following.name_key() {
            return false;
        }
        if name == BACKFACE_NAME.to_lowercase() || self.is_excluded(&name) {
            return false;
        }
        if self.long_run[idx] || self.long_run[next] {
            return false;
        }
        match self.next_live(next) {
            Some(third) => self.entries[third].name_key() != name,
            None => true,
        }
    }

    fn is_excluded(&self, name_key: &str) -> bool {
        self.options
            .excluded_pair_names
            .iter()
            .any(|excluded| excluded.trim().to_lowercase() == name_key)
    }

    fn is_pair_second(&self, idx: usize) -> bool {
        self.prev_live(idx)
            .is_some_and(|prev| self.starts_pair(prev, idx))
    }

    /// First face after `after` that can stand alone: not a back face and not
    /// part of any pair.
    fn substitute_after(&self, after: usize) -> Option<usize> {
        let mut cursor = self.next_live(after);
        while let Some(idx) = cursor {
            let entry = &self.entries[idx];
            if !entry.is_back_face && self.pair_partner(idx).is_none() && !self.is_pair_second(idx) {
                return Some(idx);
            }
            cursor = self.next_live(idx);
        }
        None
    }
}
