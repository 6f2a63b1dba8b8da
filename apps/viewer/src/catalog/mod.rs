//! JSON card catalog used to resolve fetch requests offline.
//!
//! ```json
//! [
//!   { "set": "NEO", "number": "12", "name": "Sheoldred", "image_url": "..." },
//!   { "set": "ISD", "number": "51", "name": "Delver of Secrets",
//!     "back_name": "Insectile Aberration", "back_image_url": "..." }
//! ]
//! ```

use binder_core::{CardEntry, FetchRequest, Resolution, Resolver};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One printed card as listed in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCard {
    pub set: String,
    pub number: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image_url: Option<String>,
}

/// In-memory catalog keyed by lowercased set code and exact number.
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    cards: HashMap<(String, String), CatalogCard>,
}

impl JsonCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let cards: Vec<CatalogCard> = serde_json::from_str(content)?;
        Ok(Self::from_cards(cards))
    }

    pub fn from_cards(cards: Vec<CatalogCard>) -> Self {
        let cards = cards
            .into_iter()
            .map(|card| ((card.set.to_lowercase(), card.number.clone()), card))
            .collect();
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Exact number first; `<base>/<lang>` falls back to `<base>`.
    pub fn lookup(&self, set: &str, number: &str) -> Option<&CatalogCard> {
        let set = set.to_lowercase();
        self.cards
            .get(&(set.clone(), number.to_string()))
            .or_else(|| {
                let (base, _) = number.split_once('/')?;
                self.cards.get(&(set, base.to_string()))
            })
    }

    fn resolve_request(&self, request: &FetchRequest) -> Resolution {
        let Some(card) = self.lookup(&request.set_code, &request.number) else {
            return Resolution::missing(request.spec_index);
        };

        // Entries keep the requested number so variant hints can find them.
        let set = Some(request.set_code.as_str());
        let (mut entry, back) = match &card.back_name {
            Some(back_name) => {
                let mut front = CardEntry::two_sided(&card.name, back_name, &request.number, set);
                front.image_url = card.image_url.clone();
                let mut back = CardEntry::back_of(&front);
                back.image_url = card.back_image_url.clone();
                (front, Some(back))
            }
            None => {
                let mut entry = CardEntry::new(&card.name, &request.number, set);
                entry.image_url = card.image_url.clone();
                (entry, None)
            }
        };

        if let Some(name) = &request.override_name {
            entry.name = name.clone();
        }

        Resolution {
            spec_index: request.spec_index,
            entry: Some(entry),
            back,
        }
    }
}

impl Resolver for JsonCatalog {
    fn resolve(
        &mut self,
        requests: &[FetchRequest],
        targets: &BTreeSet<usize>,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Vec<Resolution> {
        let selected: Vec<&FetchRequest> = requests
            .iter()
            .filter(|r| targets.contains(&r.spec_index))
            .collect();
        let total = selected.len();

        selected
            .into_iter()
            .enumerate()
            .map(|(done, request)| {
                let resolution = self.resolve_request(request);
                progress(done + 1, total);
                resolution
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> JsonCatalog {
        JsonCatalog::from_json(
            r#"[
                {"set": "NEO", "number": "12", "name": "Sheoldred", "image_url": "neo12.jpg"},
                {"set": "ISD", "number": "51", "name": "Delver of Secrets",
                 "back_name": "Insectile Aberration", "image_url": "f.jpg", "back_image_url": "b.jpg"}
            ]"#,
        )
        .unwrap()
    }

    fn request(set: &str, number: &str, spec_index: usize) -> FetchRequest {
        FetchRequest {
            set_code: set.to_string(),
            number: number.to_string(),
            override_name: None,
            spec_index,
        }
    }

    #[test]
    fn lookup_falls_back_to_base_number() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("neo", "12").unwrap().name, "Sheoldred");
        assert_eq!(catalog.lookup("NEO", "12/jp").unwrap().name, "Sheoldred");
        assert!(catalog.lookup("NEO", "13").is_none());
    }

    #[test]
    fn resolves_only_targets() {
        let mut catalog = catalog();
        let requests = vec![request("NEO", "12", 0), request("NEO", "12/jp", 1), request("NEO", "99", 2)];
        let mut calls = Vec::new();
        let results = catalog.resolve(&requests, &BTreeSet::from([1, 2]), &mut |done, total| {
            calls.push((done, total))
        });

        assert_eq!(calls, vec![(1, 2), (2, 2)]);
        assert_eq!(results.len(), 2);
        let variant = results[0].entry.as_ref().unwrap();
        assert_eq!(variant.number, "12/jp");
        assert_eq!(variant.image_url.as_deref(), Some("neo12.jpg"));
        assert_eq!(results[1], Resolution::missing(2));
    }

    #[test]
    fn two_sided_cards_carry_a_back() {
        let mut catalog = catalog();
        let results = catalog.resolve(&[request("ISD", "51", 0)], &BTreeSet::from([0]), &mut |_, _| {});
        let front = results[0].entry.as_ref().unwrap();
        let back = results[0].back.as_ref().unwrap();
        assert!(front.is_modal_double_faced);
        assert!(back.is_back_of(front));
        assert_eq!(back.name, "Insectile Aberration");
        assert_eq!(back.image_url.as_deref(), Some("b.jpg"));
    }

    #[test]
    fn override_name_replaces_catalog_name() {
        let mut catalog = catalog();
        let mut req = request("NEO", "12", 0);
        req.override_name = Some("Sheoldred (promo)".into());
        let results = catalog.resolve(&[req], &BTreeSet::from([0]), &mut |_, _| {});
        assert_eq!(results[0].entry.as_ref().unwrap().name, "Sheoldred (promo)");
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(JsonCatalog::from_json("{"), Err(CatalogError::Json(_))));
    }
}
