//! Face image registry consulted by the renderer.

use crate::types::{BACKFACE_NUMBER, BACKFACE_SET};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Image used for backface placeholders when none is configured.
pub const DEFAULT_CARD_BACK_URL: &str = "card-back.png";

/// Front and back image of one printed card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceUrls {
    pub front: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
}

/// Maps `(set, number)` to face images.
#[derive(Debug, Clone)]
pub struct FaceImages {
    card_back_url: String,
    faces: HashMap<(String, String), FaceUrls>,
}

impl Default for FaceImages {
    fn default() -> Self {
        Self::new(DEFAULT_CARD_BACK_URL)
    }
}

impl FaceImages {
    pub fn new(card_back_url: &str) -> Self {
        Self {
            card_back_url: card_back_url.to_string(),
            faces: HashMap::new(),
        }
    }

    pub fn register(&mut self, set: &str, number: &str, urls: FaceUrls) {
        self.faces
            .insert((set.to_ascii_lowercase(), number.to_string()), urls);
    }

    /// Map the backface placeholder slot to the card-back image on both sides.
    pub fn register_backface(&mut self) {
        let urls = FaceUrls {
            front: self.card_back_url.clone(),
            back: Some(self.card_back_url.clone()),
        };
        self.register(BACKFACE_SET, BACKFACE_NUMBER, urls);
    }

    pub fn lookup(&self, set: &str, number: &str) -> Option<&FaceUrls> {
        self.faces
            .get(&(set.to_ascii_lowercase(), number.to_string()))
    }

    pub fn has_backface(&self) -> bool {
        self.lookup(BACKFACE_SET, BACKFACE_NUMBER).is_some()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}
