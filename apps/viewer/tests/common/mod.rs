//! Shared fixtures for viewer integration tests.

#![allow(dead_code)]

use std::io::Write;

use binder_viewer::catalog::{CatalogCard, JsonCatalog};
use binder_viewer::db::SqliteRepository;
use tempfile::NamedTempFile;

/// A binder exercising singles, a language variant pair, a backface and a
/// two-sided card.
pub const SAMPLE_BINDER: &str = "\
# sample binder
=NEO
1-3
7+JP
1;backface
=ISD
51
";

pub fn card(set: &str, number: &str, name: &str) -> CatalogCard {
    CatalogCard {
        set: set.to_string(),
        number: number.to_string(),
        name: name.to_string(),
        image_url: Some(format!("{}{}.png", set.to_lowercase(), number)),
        back_name: None,
        back_image_url: None,
    }
}

/// Catalog covering every lookup in [`SAMPLE_BINDER`].
pub fn sample_catalog() -> JsonCatalog {
    let mut delver = card("ISD", "51", "Delver of Secrets");
    delver.back_name = Some("Insectile Aberration".to_string());
    delver.back_image_url = Some("isd51b.png".to_string());

    JsonCatalog::from_cards(vec![
        card("NEO", "1", "Alpha"),
        card("NEO", "2", "Beta"),
        card("NEO", "3", "Gamma"),
        card("NEO", "7", "Dragon"),
        delver,
    ])
}

pub fn repository() -> SqliteRepository {
    SqliteRepository::open_in_memory().expect("Failed to open in-memory cache")
}

/// Write `content` to a temporary binder file kept alive by the handle.
pub fn binder_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write binder file");
    file
}

pub fn names(faces: &[binder_core::CardEntry]) -> Vec<&str> {
    faces.iter().map(|f| f.name.as_str()).collect()
}
