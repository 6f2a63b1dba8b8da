//! Plain-text rendering of binder pages.

use crate::commands::load::LoadedBinder;
use binder_core::CardEntry;

const CELL_WIDTH: usize = 28;

/// One page as a grid of fixed-width cells, one text line per row.
pub fn render_page(binder: &LoadedBinder, page: usize) -> String {
    let pages = binder.pagination();
    let mut out = format!(
        "Binder {} / page {} of {}\n",
        pages.binder_of(page),
        page,
        binder.page_count()
    );

    for row in pages.rows(&binder.faces, page) {
        let cells: Vec<String> = row.iter().map(cell).collect();
        out.push_str(cells.join(" | ").trim_end());
        out.push('\n');
    }
    out
}

/// One-line description of the load.
pub fn render_summary(binder: &LoadedBinder) -> String {
    format!(
        "{} faces, {} pages ({} layout){}",
        binder.faces.len(),
        binder.page_count(),
        binder.settings.layout_mode.as_str(),
        if binder.from_cache { ", cached" } else { "" }
    )
}

fn cell(face: &CardEntry) -> String {
    let number = face.display_number.as_deref().unwrap_or(&face.number);
    let mut text = if face.is_back_face {
        format!("{number} > {}", face.name)
    } else if face.unresolved {
        format!("{number} ? {}", face.name)
    } else {
        format!("{number} {}", face.name)
    };
    if text.chars().count() > CELL_WIDTH {
        text = text.chars().take(CELL_WIDTH - 1).collect();
        text.push('…');
    }
    format!("{text:<CELL_WIDTH$}")
}
