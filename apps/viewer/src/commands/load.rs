//! Load orchestration: directives, cache gate, parse, resolve, pair, lay out.

use crate::error::LoadError;
use binder_core::parser::{self, ParseOutcome};
use binder_core::{
    assemble_entries, directives, layout, resolve_all, BinderCache, BinderSettings, CardEntry,
    FaceImages, FaceUrls, LayoutOptions, PairKeyMap, Pagination, Resolver,
};
use std::fs;
use std::path::Path;

/// A binder ready for display.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoadedBinder {
    pub file_hash: String,
    pub settings: BinderSettings,
    /// Faces in final display order.
    pub faces: Vec<CardEntry>,
    pub from_cache: bool,
}

impl LoadedBinder {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_settings(&self.settings)
    }

    pub fn page_count(&self) -> usize {
        self.pagination().page_count(self.faces.len())
    }
}

/// Read and load the binder file at `path`.
pub fn load_binder(
    path: &Path,
    defaults: &BinderSettings,
    cache: Option<&dyn BinderCache>,
    resolver: &mut dyn Resolver,
    images: &mut FaceImages,
) -> Result<LoadedBinder, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "loading binder");
    Ok(load_content(&content, defaults, cache, resolver, images))
}

/// Load a binder from its text. Cache failures never fail the load.
pub fn load_content(
    content: &str,
    defaults: &BinderSettings,
    cache: Option<&dyn BinderCache>,
    resolver: &mut dyn Resolver,
    images: &mut FaceImages,
) -> LoadedBinder {
    let settings = BinderSettings::merge(defaults, &directives::scan(content));
    let slots_per_page = settings.layout_mode.slots_per_page();

    let (file_hash, entries, keys, from_cache) =
        match parser::parse_binder(content, slots_per_page, cache, images) {
            ParseOutcome::Cached { file_hash, entries } => {
                let keys = PairKeyMap::from_stamped(&entries);
                (file_hash, entries, keys, true)
            }
            ParseOutcome::Parsed(mut parsed) => {
                tracing::info!(
                    specs = parsed.specs.len(),
                    requests = parsed.fetch_requests.len(),
                    initial = parsed.initial_indices.len(),
                    "binder parsed"
                );
                let backs = resolve_all(resolver, &mut parsed, &mut |done, total| {
                    tracing::debug!(done, total, "resolving");
                });
                let mut entries = assemble_entries(&parsed.specs, &backs);
                let keys = PairKeyMap::build(&entries, &parsed.variant_hints);
                keys.stamp(&mut entries);

                if let Some(cache) = cache {
                    store(cache, &parsed.file_hash, &entries);
                }
                (parsed.file_hash, entries, keys, false)
            }
        };

    register_images(images, &entries);
    let faces = layout::arrange(entries, &keys, &LayoutOptions::from_settings(&settings));

    if settings.debug {
        for (idx, face) in faces.iter().enumerate() {
            tracing::info!(
                idx,
                name = %face.name,
                number = %face.number,
                back = face.is_back_face,
                pair_key = face.pair_key.as_deref().unwrap_or(""),
                "face"
            );
        }
    }
    tracing::info!(%file_hash, faces = faces.len(), from_cache, "binder loaded");

    LoadedBinder {
        file_hash,
        settings,
        faces,
        from_cache,
    }
}

/// Persist the entries, but only mark them complete when every lookup
/// resolved, so unresolved placeholders are retried on the next load.
fn store(cache: &dyn BinderCache, file_hash: &str, entries: &[CardEntry]) {
    let unresolved = entries.iter().filter(|e| e.unresolved).count();
    let result = cache.persist(file_hash, entries).and_then(|()| {
        if unresolved == 0 {
            cache.mark_complete(file_hash)
        } else {
            tracing::info!(file_hash, unresolved, "binder left incomplete in cache");
            Ok(())
        }
    });
    if let Err(e) = result {
        tracing::warn!(file_hash, error = %e, "failed to cache resolved binder");
    }
}

/// Record front/back image URLs of resolved faces. Backs follow their front.
fn register_images(images: &mut FaceImages, entries: &[CardEntry]) {
    for (idx, entry) in entries.iter().enumerate() {
        if entry.is_back_face || entry.is_backface_placeholder() {
            continue;
        }
        let (Some(set), Some(front)) = (&entry.set, &entry.image_url) else {
            continue;
        };
        let back = entries
            .get(idx + 1)
            .filter(|next| next.is_back_of(entry))
            .and_then(|next| next.image_url.clone());
        images.register(
            set,
            &entry.number,
            FaceUrls {
                front: front.clone(),
                back,
            },
        );
    }
}
