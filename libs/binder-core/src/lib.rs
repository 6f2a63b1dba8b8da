//! Core library of the binder viewer.
//!
//! Provides:
//! - Binder specification parser (line classifier, directives, data-line grammar)
//! - Cache gate keyed by a content hash of the binder file
//! - Resolution seam and assembly of the pre-layout face sequence
//! - Pair-key builder and the face pairing / layout engine
//! - Pagination over the final face order

pub mod cache;
pub mod directives;
pub mod error;
pub mod grammar;
pub mod images;
pub mod layout;
pub mod pagination;
pub mod pairing;
pub mod parser;
pub mod resolve;
pub mod types;

pub use cache::{file_hash, BinderCache};
pub use error::{CacheError, Result};
pub use images::{FaceImages, FaceUrls};
pub use layout::{arrange, order_faces, plan_faces, LayoutOptions, Placement};
pub use pagination::Pagination;
pub use pairing::PairKeyMap;
pub use parser::{parse_binder, parse_lines, ParseOutcome, ParsedBinder};
pub use resolve::{assemble_entries, resolve_all, Resolution, Resolver};
pub use types::{
    BinderDirectives, BinderSettings, CardEntry, FetchRequest, LayoutMode, ParsedSpec,
    VariantPairHint,
};
