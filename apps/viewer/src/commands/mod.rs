//! Viewer commands: loading a binder and rendering its pages.

pub mod load;
pub mod show;

pub use load::{load_binder, load_content, LoadedBinder};
pub use show::{render_page, render_summary};
