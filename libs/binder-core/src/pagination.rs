//! Page and binder arithmetic over the ordered face sequence.

use crate::types::BinderSettings;

/// Page geometry for one binder load. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub slots_per_page: usize,
    pub columns_per_page: usize,
    pub pages_per_binder: usize,
}

impl Pagination {
    pub fn from_settings(settings: &BinderSettings) -> Self {
        Self {
            slots_per_page: settings.layout_mode.slots_per_page(),
            columns_per_page: settings.layout_mode.columns(),
            pages_per_binder: settings.pages_per_binder.max(1) as usize,
        }
    }

    /// Number of pages needed for `faces`; an empty binder still has one page.
    pub fn page_count(&self, faces: usize) -> usize {
        faces.div_ceil(self.slots_per_page.max(1)).max(1)
    }

    /// Global face index of `column` (slot within the page) on `page`.
    pub fn face_index(&self, page: usize, column: usize) -> usize {
        page.saturating_sub(1) * self.slots_per_page + column
    }

    /// Faces shown on `page`. Out-of-range pages are empty.
    pub fn page<'a, T>(&self, faces: &'a [T], page: usize) -> &'a [T] {
        let start = self.face_index(page, 0).min(faces.len());
        let end = (start + self.slots_per_page).min(faces.len());
        &faces[start..end]
    }

    /// Faces on `page` split into grid rows.
    pub fn rows<'a, T>(&self, faces: &'a [T], page: usize) -> Vec<&'a [T]> {
        self.page(faces, page)
            .chunks(self.columns_per_page.max(1))
            .collect()
    }

    /// 1-based binder number holding `page`.
    pub fn binder_of(&self, page: usize) -> usize {
        page.saturating_sub(1) / self.pages_per_binder + 1
    }
}
