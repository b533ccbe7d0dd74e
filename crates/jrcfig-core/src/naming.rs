//! Output file naming for extracted images and page renders.

use std::collections::HashMap;

use crate::catalog::FigureCatalog;

/// Assigns file stems to extracted images and page renders.
///
/// Holds the per-page overflow counters used when a page has more images
/// than known figure numbers; a namer lives for a single run.
pub struct FigureNamer<'a> {
    catalog: &'a FigureCatalog,
    prefix: String,
    overflow: HashMap<usize, usize>,
}

impl<'a> FigureNamer<'a> {
    /// Create a namer over a catalog with the given file prefix (e.g. `jrc`).
    pub fn new(catalog: &'a FigureCatalog, prefix: impl Into<String>) -> Self {
        Self {
            catalog,
            prefix: prefix.into(),
            overflow: HashMap::new(),
        }
    }

    /// Stem for an accepted placement of the `image_index`-th image on a
    /// zero-based page.
    pub fn image_name(&mut self, page: usize, image_index: usize) -> String {
        let figures = self.catalog.figures_on(page);

        match figures.get(image_index) {
            Some(figure) => format!("{}-fig-{}", self.prefix, figure),
            None => match figures.last() {
                Some(last) => {
                    let counter = self.overflow.entry(page).or_insert(0);
                    let suffix = *counter;
                    *counter += 1;
                    format!("{}-fig-{}-{}", self.prefix, last, suffix)
                }
                None => format!("{}-p{}-img{}", self.prefix, page + 1, image_index),
            },
        }
    }

    /// Stem for the full-page render of a zero-based page.
    pub fn page_name(&self, page: usize) -> String {
        if self.catalog.table_only(page) {
            format!("{}-table-p{}", self.prefix, page + 1)
        } else {
            format!("{}-page-{}", self.prefix, page + 1)
        }
    }
}
