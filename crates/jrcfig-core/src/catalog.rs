//! Curated figure and table locations for JRC141259.
//!
//! Page indices are zero-based PDF page positions, transcribed by hand from
//! the report's list of figures and list of tables.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Zero-based page index -> figure numbers drawn on that page.
pub const JRC141259_FIGURES: &[(usize, &[u32])] = &[
    (12, &[1]),
    (14, &[2]),
    (16, &[3]),
    (20, &[4]),
    (21, &[5, 6, 7]),
    (22, &[8, 9]),
    (23, &[10]),
    (25, &[11]),
    (26, &[12]),
    (27, &[13, 14]),
    (28, &[15, 16]),
    (29, &[17]),
    (30, &[18]),
    (32, &[19]),
    (37, &[20, 21]),
    (39, &[22]),
    (40, &[23]),
    (41, &[24]),
    (42, &[25]),
    (46, &[26]),
    (48, &[27]),
    (49, &[28]),
    (56, &[29, 30]),
    (58, &[31]),
    (59, &[32]),
    (61, &[33]),
    (62, &[34]),
    (63, &[35]),
    // annex
    (91, &[36]),
    (93, &[37]),
    (94, &[38]),
    (95, &[39]),
    (98, &[40]),
];

/// Zero-based pages holding tables 1 to 7.
pub const JRC141259_TABLES: &[usize] = &[13, 15, 17, 43, 44, 54, 99];

/// Lookup tables used to name extracted images and to choose which pages
/// get a full-page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureCatalog {
    /// Figure numbers per zero-based page index.
    pub figures: BTreeMap<usize, Vec<u32>>,

    /// Zero-based page indices containing tables.
    pub tables: BTreeSet<usize>,
}

impl FigureCatalog {
    /// The built-in catalog for JRC141259_01.pdf.
    pub fn jrc141259() -> Self {
        Self {
            figures: JRC141259_FIGURES
                .iter()
                .map(|(page, figs)| (*page, figs.to_vec()))
                .collect(),
            tables: JRC141259_TABLES.iter().copied().collect(),
        }
    }

    /// Figure numbers on a page, empty if none are known.
    pub fn figures_on(&self, page: usize) -> &[u32] {
        self.figures.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_figure_page(&self, page: usize) -> bool {
        self.figures.contains_key(&page)
    }

    pub fn is_table_page(&self, page: usize) -> bool {
        self.tables.contains(&page)
    }

    /// True for a table page that carries no known figure.
    pub fn table_only(&self, page: usize) -> bool {
        self.is_table_page(page) && !self.is_figure_page(page)
    }

    /// Pages that get a full-page render, ascending.
    pub fn render_pages(&self) -> Vec<usize> {
        let pages: BTreeSet<usize> = self
            .figures
            .keys()
            .copied()
            .chain(self.tables.iter().copied())
            .collect();
        pages.into_iter().collect()
    }

    pub fn figure_count(&self) -> usize {
        self.figures.values().map(Vec::len).sum()
    }
}

impl Default for FigureCatalog {
    fn default() -> Self {
        Self::jrc141259()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = FigureCatalog::jrc141259();
        assert_eq!(catalog.figures.len(), 33);
        assert_eq!(catalog.figure_count(), 40);
        assert_eq!(catalog.figures_on(21), &[5, 6, 7]);
        assert_eq!(catalog.figures_on(98), &[40]);
        assert!(catalog.figures_on(13).is_empty());
        assert_eq!(catalog.tables.len(), 7);
    }

    #[test]
    fn test_render_pages_sorted_union() {
        let catalog = FigureCatalog::jrc141259();
        let pages = catalog.render_pages();
        assert_eq!(pages.len(), 40);
        assert_eq!(&pages[..5], &[12, 13, 14, 15, 16]);
        assert_eq!(pages.last(), Some(&99));
        assert!(pages.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_table_only_excludes_figure_pages() {
        let mut catalog = FigureCatalog::jrc141259();
        assert!(catalog.table_only(43));
        assert!(!catalog.table_only(12));

        catalog.tables.insert(12);
        assert!(catalog.is_table_page(12));
        assert!(!catalog.table_only(12));
        // shared pages are listed once
        assert_eq!(catalog.render_pages().iter().filter(|&&p| p == 12).count(), 1);
    }

    #[test]
    fn test_catalog_json_keys() {
        let json = r#"{"figures": {"3": [7, 8]}, "tables": [1]}"#;
        let catalog: FigureCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.figures_on(3), &[7, 8]);
        assert_eq!(catalog.render_pages(), vec![1, 3]);
    }
}
