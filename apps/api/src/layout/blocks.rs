//! Layout block model — the document IR handed to the external renderer.
//!
//! The assembler produces an ordered sequence of these blocks plus
//! page-decoration rules; the renderer owns pagination, text measurement, and
//! font embedding. Only `PageBreak` forces a break — everything else flows.
//!
//! The whole model is serde-serializable: the serialized `Document` is the
//! wire contract with the renderer service.

use serde::Serialize;

/// A fully assembled document: content blocks in display order plus
/// page-decoration rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub content: Vec<Block>,
    pub decor: PageDecor,
}

/// One layout block. Variants mirror the visual vocabulary of the proposal
/// document; the renderer maps each onto its own primitives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Full-page cover. Always followed by a forced page break.
    Cover {
        bureau_naam: String,
        bureau_tagline: String,
        projectnaam: String,
        /// Label → display value rows (number, dates, client, contact).
        details: Vec<LabeledValue>,
    },
    /// Numbered section heading, `1.` through `10.`.
    SectionTitle { number: u8, title: String },
    Paragraph { text: String, style: TextStyle },
    BulletList { items: Vec<String> },
    /// Borderless two-column label/value rows.
    LabelValueTable { rows: Vec<LabeledValue> },
    /// Ruled data table with a header row.
    Table {
        columns: Vec<Column>,
        rows: Vec<Vec<String>>,
    },
    /// Highlighted figure box (the incidence-rate callout).
    Callout {
        label: String,
        value: String,
        note: String,
    },
    /// Side-by-side stacks (agency vs. client obligations).
    TwoColumn { left: Vec<Block>, right: Vec<Block> },
    /// The cost-summary rows, rendered verbatim from supplied aggregates.
    TotalsTable { rows: Vec<TotalsRow> },
    /// Assumptions appendix — the only block that can vanish entirely.
    Assumptions { intro: String, items: Vec<String> },
    /// Thin horizontal rule between adjacent sections.
    Divider,
    PageBreak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
}

impl LabeledValue {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Body,
    BodyBold,
    /// Inline key-figure line ("Totaal aantal completes: 900").
    Lead,
    SmallNote,
}

/// A data-table column: header text, width hint, cell alignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub header: String,
    pub width: ColWidth,
    pub align: CellAlign,
}

impl Column {
    pub fn new(header: impl Into<String>, width: ColWidth, align: CellAlign) -> Self {
        Self {
            header: header.into(),
            width,
            align,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColWidth {
    /// Fixed width in points.
    Fixed(u16),
    /// Share the remaining line width.
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellAlign {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsRow {
    pub label: String,
    pub amount: String,
    pub emphasis: TotalsEmphasis,
}

impl TotalsRow {
    pub fn new(label: impl Into<String>, amount: String, emphasis: TotalsEmphasis) -> Self {
        Self {
            label: label.into(),
            amount,
            emphasis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsEmphasis {
    Normal,
    /// The excl.-tax total row.
    Strong,
    /// The incl.-tax grand-total row.
    Grand,
}

/// Page-decoration rules. Suppressed on the cover; page numbers are filled in
/// by the renderer via the `{page}` / `{pages}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDecor {
    pub header: PageBand,
    pub footer: PageBand,
}

/// One running header or footer: a left and a right cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageBand {
    pub left: String,
    pub right: String,
    pub skip_first_page: bool,
}

impl PageBand {
    /// Resolves this band for a concrete page, substituting page numbers.
    /// Returns `None` where the band is suppressed. This is the reference
    /// behavior renderers must match for the `{page}` / `{pages}` convention.
    #[allow(dead_code)]
    pub fn resolve(&self, page: usize, pages: usize) -> Option<(String, String)> {
        if self.skip_first_page && page == 1 {
            return None;
        }
        let substitute = |template: &str| {
            template
                .replace("{page}", &page.to_string())
                .replace("{pages}", &pages.to_string())
        };
        Some((substitute(&self.left), substitute(&self.right)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_is_suppressed_on_the_cover_page() {
        let band = PageBand {
            left: "Bureau".to_string(),
            right: "{page} / {pages}".to_string(),
            skip_first_page: true,
        };
        assert_eq!(band.resolve(1, 7), None);
    }

    #[test]
    fn test_band_substitutes_page_numbers() {
        let band = PageBand {
            left: "OFF-2026-042 | Vertrouwelijk".to_string(),
            right: "{page} / {pages}".to_string(),
            skip_first_page: true,
        };
        let (left, right) = band.resolve(3, 7).unwrap();
        assert_eq!(left, "OFF-2026-042 | Vertrouwelijk");
        assert_eq!(right, "3 / 7");
    }

    #[test]
    fn test_blocks_serialize_with_kind_tags() {
        let block = Block::SectionTitle {
            number: 1,
            title: "Management Summary".to_string(),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["kind"], "section_title");
        assert_eq!(value["number"], 1);

        let divider = serde_json::to_value(Block::Divider).unwrap();
        assert_eq!(divider["kind"], "divider");
    }
}
