use std::sync::LazyLock;

use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::error::ExtractError;
use super::value::SpecValue;

static BLOCK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".br-pr-chr-item").unwrap());
static HEADING_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div > div").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".prod-title .product-clean-name").unwrap());

/// characteristic name → value, in page order
pub type Characteristics = IndexMap<String, SpecValue>;
/// section heading → characteristics, in page order
pub type Sections = IndexMap<String, Characteristics>;

/// Walk every characteristics block on the page. Best effort: a block
/// without a heading or a malformed row is skipped, never the whole page.
pub fn extract_sections(document: &Html) -> Sections {
    let mut sections = Sections::new();

    for block in document.select(&BLOCK_SEL) {
        let title = match block_heading(block) {
            Ok(t) => t,
            Err(e) => {
                warn!("Skipping characteristics block: {}", e);
                continue;
            }
        };

        // A repeated heading starts over but keeps its first position.
        let rows = sections.entry(title.clone()).or_default();
        rows.clear();

        for row in block.select(&ROW_SEL) {
            match parse_row(row) {
                Ok((label, value)) => {
                    rows.insert(label, value);
                }
                Err(ExtractError::TooFewCells(_)) => {}
                Err(e) => debug!("Skipping row in '{}': {}", title, e),
            }
        }
    }

    sections
}

/// Product title shown above the gallery, or "" when the page has none.
pub fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE_SEL)
        .next()
        .map(strip_text)
        .unwrap_or_default()
}

fn block_heading(block: ElementRef) -> Result<String, ExtractError> {
    block
        .select(&HEADING_SEL)
        .next()
        .map(strip_text)
        .ok_or(ExtractError::NoHeading)
}

fn parse_row(row: ElementRef) -> Result<(String, SpecValue), ExtractError> {
    let spans: Vec<ElementRef> = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "span")
        .collect();
    if spans.len() < 2 {
        return Err(ExtractError::TooFewCells(spans.len()));
    }

    let label = strip_text(spans[0]);
    let value = cell_value(spans[1]).ok_or_else(|| ExtractError::EmptyValue(label.clone()))?;
    Ok((label, value))
}

/// Links win over text: anchor texts when any `<a>` is present, otherwise
/// the comma-separated parts of the cell text.
fn cell_value(cell: ElementRef) -> Option<SpecValue> {
    let links: Vec<String> = cell.select(&LINK_SEL).map(strip_text).collect();
    if !links.is_empty() {
        return SpecValue::from_parts(links);
    }

    let raw = joined_text(cell, " ").replace('\u{a0}', " ");
    let parts = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    SpecValue::from_parts(parts)
}

/// Every text node trimmed, empties dropped, concatenated.
fn strip_text(el: ElementRef) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

fn joined_text(el: ElementRef, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}
