pub mod characteristics;
pub mod error;
pub mod fields;
pub mod jsonld;
pub mod value;

use std::fmt::Display;

use scraper::Html;
use serde::Serialize;
use tracing::warn;

use crate::db::GadgetRow;
use characteristics::Sections;
use value::SpecValue;

/// The in-memory product record, built once per page and saved once.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub full_name: Option<String>,
    pub pic_links: Option<SpecValue>,
    pub code: Option<String>,
    pub price_use: Option<String>,
    pub review_count: Option<i64>,
    pub color: Option<String>,
    pub display_size: Option<String>,
    pub resolution: Option<String>,
    pub memory_volume: Option<String>,
    pub series: Option<String>,
    pub specifications: String,
    pub price_action: Option<String>,
}

#[derive(Serialize)]
struct SpecsDocument<'a> {
    #[serde(rename = "Характеристики")]
    characteristics: SpecsBody<'a>,
}

#[derive(Serialize)]
struct SpecsBody<'a> {
    product_name: &'a str,
    sections: &'a Sections,
}

/// Three passes over one document: JSON-LD → characteristics → projection.
pub fn process_page(html: &str) -> ProductRecord {
    let document = Html::parse_document(html);

    let structured = jsonld::extract(&document);
    let title = characteristics::extract_title(&document);
    let sections = characteristics::extract_sections(&document);
    let projected = fields::project_all(&sections);

    ProductRecord {
        full_name: structured.full_name,
        pic_links: structured.pic_links,
        code: structured.code,
        price_use: structured.price_use,
        review_count: structured.review_count,
        color: projected.color,
        display_size: projected.display_size,
        resolution: projected.resolution,
        memory_volume: projected.memory_volume,
        series: projected.series,
        specifications: specifications_json(&title, &sections),
        price_action: None,
    }
}

/// Pretty JSON (two-space indent, non-ASCII verbatim) of the title and
/// sections, nested under "Характеристики".
pub fn specifications_json(title: &str, sections: &Sections) -> String {
    let doc = SpecsDocument {
        characteristics: SpecsBody {
            product_name: title,
            sections,
        },
    };
    serde_json::to_string_pretty(&doc).unwrap_or_else(|e| {
        warn!("Error serializing specifications JSON: {}", e);
        "{}".to_string()
    })
}

impl ProductRecord {
    pub fn to_row(&self) -> GadgetRow {
        GadgetRow {
            full_name: self.full_name.clone(),
            color: self.color.clone(),
            memory_volume: self.memory_volume.clone(),
            price_use: self.price_use.clone(),
            price_action: self.price_action.clone(),
            pic_links: self
                .pic_links
                .as_ref()
                .and_then(|p| serde_json::to_string(p).ok()),
            product_code: self.code.clone(),
            review_count: self.review_count,
            series: self.series.clone(),
            display_size: self.display_size.clone(),
            resolution: self.resolution.clone(),
            specifications: self.specifications.clone(),
        }
    }

    pub fn print(&self) {
        println!("full_name: {}", show(self.full_name.as_ref()));
        println!("pic_links: {}", show(self.pic_links.as_ref()));
        println!("code: {}", show(self.code.as_ref()));
        println!("price_use: {}", show(self.price_use.as_ref()));
        println!("review_count: {}", show(self.review_count.as_ref()));
        println!("color: {}", show(self.color.as_ref()));
        println!("display_size: {}", show(self.display_size.as_ref()));
        println!("resolution: {}", show(self.resolution.as_ref()));
        println!("memory_volume: {}", show(self.memory_volume.as_ref()));
        println!("series: {}", show(self.series.as_ref()));
        println!("price_action: {}", show(self.price_action.as_ref()));
        println!("specifications: {}", self.specifications);
    }
}

fn show<T: Display>(v: Option<&T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "-".into())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> ProductRecord {
        let html = std::fs::read_to_string("tests/fixtures/product.html").unwrap();
        process_page(&html)
    }

    #[test]
    fn fixture_record_fields() {
        let r = fixture();
        assert_eq!(
            r.full_name.as_deref(),
            Some("Мобільний телефон Apple iPhone 16 Pro Max 256GB Black Titanium")
        );
        assert_eq!(r.code.as_deref(), Some("U0941111"));
        assert_eq!(r.price_use.as_deref(), Some("57999"));
        assert_eq!(r.review_count, Some(12));
        assert_eq!(r.color.as_deref(), Some("Black Titanium"));
        assert_eq!(r.display_size.as_deref(), Some("6.9\""));
        assert_eq!(r.resolution.as_deref(), Some("2868x1320"));
        assert_eq!(r.memory_volume.as_deref(), Some("256 ГБ"));
        assert_eq!(r.series.as_deref(), Some("iPhone 16 Pro Max"));
        assert_eq!(r.price_action, None);
    }

    #[test]
    fn fixture_specifications_blob() {
        let r = fixture();
        let v: serde_json::Value = serde_json::from_str(&r.specifications).unwrap();
        let root = &v["Характеристики"];
        assert_eq!(root["product_name"], "Apple iPhone 16 Pro Max 256GB Black Titanium");
        assert_eq!(root["sections"]["Гарантія"], serde_json::json!({}));
        assert_eq!(
            root["sections"]["Зв'язок"]["Стандарти зв'язку"],
            serde_json::json!(["2G", "3G", "4G (LTE)", "5G"])
        );
        assert!(r.specifications.contains("\n  \"Характеристики\""));
    }

    #[test]
    fn page_without_json_ld_still_reads_characteristics() {
        let html = r#"<div class="br-pr-chr-item"><h3>Інші</h3>
            <div><div><span>Модель</span><span>Galaxy S24</span></div></div></div>"#;
        let r = process_page(html);
        assert_eq!(r.full_name, None);
        assert_eq!(r.code, None);
        assert_eq!(r.price_use, None);
        assert_eq!(r.review_count, None);
        assert_eq!(r.pic_links, None);
        assert_eq!(r.series.as_deref(), Some("Galaxy S24"));
    }

    #[test]
    fn empty_page_gives_empty_specs() {
        let r = process_page("");
        let v: serde_json::Value = serde_json::from_str(&r.specifications).unwrap();
        assert_eq!(v["Характеристики"]["product_name"], "");
        assert_eq!(v["Характеристики"]["sections"], serde_json::json!({}));
    }

    #[test]
    fn specifications_follow_page_order() {
        let specs = fixture().specifications;
        let display = specs.find("\"Дисплей\"").unwrap();
        let connectivity = specs.find("\"Зв'язок\"").unwrap();
        let warranty = specs.find("\"Гарантія\"").unwrap();
        assert!(display < connectivity && connectivity < warranty);
    }

    #[test]
    fn specifications_are_deterministic() {
        assert_eq!(fixture().specifications, fixture().specifications);
    }

    #[test]
    fn row_stores_pic_links_as_json() {
        let row = fixture().to_row();
        let links: Vec<String> = serde_json::from_str(row.pic_links.as_deref().unwrap()).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(row.product_code.as_deref(), Some("U0941111"));
    }
}
