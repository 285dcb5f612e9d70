use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::warn;

use super::error::ExtractError;
use super::value::SpecValue;

static LD_JSON_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// Fields read from the page's `Product` JSON-LD block. All `None` when the
/// page has no such block.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StructuredFields {
    pub full_name: Option<String>,
    pub pic_links: Option<SpecValue>,
    pub code: Option<String>,
    pub price_use: Option<String>,
    pub review_count: Option<i64>,
}

pub fn extract(document: &Html) -> StructuredFields {
    match find_product(document) {
        Some(product) => from_product(&product),
        None => {
            warn!("{}", ExtractError::NoProductBlock);
            StructuredFields::default()
        }
    }
}

/// First ld+json script that parses to an object with `"@type": "Product"`.
pub fn find_product(document: &Html) -> Option<Value> {
    for script in document.select(&LD_JSON_SEL) {
        let body: String = script.text().collect();
        match serde_json::from_str::<Value>(&body) {
            Ok(v) if is_product(&v) => return Some(v),
            Ok(_) => {}
            Err(e) => warn!("Failed parsing JSON inside ld+json script: {}", e),
        }
    }
    None
}

fn is_product(v: &Value) -> bool {
    v.is_object() && v.get("@type").and_then(Value::as_str) == Some("Product")
}

/// Each field independently: a miss on one never blocks the next.
pub fn from_product(product: &Value) -> StructuredFields {
    StructuredFields {
        full_name: keep("full_name", name(product)),
        pic_links: keep("pic_links", images(product)),
        code: keep("code", sku(product)),
        price_use: keep("price_use", price(product)),
        review_count: keep("review_count", review_count(product)),
    }
}

fn keep<T>(field: &str, res: Result<T, ExtractError>) -> Option<T> {
    res.map_err(|e| warn!("Error extracting product '{}': {}", field, e))
        .ok()
}

fn name(product: &Value) -> Result<String, ExtractError> {
    let v = product.get("name").ok_or(ExtractError::Missing("name"))?;
    v.as_str().map(str::to_string).ok_or(ExtractError::WrongType {
        field: "name",
        expected: "string",
    })
}

fn images(product: &Value) -> Result<SpecValue, ExtractError> {
    let wrong = ExtractError::WrongType {
        field: "image",
        expected: "string or array of strings",
    };
    match product.get("image") {
        None => Err(ExtractError::Missing("image")),
        Some(Value::String(s)) => Ok(SpecValue::One(s.clone())),
        Some(Value::Array(items)) => {
            let links = items
                .iter()
                .map(|i| i.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or(wrong)?;
            SpecValue::from_parts(links).ok_or(ExtractError::Missing("image"))
        }
        Some(_) => Err(wrong),
    }
}

fn sku(product: &Value) -> Result<String, ExtractError> {
    let v = product.get("sku").ok_or(ExtractError::Missing("sku"))?;
    scalar_text(v, "sku")
}

/// `offers` is usually one Offer; for an array the first offer is used.
fn price(product: &Value) -> Result<String, ExtractError> {
    let offers = product.get("offers").ok_or(ExtractError::Missing("offers"))?;
    let offer = match offers {
        Value::Array(list) => list.first().ok_or(ExtractError::Missing("offers"))?,
        other => other,
    };
    let v = offer.get("price").ok_or(ExtractError::Missing("offers.price"))?;
    scalar_text(v, "offers.price")
}

/// Absent rating means nobody reviewed it: 0, not unknown.
fn review_count(product: &Value) -> Result<i64, ExtractError> {
    let Some(count) = product
        .get("aggregateRating")
        .and_then(|r| r.get("reviewCount"))
    else {
        return Ok(0);
    };

    let wrong = ExtractError::WrongType {
        field: "aggregateRating.reviewCount",
        expected: "integer",
    };
    match count {
        Value::Number(n) => n.as_i64().ok_or(wrong),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| wrong),
        _ => Err(wrong),
    }
}

fn scalar_text(v: &Value, field: &'static str) -> Result<String, ExtractError> {
    match v {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ExtractError::WrongType {
            field,
            expected: "string or number",
        }),
    }
}
