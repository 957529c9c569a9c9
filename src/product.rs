use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One `{id, text}` row returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogEntry {
    pub id: String,
    pub text: String,
}

/// Final row written to products.json. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub product_name: String,
    pub product_code: String,
    pub marketing_price: String,
}

impl OutputRecord {
    pub fn from_entry(entry: &CatalogEntry, price: &str) -> Self {
        let (code, name) = split_code_and_name(&entry.text);
        Self {
            product_name: name,
            product_code: code,
            marketing_price: price.to_string(),
        }
    }
}

/// Read a loosely-typed field as a trimmed string. Missing or null yields "".
pub fn item_field(item: &Value, key: &str) -> String {
    match item.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Turn a search response body into entries. Anything but an array is empty;
/// rows with a blank id or text are skipped.
pub fn entries_from_response(body: &Value) -> Vec<CatalogEntry> {
    let Some(items) = body.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let id = item_field(item, "id");
            let text = item_field(item, "text");
            if id.is_empty() || text.is_empty() {
                None
            } else {
                Some(CatalogEntry { id, text })
            }
        })
        .collect()
}

/// Split "CODE / Name / More" into ("CODE", "Name / More").
///
/// Text without a separator is kept whole as the name with an empty code.
pub fn split_code_and_name(text: &str) -> (String, String) {
    let whole = text.trim();
    let parts: Vec<&str> = text
        .split('/')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [] => (String::new(), whole.to_string()),
        [code] => (code.to_string(), whole.to_string()),
        [code, rest @ ..] => (code.to_string(), rest.join(" / ")),
    }
}
