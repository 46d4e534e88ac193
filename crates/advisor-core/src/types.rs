use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Product identifier as it appears in the catalog document.
///
/// Catalogs use either numbers or strings; both compare by their string form,
/// so `1` and `"1"` name the same product. Any JSON number is accepted,
/// including fractions and values outside the `i64` range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(Number),
    Text(String),
}

/// Integral floats inside this bound print without a fraction (`2.0` is `2`).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl ProductId {
    /// Whether this id names the product referenced by `raw`.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            ProductId::Text(s) => s == raw,
            ProductId::Number(_) => self.to_string() == raw,
        }
    }
}

impl PartialEq for ProductId {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for ProductId {}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => match n.as_f64() {
                Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER => {
                    write!(f, "{}", v as i64)
                }
                _ => write!(f, "{}", n),
            },
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ProductId {
    fn from(n: i64) -> Self {
        ProductId::Number(Number::from(n))
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        ProductId::Text(s.to_string())
    }
}

/// A catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single line of the chat transcript.
#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered chat history. Append-only apart from `remove_last`, which swaps
/// a transient placeholder for the real reply. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: Sender, text: impl Into<String>) {
        self.entries.push(ChatEntry {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn remove_last(&mut self) -> Option<ChatEntry> {
        self.entries.pop()
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_text_ids_compare_by_string_form() {
        assert_eq!(ProductId::from(7), ProductId::Text("7".into()));
        assert!(ProductId::from(7).matches("7"));
        assert!(!ProductId::from(7).matches("07"));
        assert!(ProductId::Text("abc".into()).matches("abc"));
    }

    #[test]
    fn test_fractional_and_large_numeric_ids() {
        let products: Vec<Product> = serde_json::from_str(
            r#"[{"id":1.5,"name":"A","brand":"B","category":"c"},
                {"id":18446744073709551615,"name":"D","brand":"E","category":"c"},
                {"id":2.0,"name":"F","brand":"G","category":"c"}]"#,
        )
        .unwrap();

        assert!(products[0].id.matches("1.5"));
        assert_eq!(products[0].id, ProductId::Text("1.5".into()));
        assert!(products[1].id.matches("18446744073709551615"));
        assert!(products[2].id.matches("2"));

        // Stored selections keep the same ids.
        let json = serde_json::to_string(&products).unwrap();
        let reloaded: Vec<Product> = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, products);
    }

    #[test]
    fn test_product_parses_with_and_without_description() {
        let with: Product = serde_json::from_str(
            r#"{"id":1,"name":"Clay Mask","brand":"X","category":"skincare","image":"a.png","description":"Deep clean"}"#,
        )
        .unwrap();
        assert_eq!(with.description.as_deref(), Some("Deep clean"));

        let without: Product = serde_json::from_str(
            r#"{"id":"s-2","name":"Shine Serum","brand":"Y","category":"haircare","image":"b.png"}"#,
        )
        .unwrap();
        assert!(without.description.is_none());
        assert_eq!(without.id.to_string(), "s-2");

        // Absent description stays absent when written back.
        let json = serde_json::to_string(&without).unwrap();
        assert!(!json.contains("description"));
    }

    #[test]
    fn test_transcript_remove_last_replaces_placeholder() {
        let mut transcript = Transcript::new();
        transcript.push(Sender::User, "hi");
        transcript.push(Sender::Bot, "Typing...");
        let removed = transcript.remove_last().unwrap();
        assert_eq!(removed.text, "Typing...");
        transcript.push(Sender::Bot, "Hello!");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().text, "Hello!");
        assert_eq!(transcript.entries()[0].sender, Sender::User);
    }
}
