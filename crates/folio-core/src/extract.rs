//! Typed extraction from property bags.
//!
//! Each kind marker knows which decoded property shapes it accepts. A shape it does
//! not accept yields `None`, so every field falls through to the caller's default:
//!
//! ```
//! use folio_core::extract::{PlainText, Number};
//! use folio_core::property::PropertyBag;
//! use serde_json::json;
//!
//! let props = json!({"Name": {"type": "title", "title": [{"plain_text": "Hi"}]}});
//! let bag = PropertyBag::from_value(Some(&props));
//! assert_eq!(bag.get::<PlainText>(&["Title", "Name"]).as_deref(), Some("Hi"));
//! assert_eq!(bag.get_or::<Number>(&["Read Time"], 5.0), 5.0);
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::{
    property::{FileRef, PropertyBag, PropertyValue, RichTextFragment, decode_rich_text, plain_text},
    rich_text::{escape_html, render_rich_text},
};

/// A property kind that can be extracted from a decoded value.
pub trait Kind {
    /// Extracted type.
    type Output;

    /// Extract from a decoded value, or `None` when the shape does not match.
    fn decode(value: &PropertyValue) -> Option<Self::Output>;
}

/// Plain text from title, rich text, text, or a bare string.
pub struct PlainText;

/// Inline HTML from title or rich text.
pub struct RichHtml;

/// Name of the selected option.
pub struct SelectName;

/// Checkbox state.
pub struct Checkbox;

/// Finite number.
pub struct Number;

/// URL of the first attached file.
pub struct FileUrl;

/// URL property.
pub struct Link;

/// Multi-select option names.
pub struct Tags;

/// Date start parsed to UTC.
pub struct Timestamp;

impl Kind for PlainText {
    type Output = String;

    fn decode(value: &PropertyValue) -> Option<String> {
        let text = match value {
            PropertyValue::Title(f) | PropertyValue::RichText(f) => plain_text(f),
            PropertyValue::Text(s) | PropertyValue::Bare(Value::String(s)) => s.clone(),
            PropertyValue::Bare(v @ Value::Array(_)) => plain_text(&decode_rich_text(Some(v))),
            _ => return None,
        };
        non_empty(text)
    }
}

impl Kind for RichHtml {
    type Output = String;

    fn decode(value: &PropertyValue) -> Option<String> {
        let html = match value {
            PropertyValue::Title(f) | PropertyValue::RichText(f) => render_rich_text(f),
            PropertyValue::Text(s) | PropertyValue::Bare(Value::String(s)) => escape_html(s),
            PropertyValue::Bare(v @ Value::Array(_)) => {
                let fragments: Vec<RichTextFragment> = decode_rich_text(Some(v));
                render_rich_text(&fragments)
            }
            _ => return None,
        };
        non_empty(html)
    }
}

impl Kind for SelectName {
    type Output = String;

    fn decode(value: &PropertyValue) -> Option<String> {
        match value {
            PropertyValue::Select(name) => name.clone().and_then(non_empty),
            PropertyValue::Bare(Value::String(s)) => non_empty(s.clone()),
            _ => None,
        }
    }
}

impl Kind for Checkbox {
    type Output = bool;

    fn decode(value: &PropertyValue) -> Option<bool> {
        match value {
            PropertyValue::Checkbox(b) => Some(*b),
            PropertyValue::Bare(v @ (Value::Bool(_) | Value::String(_))) => {
                Some(crate::property::is_truthy_checkbox(v))
            }
            _ => None,
        }
    }
}

impl Kind for Number {
    type Output = f64;

    fn decode(value: &PropertyValue) -> Option<f64> {
        match value {
            PropertyValue::Number(n) => *n,
            PropertyValue::Bare(Value::Number(n)) => n.as_f64().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

impl Kind for FileUrl {
    type Output = String;

    fn decode(value: &PropertyValue) -> Option<String> {
        match value {
            PropertyValue::Files(files) => files.first().and_then(|f| f.url()).map(str::to_string),
            PropertyValue::Bare(Value::String(s)) => non_empty(s.clone()),
            PropertyValue::Bare(Value::Array(items)) => items
                .first()
                .and_then(FileRef::decode)
                .and_then(|f| f.url().map(str::to_string)),
            PropertyValue::Bare(v @ Value::Object(_)) => {
                FileRef::decode(v).and_then(|f| f.url().map(str::to_string))
            }
            _ => None,
        }
    }
}

impl Kind for Link {
    type Output = String;

    fn decode(value: &PropertyValue) -> Option<String> {
        match value {
            PropertyValue::Url(url) => url.clone().and_then(non_empty),
            PropertyValue::Bare(Value::String(s)) => non_empty(s.clone()),
            _ => None,
        }
    }
}

impl Kind for Tags {
    type Output = Vec<String>;

    fn decode(value: &PropertyValue) -> Option<Vec<String>> {
        match value {
            PropertyValue::MultiSelect(names) => Some(names.clone()),
            PropertyValue::Bare(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl Kind for Timestamp {
    type Output = DateTime<Utc>;

    fn decode(value: &PropertyValue) -> Option<DateTime<Utc>> {
        match value {
            PropertyValue::Date(Some(s)) | PropertyValue::Bare(Value::String(s)) => {
                parse_timestamp(s)
            }
            _ => None,
        }
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

impl PropertyBag<'_> {
    /// Extract the first present alias as kind `K`.
    pub fn get<K: Kind>(&self, aliases: &[&str]) -> Option<K::Output> {
        self.lookup(aliases).and_then(|value| K::decode(&value))
    }

    /// Extract the first present alias as kind `K`, or `default`.
    pub fn get_or<K: Kind>(&self, aliases: &[&str], default: K::Output) -> K::Output {
        self.get::<K>(aliases).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    use super::*;

    fn bag_of(value: &Value) -> PropertyBag<'_> {
        PropertyBag::from_value(Some(value))
    }

    #[test]
    fn test_every_kind_defaults_on_empty_bag() {
        let bag = PropertyBag::empty();
        assert!(bag.get::<PlainText>(&["Title"]).is_none());
        assert!(bag.get::<RichHtml>(&["Excerpt"]).is_none());
        assert!(bag.get::<SelectName>(&["Category"]).is_none());
        assert!(bag.get::<Checkbox>(&["Published"]).is_none());
        assert!(bag.get::<Number>(&["Order"]).is_none());
        assert!(bag.get::<FileUrl>(&["Image"]).is_none());
        assert!(bag.get::<Link>(&["URL"]).is_none());
        assert!(bag.get::<Tags>(&["Tags"]).is_none());
        assert!(bag.get::<Timestamp>(&["Date"]).is_none());
        assert_eq!(bag.get_or::<Number>(&["Read Time"], 5.0), 5.0);
    }

    #[test]
    fn test_mismatched_kind_falls_back() {
        let props = json!({
            "Title": {"type": "number", "number": 3},
            "Published": {"type": "rich_text", "rich_text": []}
        });
        let bag = bag_of(&props);
        assert_eq!(bag.get_or::<PlainText>(&["Title"], "Untitled".into()), "Untitled");
        assert!(!bag.get_or::<Checkbox>(&["Published"], false));
    }

    #[test]
    fn test_plain_text_from_shapes() {
        let props = json!({
            "a": {"type": "title", "title": [{"plain_text": "One"}]},
            "b": {"type": "text", "text": "Two"},
            "c": "Three",
            "d": [{"text": {"content": "Four"}}],
            "e": {"type": "rich_text", "rich_text": [{"plain_text": "  "}]}
        });
        let bag = bag_of(&props);
        assert_eq!(bag.get::<PlainText>(&["a"]).as_deref(), Some("One"));
        assert_eq!(bag.get::<PlainText>(&["b"]).as_deref(), Some("Two"));
        assert_eq!(bag.get::<PlainText>(&["c"]).as_deref(), Some("Three"));
        assert_eq!(bag.get::<PlainText>(&["d"]).as_deref(), Some("Four"));
        assert!(bag.get::<PlainText>(&["e"]).is_none());
    }

    #[test]
    fn test_rich_html_escapes_bare_strings() {
        let props = json!({"summary": "a < b"});
        let bag = bag_of(&props);
        assert_eq!(bag.get::<RichHtml>(&["summary"]).as_deref(), Some("a &lt; b"));
    }

    #[test]
    fn test_checkbox_literal_and_bare() {
        let props = json!({
            "a": {"type": "checkbox", "checkbox": "__YES__"},
            "b": true,
            "c": "__YES__",
            "d": "yes"
        });
        let bag = bag_of(&props);
        assert_eq!(bag.get::<Checkbox>(&["a"]), Some(true));
        assert_eq!(bag.get::<Checkbox>(&["b"]), Some(true));
        assert_eq!(bag.get::<Checkbox>(&["c"]), Some(true));
        assert_eq!(bag.get::<Checkbox>(&["d"]), Some(false));
    }

    #[test]
    fn test_file_url_shapes() {
        let props = json!({
            "files": {"type": "files", "files": [
                {"name": "a", "external": {"url": "https://ext/a.png"}, "file": {"url": "https://int/a.png"}}
            ]},
            "empty": {"type": "files", "files": []},
            "flat": [{"url": "/images/b.png", "name": "b"}],
            "bare": "https://cdn/c.png"
        });
        let bag = bag_of(&props);
        assert_eq!(bag.get::<FileUrl>(&["files"]).as_deref(), Some("https://int/a.png"));
        assert!(bag.get::<FileUrl>(&["empty"]).is_none());
        assert_eq!(bag.get::<FileUrl>(&["flat"]).as_deref(), Some("/images/b.png"));
        assert_eq!(bag.get::<FileUrl>(&["bare"]).as_deref(), Some("https://cdn/c.png"));
    }

    #[test]
    fn test_tags_shapes() {
        let props = json!({
            "ms": {"type": "multi_select", "multi_select": [{"name": "Rust"}, {"name": "Web"}]},
            "flat": ["a", "", 1, "b"]
        });
        let bag = bag_of(&props);
        assert_eq!(bag.get_or::<Tags>(&["ms"], vec![]), vec!["Rust", "Web"]);
        assert_eq!(bag.get_or::<Tags>(&["flat"], vec![]), vec!["a", "b"]);
    }

    #[test]
    fn test_timestamp_parsing() {
        let dt = parse_timestamp("2024-03-05").expect("date");
        assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2024, 3, 5, 0));

        let dt = parse_timestamp("2024-03-05T09:30:00+09:00").expect("rfc3339");
        assert_eq!((dt.day(), dt.hour(), dt.minute()), (5, 0, 30));

        assert!(parse_timestamp("yesterday").is_none());

        let props = json!({"Date": {"type": "date", "date": {"start": "2023-12-31"}}});
        assert!(bag_of(&props).get::<Timestamp>(&["Date"]).is_some());
    }

    #[test]
    fn test_number_rejects_strings() {
        let props = json!({"n": "5", "m": {"type": "number", "number": null}});
        let bag = bag_of(&props);
        assert!(bag.get::<Number>(&["n"]).is_none());
        assert!(bag.get::<Number>(&["m"]).is_none());
    }
}
