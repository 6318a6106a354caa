//! Property bag decoding.
//!
//! A property bag maps field names to values whose shape depends on a `type`
//! discriminator (`title`, `rich_text`, `select`, ...), or to bare JSON primitives
//! when the record comes from a flat JSON file. [`PropertyValue::decode`] is total:
//! every JSON value decodes to some variant, so nothing downstream has to handle
//! decoding failures.

use serde::Serialize;
use serde_json::{Map, Value};

/// Literal the content API uses for a ticked checkbox in some exports.
pub const CHECKBOX_YES: &str = "__YES__";

/// Text styling attached to a rich-text fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    /// Colour name; `None` or `"default"` means no colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Annotations {
    fn decode(value: Option<&Value>) -> Self {
        let Some(map) = value.and_then(Value::as_object) else {
            return Self::default();
        };
        let flag = |key: &str| map.get(key).and_then(Value::as_bool).unwrap_or(false);

        Self {
            bold: flag("bold"),
            italic: flag("italic"),
            strikethrough: flag("strikethrough"),
            underline: flag("underline"),
            code: flag("code"),
            color: map
                .get("color")
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty() && *c != "default")
                .map(str::to_string),
        }
    }

    /// Whether no styling applies.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// What a mention fragment points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    Page,
    User,
    Other,
}

/// Kind of a rich-text fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Text,
    Mention(MentionKind),
    Equation(String),
}

/// One run of rich text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichTextFragment {
    /// Plain text content.
    pub text: String,

    /// Link target, if the fragment is a link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Styling.
    pub annotations: Annotations,

    /// Fragment kind.
    pub kind: FragmentKind,
}

impl RichTextFragment {
    /// Create an unstyled text fragment.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: None,
            annotations: Annotations::default(),
            kind: FragmentKind::Text,
        }
    }

    /// Decode a fragment from its JSON shape.
    ///
    /// Text is taken from `plain_text`, then `text.content`, then `content`. A bare
    /// string is an unstyled fragment. Anything else is not a fragment.
    pub fn decode(value: &Value) -> Option<Self> {
        let map = match value {
            Value::String(s) => return Some(Self::plain(s.clone())),
            Value::Object(map) => map,
            _ => return None,
        };

        let text_obj = map.get("text").and_then(Value::as_object);
        let text = str_at(map, "plain_text")
            .or_else(|| text_obj.and_then(|t| str_at(t, "content")))
            .or_else(|| str_at(map, "content"))
            .unwrap_or_default()
            .to_string();

        let href = str_at(map, "href")
            .or_else(|| {
                text_obj
                    .and_then(|t| t.get("link"))
                    .and_then(Value::as_object)
                    .and_then(|link| str_at(link, "url"))
            })
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        let kind = match str_at(map, "type") {
            Some("mention") => {
                let mention = map
                    .get("mention")
                    .and_then(Value::as_object)
                    .and_then(|m| str_at(m, "type"));
                FragmentKind::Mention(match mention {
                    Some("page") => MentionKind::Page,
                    Some("user") => MentionKind::User,
                    _ => MentionKind::Other,
                })
            }
            Some("equation") => FragmentKind::Equation(
                map.get("equation")
                    .and_then(Value::as_object)
                    .and_then(|e| str_at(e, "expression"))
                    .unwrap_or_default()
                    .to_string(),
            ),
            _ => FragmentKind::Text,
        };

        Some(Self {
            text,
            href,
            annotations: Annotations::decode(map.get("annotations")),
            kind,
        })
    }
}

/// Decode a rich-text array. Non-array input yields no fragments.
pub fn decode_rich_text(value: Option<&Value>) -> Vec<RichTextFragment> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(RichTextFragment::decode).collect())
        .unwrap_or_default()
}

/// Concatenate the plain text of a fragment sequence.
pub fn plain_text(fragments: &[RichTextFragment]) -> String {
    fragments.iter().map(|f| f.text.as_str()).collect()
}

/// A file attachment reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileRef {
    /// File name, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Internally hosted URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    /// Externally hosted URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

impl FileRef {
    /// Decode a file entry.
    ///
    /// Accepts `{file: {url}}`, `{external: {url}}` and flat `{url, name}` entries
    /// (flat URLs count as internally hosted). A bare string is an external URL.
    pub fn decode(value: &Value) -> Option<Self> {
        let map = match value {
            Value::String(s) if !s.is_empty() => {
                return Some(Self {
                    external_url: Some(s.clone()),
                    ..Self::default()
                });
            }
            Value::Object(map) => map,
            _ => return None,
        };

        let nested_url = |key: &str| {
            map.get(key)
                .and_then(Value::as_object)
                .and_then(|o| str_at(o, "url"))
                .filter(|u| !u.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            name: str_at(map, "name").map(str::to_string),
            file_url: nested_url("file").or_else(|| {
                str_at(map, "url")
                    .filter(|u| !u.is_empty())
                    .map(str::to_string)
            }),
            external_url: nested_url("external"),
        })
    }

    /// Resolved URL; the internally hosted URL wins.
    pub fn url(&self) -> Option<&str> {
        self.file_url.as_deref().or(self.external_url.as_deref())
    }
}

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `title` property.
    Title(Vec<RichTextFragment>),
    /// `rich_text` property.
    RichText(Vec<RichTextFragment>),
    /// Legacy `text` property carrying a plain string.
    Text(String),
    /// `select` property; `None` when nothing is selected.
    Select(Option<String>),
    /// `multi_select` property.
    MultiSelect(Vec<String>),
    /// `checkbox` property.
    Checkbox(bool),
    /// `number` property; `None` when empty.
    Number(Option<f64>),
    /// `files` property.
    Files(Vec<FileRef>),
    /// `url` property.
    Url(Option<String>),
    /// `date` property, holding the raw start string.
    Date(Option<String>),
    /// A value without a recognised discriminator.
    Bare(Value),
    /// An object whose `type` is not one this decoder knows.
    Unknown(String),
}

impl PropertyValue {
    /// Decode a JSON value. Never fails.
    pub fn decode(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::Bare(value.clone());
        };
        let Some(kind) = str_at(map, "type") else {
            return Self::Bare(value.clone());
        };
        let payload = map.get(kind);

        match kind {
            "title" => Self::Title(decode_rich_text(payload)),
            "rich_text" => Self::RichText(decode_rich_text(payload)),
            "text" => Self::Text(match payload {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Object(o)) => str_at(o, "content").unwrap_or_default().to_string(),
                _ => String::new(),
            }),
            "select" | "status" => Self::Select(select_name(payload)),
            "multi_select" => Self::MultiSelect(
                payload
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|item| match item {
                                Value::String(s) => Some(s.clone()),
                                other => select_name(Some(other)),
                            })
                            .filter(|name| !name.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            "checkbox" => Self::Checkbox(payload.is_some_and(is_truthy_checkbox)),
            "number" => Self::Number(payload.and_then(Value::as_f64).filter(|n| n.is_finite())),
            "files" => Self::Files(
                payload
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(FileRef::decode).collect())
                    .unwrap_or_default(),
            ),
            "url" => Self::Url(payload.and_then(Value::as_str).map(str::to_string)),
            "date" => Self::Date(match payload {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Object(o)) => str_at(o, "start").map(str::to_string),
                _ => None,
            }),
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The discriminator name of this value, for diagnostics.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Title(_) => "title",
            Self::RichText(_) => "rich_text",
            Self::Text(_) => "text",
            Self::Select(_) => "select",
            Self::MultiSelect(_) => "multi_select",
            Self::Checkbox(_) => "checkbox",
            Self::Number(_) => "number",
            Self::Files(_) => "files",
            Self::Url(_) => "url",
            Self::Date(_) => "date",
            Self::Bare(_) => "bare",
            Self::Unknown(kind) => kind,
        }
    }
}

/// Read-only view over a record's property bag.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyBag<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> PropertyBag<'a> {
    /// Wrap an optional JSON map.
    pub fn new(map: Option<&'a Map<String, Value>>) -> Self {
        Self { map }
    }

    /// Wrap an optional JSON value; anything but an object is an empty bag.
    pub fn from_value(value: Option<&'a Value>) -> Self {
        Self::new(value.and_then(Value::as_object))
    }

    /// A bag with no fields.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the bag has no fields.
    pub fn is_empty(&self) -> bool {
        self.map.is_none_or(Map::is_empty)
    }

    /// First alias present with a non-null value.
    pub fn raw(&self, aliases: &[&str]) -> Option<&'a Value> {
        let map = self.map?;
        aliases
            .iter()
            .find_map(|alias| map.get(*alias).filter(|v| !v.is_null()))
    }

    /// Decode the first present alias.
    pub fn lookup(&self, aliases: &[&str]) -> Option<PropertyValue> {
        self.raw(aliases).map(PropertyValue::decode)
    }
}

pub(crate) fn str_at<'v>(map: &'v Map<String, Value>, key: &str) -> Option<&'v str> {
    map.get(key).and_then(Value::as_str)
}

fn select_name(payload: Option<&Value>) -> Option<String> {
    match payload? {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => str_at(o, "name").map(str::to_string),
        _ => None,
    }
}

pub(crate) fn is_truthy_checkbox(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == CHECKBOX_YES,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_title() {
        let value = json!({
            "type": "title",
            "title": [{"plain_text": "Hello "}, {"text": {"content": "World"}}]
        });
        match PropertyValue::decode(&value) {
            PropertyValue::Title(fragments) => assert_eq!(plain_text(&fragments), "Hello World"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_missing_payload_is_empty() {
        let value = json!({"type": "rich_text"});
        assert_eq!(PropertyValue::decode(&value), PropertyValue::RichText(vec![]));

        let value = json!({"type": "select", "select": null});
        assert_eq!(PropertyValue::decode(&value), PropertyValue::Select(None));
    }

    #[test]
    fn test_decode_bare_and_unknown() {
        assert_eq!(
            PropertyValue::decode(&json!("plain")),
            PropertyValue::Bare(json!("plain"))
        );
        assert_eq!(
            PropertyValue::decode(&json!({"type": "formula"})),
            PropertyValue::Unknown("formula".to_string())
        );
        assert_eq!(
            PropertyValue::decode(&json!({"name": "no type"})),
            PropertyValue::Bare(json!({"name": "no type"}))
        );
    }

    #[test]
    fn test_decode_checkbox_yes_literal() {
        let value = json!({"type": "checkbox", "checkbox": "__YES__"});
        assert_eq!(PropertyValue::decode(&value), PropertyValue::Checkbox(true));

        let value = json!({"type": "checkbox", "checkbox": "no"});
        assert_eq!(PropertyValue::decode(&value), PropertyValue::Checkbox(false));
    }

    #[test]
    fn test_decode_multi_select_drops_empty_names() {
        let value = json!({
            "type": "multi_select",
            "multi_select": [{"name": "rust"}, {"name": ""}, "web", 3]
        });
        assert_eq!(
            PropertyValue::decode(&value),
            PropertyValue::MultiSelect(vec!["rust".to_string(), "web".to_string()])
        );
    }

    #[test]
    fn test_file_ref_prefers_internal_url() {
        let entry = json!({
            "name": "cover.png",
            "file": {"url": "https://files.example.com/cover.png"},
            "external": {"url": "https://cdn.example.com/cover.png"}
        });
        let file = FileRef::decode(&entry).expect("file ref");
        assert_eq!(file.url(), Some("https://files.example.com/cover.png"));

        let external = FileRef::decode(&json!({"external": {"url": "https://cdn.example.com/a.png"}}))
            .expect("file ref");
        assert_eq!(external.url(), Some("https://cdn.example.com/a.png"));
    }

    #[test]
    fn test_fragment_link_and_annotations() {
        let value = json!({
            "type": "text",
            "plain_text": "docs",
            "text": {"content": "docs", "link": {"url": "https://example.com"}},
            "annotations": {"bold": true, "color": "default"}
        });
        let fragment = RichTextFragment::decode(&value).expect("fragment");
        assert_eq!(fragment.href.as_deref(), Some("https://example.com"));
        assert!(fragment.annotations.bold);
        assert!(fragment.annotations.color.is_none());
    }

    #[test]
    fn test_bag_first_present_alias_wins() {
        let value = json!({"title": null, "Name": "second", "名前": "third"});
        let bag = PropertyBag::from_value(Some(&value));
        assert_eq!(bag.raw(&["Title", "title", "Name", "名前"]), Some(&json!("second")));
        assert!(bag.raw(&["missing"]).is_none());
    }

    #[test]
    fn test_bag_from_non_object_is_empty() {
        let value = json!([1, 2, 3]);
        let bag = PropertyBag::from_value(Some(&value));
        assert!(bag.is_empty());
        assert!(PropertyBag::empty().lookup(&["Title"]).is_none());
    }
}
