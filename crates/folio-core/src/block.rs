//! Rich content blocks.

use serde::Serialize;
use serde_json::Value;

use crate::property::{RichTextFragment, decode_rich_text, plain_text, str_at};

/// One unit of rich content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        text: Vec<RichTextFragment>,
    },
    Heading {
        level: u8,
        text: Vec<RichTextFragment>,
    },
    BulletedListItem {
        text: Vec<RichTextFragment>,
    },
    NumberedListItem {
        text: Vec<RichTextFragment>,
    },
    Quote {
        text: Vec<RichTextFragment>,
    },
    Code {
        language: String,
        code: String,
    },
    Image {
        url: Option<String>,
        caption: Vec<RichTextFragment>,
    },
    Divider,
    Toggle {
        summary: Vec<RichTextFragment>,
        children: Vec<Block>,
    },
    /// A block type this model does not render.
    Unsupported {
        kind: String,
    },
}

impl Block {
    /// Decode a block from its JSON shape. Never fails.
    pub fn decode(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::Unsupported {
                kind: String::new(),
            };
        };
        let kind = str_at(map, "type").unwrap_or_default();
        let payload = map.get(kind).and_then(Value::as_object);
        let rich = |key: &str| decode_rich_text(payload.and_then(|p| p.get(key)));
        let children = || {
            map.get("children")
                .or_else(|| payload.and_then(|p| p.get("children")))
                .map(decode_blocks)
                .unwrap_or_default()
        };

        match kind {
            "paragraph" => Self::Paragraph {
                text: rich("rich_text"),
            },
            "heading_1" | "heading_2" | "heading_3" => Self::Heading {
                level: match kind {
                    "heading_1" => 1,
                    "heading_2" => 2,
                    _ => 3,
                },
                text: rich("rich_text"),
            },
            "bulleted_list_item" => Self::BulletedListItem {
                text: rich("rich_text"),
            },
            "numbered_list_item" => Self::NumberedListItem {
                text: rich("rich_text"),
            },
            "quote" => Self::Quote {
                text: rich("rich_text"),
            },
            "code" => Self::Code {
                language: payload
                    .and_then(|p| str_at(p, "language"))
                    .unwrap_or_default()
                    .to_string(),
                code: plain_text(&rich("rich_text")),
            },
            "image" => {
                let nested = |key: &str| {
                    payload
                        .and_then(|p| p.get(key))
                        .and_then(Value::as_object)
                        .and_then(|o| str_at(o, "url"))
                        .filter(|u| !u.is_empty())
                        .map(str::to_string)
                };
                Self::Image {
                    url: nested("file").or_else(|| nested("external")),
                    caption: rich("caption"),
                }
            }
            "divider" => Self::Divider,
            "toggle" => Self::Toggle {
                summary: rich("rich_text"),
                children: children(),
            },
            other => Self::Unsupported {
                kind: other.to_string(),
            },
        }
    }

    /// Plain text carried by the block and its children.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Paragraph { text }
            | Self::Heading { text, .. }
            | Self::BulletedListItem { text }
            | Self::NumberedListItem { text }
            | Self::Quote { text } => plain_text(text),
            Self::Code { code, .. } => code.clone(),
            Self::Image { caption, .. } => plain_text(caption),
            Self::Toggle { summary, children } => {
                let mut text = plain_text(summary);
                for child in children {
                    text.push(' ');
                    text.push_str(&child.plain_text());
                }
                text
            }
            Self::Divider | Self::Unsupported { .. } => String::new(),
        }
    }
}

/// Decode a JSON array of blocks; anything else is no blocks.
pub fn decode_blocks(value: &Value) -> Vec<Block> {
    value
        .as_array()
        .map(|items| items.iter().map(Block::decode).collect())
        .unwrap_or_default()
}

/// A record body: either pre-rendered markup or a block sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Html(String),
    Blocks(Vec<Block>),
}

impl Default for Content {
    fn default() -> Self {
        Self::Html(String::new())
    }
}

impl Content {
    /// Decode a body: a string is markup, an array is blocks, anything else is empty.
    pub fn decode(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::Html(s.clone()),
            Some(v @ Value::Array(_)) => Self::Blocks(decode_blocks(v)),
            _ => Self::default(),
        }
    }

    /// Whether there is nothing to render.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Html(s) => s.trim().is_empty(),
            Self::Blocks(blocks) => blocks.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_heading_levels() {
        for (kind, level) in [("heading_1", 1), ("heading_2", 2), ("heading_3", 3)] {
            let block = Block::decode(&json!({
                "type": kind,
                kind: {"rich_text": [{"plain_text": "H"}]}
            }));
            assert!(matches!(block, Block::Heading { level: l, .. } if l == level));
        }
    }

    #[test]
    fn test_decode_toggle_children() {
        let block = Block::decode(&json!({
            "type": "toggle",
            "toggle": {"rich_text": [{"plain_text": "More"}]},
            "children": [
                {"type": "paragraph", "paragraph": {"rich_text": [{"plain_text": "Hidden"}]}}
            ]
        }));
        match block {
            Block::Toggle { summary, children } => {
                assert_eq!(plain_text(&summary), "More");
                assert_eq!(children.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_image_prefers_file_url() {
        let block = Block::decode(&json!({
            "type": "image",
            "image": {
                "file": {"url": "https://int/x.png"},
                "external": {"url": "https://ext/x.png"},
                "caption": []
            }
        }));
        assert_eq!(
            block,
            Block::Image {
                url: Some("https://int/x.png".to_string()),
                caption: vec![]
            }
        );
    }

    #[test]
    fn test_unknown_and_malformed_blocks() {
        assert_eq!(
            Block::decode(&json!({"type": "table_of_contents"})),
            Block::Unsupported {
                kind: "table_of_contents".to_string()
            }
        );
        assert_eq!(
            Block::decode(&json!(42)),
            Block::Unsupported {
                kind: String::new()
            }
        );
    }

    #[test]
    fn test_content_decode() {
        assert_eq!(
            Content::decode(Some(&json!("<p>x</p>"))),
            Content::Html("<p>x</p>".to_string())
        );
        assert!(matches!(Content::decode(Some(&json!([]))), Content::Blocks(b) if b.is_empty()));
        assert!(Content::decode(None).is_empty());
        assert!(Content::decode(Some(&json!({"a": 1}))).is_empty());
    }
}
