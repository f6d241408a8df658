//! Block content renderer
//!
//! Turns block-editor documents into HTML for the blog and activity pages.
//! All text is escaped; a few attribute-free inline tags produced by the
//! editor are let back through.

use serde_json::Value;

use crate::models::{Block, BlockDocument};

/// Inline tags restored after escaping
const INLINE_TAGS: &[&str] = &["b", "strong", "i", "em", "u", "mark", "code", "br"];

/// Render a whole document; unknown block types are skipped
pub fn render_document(doc: &BlockDocument) -> String {
    doc.blocks
        .iter()
        .filter_map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &Block) -> Option<String> {
    let data = &block.data;
    match block.kind.as_str() {
        "paragraph" => Some(format!("<p>{}</p>", inline_text(text_field(data, "text")))),
        "header" => {
            let level = data
                .get("level")
                .and_then(Value::as_u64)
                .unwrap_or(2)
                .clamp(1, 6);
            Some(format!(
                "<h{level}>{}</h{level}>",
                inline_text(text_field(data, "text")),
                level = level
            ))
        }
        "list" => {
            let tag = if data.get("style").and_then(Value::as_str) == Some("ordered") {
                "ol"
            } else {
                "ul"
            };
            let items: String = data
                .get("items")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .map(|item| format!("<li>{}</li>", inline_text(list_item_text(item))))
                        .collect()
                })
                .unwrap_or_default();
            Some(format!("<{tag}>{}</{tag}>", items, tag = tag))
        }
        "quote" => {
            let caption = text_field(data, "caption");
            let cite = if caption.trim().is_empty() {
                String::new()
            } else {
                format!("<cite>{}</cite>", inline_text(caption))
            };
            Some(format!(
                "<blockquote><p>{}</p>{}</blockquote>",
                inline_text(text_field(data, "text")),
                cite
            ))
        }
        "image" => {
            let url = data
                .get("file")
                .and_then(|f| f.get("url"))
                .or_else(|| data.get("url"))
                .and_then(Value::as_str)
                .filter(|u| is_safe_url(u))?;
            let caption = text_field(data, "caption");
            let figcaption = if caption.trim().is_empty() {
                String::new()
            } else {
                format!("<figcaption>{}</figcaption>", inline_text(caption))
            };
            Some(format!(
                "<figure><img src=\"{}\" alt=\"{}\" loading=\"lazy\">{}</figure>",
                html_escape(url),
                html_escape(&strip_tags(caption)),
                figcaption
            ))
        }
        "code" => Some(format!(
            "<pre><code>{}</code></pre>",
            html_escape(text_field(data, "code"))
        )),
        "delimiter" => Some("<hr>".to_string()),
        other => {
            tracing::debug!("Skipping unsupported block type: {}", other);
            None
        }
    }
}

fn text_field<'a>(data: &'a Value, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or("")
}

/// List items are strings, or `{ content }` objects in the nested list format
fn list_item_text(item: &Value) -> &str {
    item.as_str()
        .or_else(|| item.get("content").and_then(Value::as_str))
        .unwrap_or("")
}

fn is_safe_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/')
}

/// Escapes HTML special characters in a string.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape, then restore bare inline tags and non-breaking spaces
fn inline_text(s: &str) -> String {
    let mut out = html_escape(s).replace("&amp;nbsp;", "&nbsp;");
    for tag in INLINE_TAGS {
        out = out
            .replace(&format!("&lt;{}&gt;", tag), &format!("<{}>", tag))
            .replace(&format!("&lt;/{}&gt;", tag), &format!("</{}>", tag));
    }
    out.replace("&lt;br/&gt;", "<br>")
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
