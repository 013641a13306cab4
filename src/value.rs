//! Conversions from view models into [`Value`]s for the page templates.
//! Templates don't escape anything, so every text field is HTML-escaped here.
//! The only raw fields are the post body (already HTML) and the breadcrumb
//! JSON-LD, which is made safe for a `<script>` element instead.

use crate::present::{Link, NavLink, PostCard, PostPage, Related};
use gtmpl_value::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;

/// HTML-escapes `text` for use in element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    // Writing into a `String` can't fail.
    let _ = escape_html(&mut escaped, text);
    escaped
}

fn text(s: &str) -> Value {
    Value::String(escape(s))
}

fn optional_text(s: &Option<String>) -> Value {
    match s {
        Some(s) => text(s),
        None => Value::Nil,
    }
}

fn array<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>) -> Value
where
    Value: From<&'a T>,
{
    Value::Array(items.into_iter().map(Value::from).collect())
}

/// Builds an object value from `(key, value)` pairs.
fn object<const N: usize>(fields: [(&str, Value); N]) -> Value {
    let m: HashMap<String, Value> = fields
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
    Value::Object(m)
}

impl From<&Link> for Value {
    fn from(link: &Link) -> Value {
        object([("label", text(&link.label)), ("url", text(&link.url))])
    }
}

impl From<&PostCard> for Value {
    fn from(card: &PostCard) -> Value {
        object([
            ("id", text(&card.id)),
            ("title", text(&card.title)),
            ("date", text(&card.date)),
            ("url", text(&card.url)),
            ("prefecture", text(&card.prefecture)),
            ("prefecture_url", optional_text(&card.prefecture_url)),
            ("thumbnail", optional_text(&card.thumbnail)),
            ("excerpt", text(&card.excerpt)),
            ("tags", array(&card.tags)),
        ])
    }
}

impl From<&NavLink> for Value {
    fn from(nav: &NavLink) -> Value {
        object([
            ("label", text(&nav.label)),
            ("title", text(&nav.title)),
            ("prefecture", text(&nav.prefecture)),
            ("thumbnail", optional_text(&nav.thumbnail)),
            ("url", text(&nav.url)),
        ])
    }
}

/// `Related` becomes `{empty, message, cards}` so templates can branch with a
/// plain `if`.
impl From<&Related> for Value {
    fn from(related: &Related) -> Value {
        match related {
            Related::Empty { message } => object([
                ("empty", Value::Bool(true)),
                ("message", text(message)),
                ("cards", Value::Array(Vec::new())),
            ]),
            Related::Posts { cards } => object([
                ("empty", Value::Bool(false)),
                ("message", Value::Nil),
                ("cards", array(cards)),
            ]),
        }
    }
}

impl From<&PostPage> for Value {
    fn from(page: &PostPage) -> Value {
        let nav = |n: &Option<NavLink>| n.as_ref().map(Value::from).unwrap_or(Value::Nil);
        object([
            ("id", text(&page.id)),
            ("title", text(&page.title)),
            ("document_title", text(&page.document_title)),
            ("date", text(&page.date)),
            ("content", Value::String(page.content.clone())),
            ("excerpt", text(&page.excerpt)),
            ("canonical", text(&page.canonical)),
            ("og_image", text(&page.og_image)),
            ("hero", optional_text(&page.hero)),
            ("tags", array(&page.tags)),
            ("breadcrumb", array(&page.breadcrumb)),
            ("breadcrumb_json", Value::String(script_safe(&page.breadcrumb_json))),
            ("back_to_list", text(&page.back_to_list)),
            ("related", Value::from(&page.related)),
            ("previous", nav(&page.previous)),
            ("next", nav(&page.next)),
        ])
    }
}

/// Keeps JSON from closing the surrounding `<script>` element. `<\/` is an
/// equivalent JSON string escape.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
