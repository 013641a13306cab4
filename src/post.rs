//! Defines the [`Post`] and [`Course`] records and the [`Catalog`] that holds
//! them for the duration of a render. Records are decoded leniently: CMS
//! content is frequently partial, and a missing field or a `tags` value of
//! the wrong shape should cost that field, not the whole build.

use std::collections::{HashMap, HashSet};

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::query;

/// A single travel-journal entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Post {
    /// The natural key. Also the output file stem (`posts/{id}.html`).
    pub id: String,

    pub title: String,

    /// The date as authored. See [`crate::date`] for how it's interpreted.
    pub date: String,

    /// Free-text prefecture name; compare via
    /// [`crate::normalize::normalize_prefecture`].
    pub prefecture: String,

    pub tags: Vec<String>,

    pub thumbnail: Option<String>,

    pub excerpt: Option<String>,

    /// The post body as HTML.
    pub content: String,
}

/// A suggested multi-day itinerary.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Course {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub days: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub area: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub desc: String,

    #[serde(default, deserialize_with = "lenient_string_list")]
    pub prefectures: Vec<String>,
}

impl Post {
    /// Builds a [`Post`] from a loosely-typed record, as returned by the CMS.
    /// Field fallbacks: `date` → `publishedAt` → `createdAt` → `updatedAt`,
    /// `thumbnail` → `eyecatch`, `content` → `body`. Returns `None` for
    /// records without an `id` or a `title`.
    pub fn from_record(record: &Value) -> Option<Post> {
        let field = |names: &[&str]| -> String {
            names
                .iter()
                .filter_map(|name| record.get(*name))
                .map(scalar_to_string)
                .find(|s| !s.is_empty())
                .unwrap_or_default()
        };

        let id = field(&["id"]).trim().to_owned();
        let title = field(&["title"]).trim().to_owned();
        if id.is_empty() || title.is_empty() {
            return None;
        }

        let thumbnail = ["thumbnail", "eyecatch"]
            .iter()
            .filter_map(|name| record.get(*name))
            .find_map(thumbnail_url);

        Some(Post {
            id,
            title,
            date: crate::date::to_ymd_dots(&field(&[
                "date",
                "publishedAt",
                "createdAt",
                "updatedAt",
            ])),
            prefecture: field(&["prefecture"]),
            tags: record.get("tags").map(string_list).unwrap_or_default(),
            thumbnail,
            excerpt: non_empty(field(&["excerpt"])),
            content: field(&["content", "body"]),
        })
    }
}

/// Returns `Some(s)` unless `s` is empty or whitespace.
pub(crate) fn non_empty(s: String) -> Option<String> {
    match s.trim().is_empty() {
        true => None,
        false => Some(s),
    }
}

/// Stringifies scalar values. `null`, arrays and objects become `""`.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Converts a list value into strings, stringifying scalar entries and
/// skipping the rest. Anything that isn't a list is an empty list.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !matches!(item, Value::Null | Value::Array(_) | Value::Object(_)))
            .map(scalar_to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// A thumbnail is either a URL string or an image object with a `url` field.
fn thumbnail_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s.trim().to_owned()),
        Value::Object(obj) => obj.get("url").and_then(thumbnail_url),
        _ => None,
    }
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(&Value::deserialize(deserializer)?))
}

pub(crate) fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_list(&Value::deserialize(deserializer)?))
}

pub(crate) fn lenient_thumbnail<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(thumbnail_url(&Value::deserialize(deserializer)?))
}

/// The read-only data set for one render: posts in baseline order (see
/// [`query::sort_by_date_desc`]) indexed by id, the model courses, and the
/// officially-visited prefecture list.
#[derive(Debug, Default)]
pub struct Catalog {
    posts: Vec<Post>,
    index: HashMap<String, usize>,
    courses: Vec<Course>,
    visited: Vec<String>,
}

impl Catalog {
    /// Builds a catalog. Posts whose id repeats an earlier post's id are
    /// dropped with a warning.
    pub fn new(posts: Vec<Post>, courses: Vec<Course>, visited: Vec<String>) -> Catalog {
        let mut seen: HashSet<String> = HashSet::with_capacity(posts.len());
        let unique: Vec<Post> = posts
            .into_iter()
            .filter(|post| match seen.insert(post.id.clone()) {
                true => true,
                false => {
                    warn!("dropping post with duplicate id `{}`", post.id);
                    false
                }
            })
            .collect();

        let posts: Vec<Post> = query::sort_by_date_desc(&unique)
            .into_iter()
            .cloned()
            .collect();
        let index = posts
            .iter()
            .enumerate()
            .map(|(i, post)| (post.id.clone(), i))
            .collect();

        Catalog {
            posts,
            index,
            courses,
            visited,
        }
    }

    /// All posts, newest first.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Looks up a post by id. `None` means the id is unknown; callers are
    /// expected to fall back to a listing page.
    pub fn post(&self, id: &str) -> Option<&Post> {
        self.index.get(id).map(|&i| &self.posts[i])
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// The official visited list as supplied (not yet normalized).
    pub fn visited(&self) -> &[String] {
        &self.visited
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record_fallbacks() {
        let post = Post::from_record(&json!({
            "id": "kyoto-1",
            "title": " 京都の寺 ",
            "publishedAt": "2024-03-05T01:00:00.000Z",
            "prefecture": "京都府",
            "tags": ["temple", 3, null, {"name": "x"}],
            "eyecatch": {"url": "https://images.example/k.jpg", "height": 10},
            "body": "<p>hi</p>"
        }))
        .unwrap();

        assert_eq!(post.title, "京都の寺");
        assert_eq!(post.date, "2024.03.05");
        assert_eq!(post.tags, vec!["temple", "3"]);
        assert_eq!(post.thumbnail.as_deref(), Some("https://images.example/k.jpg"));
        assert_eq!(post.excerpt, None);
        assert_eq!(post.content, "<p>hi</p>");
    }

    #[test]
    fn test_from_record_requires_id_and_title() {
        assert_eq!(Post::from_record(&json!({"id": "a"})), None);
        assert_eq!(Post::from_record(&json!({"title": "t"})), None);
        assert_eq!(Post::from_record(&json!("not an object")), None);
    }

    #[test]
    fn test_non_list_tags_are_empty() {
        let post = Post::from_record(&json!({"id": "a", "title": "t", "tags": "temple"})).unwrap();
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_course_yaml_is_lenient() {
        let courses: Vec<Course> = serde_yaml::from_str(
            "- title: 関東一周\n  days: 3\n  area: 関東\n  prefectures: [東京都, さいたま]\n\
             - title: 空\n  prefectures: nope\n",
        )
        .unwrap();
        assert_eq!(courses[0].days, "3");
        assert_eq!(courses[0].prefectures, vec!["東京都", "さいたま"]);
        assert!(courses[1].prefectures.is_empty());
        assert_eq!(courses[1].desc, "");
    }

    #[test]
    fn test_catalog_index_and_duplicates() {
        let post = |id: &str, date: &str| Post {
            id: id.to_owned(),
            title: id.to_owned(),
            date: date.to_owned(),
            ..Post::default()
        };
        let catalog = Catalog::new(
            vec![post("a", "2020.01.01"), post("b", "2024.01.01"), post("a", "2030.01.01")],
            Vec::new(),
            Vec::new(),
        );

        let ids: Vec<&str> = catalog.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(catalog.post("a").map(|p| p.date.as_str()), Some("2020.01.01"));
        assert!(catalog.post("missing").is_none());
    }
}
