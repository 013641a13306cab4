//! Frequency counts and visited-prefecture statistics for the summary
//! widgets (tag chips, tag index, prefecture map, "conquest" counter).

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use log::warn;
use serde::Serialize;

use crate::normalize::{normalize_prefecture, normalized_tags};
use crate::post::Post;
use crate::query;

/// The number of top-level prefectures in Japan. The visited rate is
/// measured against this.
pub const TOTAL_PREFECTURES: usize = 47;

/// Orders strings the way a Japanese reader expects (kana by reading, Latin
/// case-insensitively first) rather than by code point.
pub struct JapaneseOrder {
    collator: Option<Collator>,
}

impl JapaneseOrder {
    pub fn new() -> JapaneseOrder {
        let collator = match Collator::try_new(&locale!("ja").into(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!("Japanese collation unavailable, using code point order: {}", e);
                None
            }
        };
        JapaneseOrder { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }

    /// Sorts `(key, count)` pairs by key.
    fn sort_counts(&self, counts: HashMap<String, usize>) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
        counts.sort_by(|(a, _), (b, _)| self.compare(a, b));
        counts
    }
}

impl Default for JapaneseOrder {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts tag occurrences across posts, restricted to posts in `scope` (a
/// raw prefecture name) when it's non-empty. Tags are normalized and empty
/// tags are skipped. The result is in Japanese collation order.
pub fn tag_counts(posts: &[Post], scope: &str) -> Vec<(String, usize)> {
    let scope = normalize_prefecture(scope);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for post in posts
        .iter()
        .filter(|p| scope.is_empty() || normalize_prefecture(&p.prefecture) == scope)
    {
        for tag in normalized_tags(&post.tags) {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    JapaneseOrder::new().sort_counts(counts)
}

/// Counts posts per normalized prefecture, skipping posts without one. The
/// result is in Japanese collation order.
pub fn prefecture_counts(posts: &[Post]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for prefecture in posts.iter().map(|p| normalize_prefecture(&p.prefecture)) {
        if !prefecture.is_empty() {
            *counts.entry(prefecture).or_insert(0) += 1;
        }
    }
    JapaneseOrder::new().sort_counts(counts)
}

/// Normalizes the official visited list, dropping empty names and later
/// duplicates while keeping first-occurrence order.
pub fn visited_prefectures<S: AsRef<str>>(official: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    official
        .iter()
        .map(|name| normalize_prefecture(name.as_ref()))
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

/// Statistics for the visited-prefecture counter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisitedStats {
    /// Number of distinct visited prefectures.
    pub count: usize,

    /// `count` as a rounded percentage of [`TOTAL_PREFECTURES`].
    pub rate_percent: u32,

    /// The prefecture of the newest post in a visited prefecture, else the
    /// last prefecture on the official list, else `None`.
    pub most_recent_visited: Option<String>,

    /// The normalized, de-duplicated official list.
    pub prefectures: Vec<String>,
}

/// Computes [`VisitedStats`] from the official list and the posts.
pub fn visited_stats<S: AsRef<str>>(official: &[S], posts: &[Post]) -> VisitedStats {
    let prefectures = visited_prefectures(official);
    let visited: HashSet<&str> = prefectures.iter().map(String::as_str).collect();

    let most_recent_visited = query::sort_by_date_desc(posts)
        .into_iter()
        .map(|post| normalize_prefecture(&post.prefecture))
        .find(|prefecture| visited.contains(prefecture.as_str()))
        .or_else(|| prefectures.last().cloned());

    VisitedStats {
        count: prefectures.len(),
        rate_percent: visited_rate(prefectures.len()),
        most_recent_visited,
        prefectures,
    }
}

/// `round(count / TOTAL_PREFECTURES * 100)`, rounding halves up.
fn visited_rate(count: usize) -> u32 {
    ((count as f64 / TOTAL_PREFECTURES as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod test {
    use super::*;

    fn post(date: &str, prefecture: &str, tags: &[&str]) -> Post {
        Post {
            id: format!("{}-{}", date, prefecture),
            date: date.to_owned(),
            prefecture: prefecture.to_owned(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Post::default()
        }
    }

    #[test]
    fn test_tag_counts() {
        let posts = vec![
            post("2024.01.01", "東京都", &["food", " temple ", ""]),
            post("2024.01.02", "大阪府", &["food"]),
            post("2024.01.03", "東京", &["food", "night"]),
        ];
        assert_eq!(
            tag_counts(&posts, ""),
            vec![
                (String::from("food"), 3),
                (String::from("night"), 1),
                (String::from("temple"), 1),
            ]
        );
        assert_eq!(
            tag_counts(&posts, "とうきょう"),
            vec![
                (String::from("food"), 2),
                (String::from("night"), 1),
                (String::from("temple"), 1),
            ]
        );
        assert!(tag_counts(&posts, "沖縄").is_empty());
    }

    #[test]
    fn test_collation_is_not_code_point_order() {
        let order = JapaneseOrder::new();
        assert_eq!(order.compare("apple", "Banana"), Ordering::Less);
        assert_eq!(order.compare("カ", "き"), Ordering::Less);
    }

    #[test]
    fn test_prefecture_counts() {
        let posts = vec![
            post("2024.01.01", "東京都", &[]),
            post("2024.01.02", "とうきょう", &[]),
            post("2024.01.03", "", &[]),
        ];
        assert_eq!(prefecture_counts(&posts), vec![(String::from("東京"), 2)]);
    }

    #[test]
    fn test_rate_for_ten() {
        let official: Vec<String> = (0..10).map(|i| format!("県{}", i)).collect();
        let stats = visited_stats(&official, &[]);
        assert_eq!(stats.count, 10);
        assert_eq!(stats.rate_percent, 21);
    }

    #[test]
    fn test_fallback_to_last_official() {
        let stats = visited_stats(&["東京都", "さいたま"], &[]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.rate_percent, 4);
        assert_eq!(stats.most_recent_visited.as_deref(), Some("埼玉"));
        assert_eq!(stats.prefectures, vec!["東京", "埼玉"]);
    }

    #[test]
    fn test_most_recent_from_posts() {
        let posts = vec![
            post("2024.05.01", "沖縄県", &[]),
            post("2024.04.01", "東京都", &[]),
            post("2024.06.01", "長野県", &[]),
        ];
        let stats = visited_stats(&["東京", "沖縄", "東京都"], &posts);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.most_recent_visited.as_deref(), Some("沖縄"));
    }

    #[test]
    fn test_empty_everything() {
        let stats = visited_stats::<&str>(&[], &[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.rate_percent, 0);
        assert_eq!(stats.most_recent_visited, None);
    }
}
