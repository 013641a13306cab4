//! Filtering and ordering over posts and courses. Everything here borrows
//! from the caller's slices and returns references in a new order; nothing
//! is copied or mutated.
//!
//! The baseline order used throughout is date descending with ties kept in
//! input order ([`sort_by_date_desc`]).

use std::collections::HashSet;

use crate::date;
use crate::normalize::{normalize_prefecture, normalize_tag, normalized_tags};
use crate::post::{Course, Post};

/// The number of related posts shown under a post.
pub const RELATED_LIMIT: usize = 3;

/// The number of posts on the top page.
pub const TOP_PAGE_POSTS: usize = 3;

/// Optional prefecture and tag filters. Empty strings mean "no filter".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    pub prefecture: String,
    pub tag: String,
}

impl Filter {
    /// Builds a filter from raw (unnormalized) values.
    pub fn new(prefecture: &str, tag: &str) -> Filter {
        Filter {
            prefecture: normalize_prefecture(prefecture),
            tag: normalize_tag(tag),
        }
    }

    fn matches(&self, post: &Post) -> bool {
        (self.prefecture.is_empty() || normalize_prefecture(&post.prefecture) == self.prefecture)
            && (self.tag.is_empty() || has_tag(post, &self.tag))
    }
}

/// Whether `post` carries `tag` once its tags are normalized.
pub fn has_tag(post: &Post, tag: &str) -> bool {
    !tag.is_empty() && post.tags.iter().any(|t| normalize_tag(t) == tag)
}

/// Sorts posts newest first. The sort is stable, so posts with equal (or
/// equally unparseable) dates keep their input order.
pub fn sort_by_date_desc<'a, I>(posts: I) -> Vec<&'a Post>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut keyed: Vec<(i64, &Post)> = posts
        .into_iter()
        .map(|post| (date::sort_key(&post.date), post))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
    keyed.into_iter().map(|(_, post)| post).collect()
}

/// Returns the posts matching `filter` in baseline order. Both filters must
/// match when both are set. An unmatched filter yields an empty list.
pub fn filter_posts<'a>(posts: &'a [Post], filter: &Filter) -> Vec<&'a Post> {
    sort_by_date_desc(posts.iter().filter(|post| filter.matches(post)))
}

/// The newest `n` posts.
pub fn latest(posts: &[Post], n: usize) -> Vec<&Post> {
    let mut sorted = sort_by_date_desc(posts);
    sorted.truncate(n);
    sorted
}

/// Returns up to `limit` other posts sharing at least one tag with `post`,
/// newest first. A post without tags has no related posts.
pub fn related_posts<'a>(post: &Post, all: &'a [Post], limit: usize) -> Vec<&'a Post> {
    let tags: HashSet<String> = normalized_tags(&post.tags).into_iter().collect();
    if tags.is_empty() {
        return Vec::new();
    }

    let mut related = sort_by_date_desc(all.iter().filter(|other| {
        other.id != post.id && normalized_tags(&other.tags).iter().any(|t| tags.contains(t))
    }));
    related.truncate(limit);
    related
}

/// The neighbours of a post in a baseline-sorted list. `previous` is the
/// older post (the one after it in the list) and `next` the newer one (the
/// one before it).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Adjacent<'a> {
    pub previous: Option<&'a Post>,
    pub next: Option<&'a Post>,
}

/// Finds the neighbours of `post` (matched by id) in `sorted`. A post that
/// isn't in the list has no neighbours.
pub fn adjacent<'a>(post: &Post, sorted: &[&'a Post]) -> Adjacent<'a> {
    match sorted.iter().position(|p| p.id == post.id) {
        None => Adjacent::default(),
        Some(i) => Adjacent {
            previous: sorted.get(i + 1).copied(),
            next: match i {
                0 => None,
                _ => sorted.get(i - 1).copied(),
            },
        },
    }
}

/// The courses passing through the (already normalized) prefecture, in
/// input order.
pub fn related_courses<'a>(courses: &'a [Course], prefecture: &str) -> Vec<&'a Course> {
    if prefecture.is_empty() {
        return Vec::new();
    }
    courses
        .iter()
        .filter(|course| {
            course
                .prefectures
                .iter()
                .any(|p| normalize_prefecture(p) == prefecture)
        })
        .collect()
}

/// The posts written in any of a course's prefectures, newest first.
pub fn posts_for_course<'a>(course: &Course, posts: &'a [Post]) -> Vec<&'a Post> {
    let prefectures: HashSet<String> = course
        .prefectures
        .iter()
        .map(|p| normalize_prefecture(p))
        .filter(|p| !p.is_empty())
        .collect();
    sort_by_date_desc(
        posts
            .iter()
            .filter(|post| prefectures.contains(&normalize_prefecture(&post.prefecture))),
    )
}

/// The area selector value that shows every course.
pub const ALL_AREAS: &str = "all";

/// Courses in `area`, or all of them for [`ALL_AREAS`] or an empty area.
pub fn courses_in_area<'a>(courses: &'a [Course], area: &str) -> Vec<&'a Course> {
    courses
        .iter()
        .filter(|course| area.is_empty() || area == ALL_AREAS || course.area == area)
        .collect()
}
