//! Maps query results onto page view models. A view model is plain data:
//! text, absolute URLs and flags, with no markup. The static generator feeds
//! view models to a template (see [`crate::value`]) and the `komtabi` CLI
//! prints them as JSON for the browser layer, so both render the same text
//! for the same inputs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::json;

use crate::aggregate::{self, TOTAL_PREFECTURES};
use crate::normalize::{normalize_prefecture, normalized_tags};
use crate::post::{Catalog, Course, Post};
use crate::query::{self, Filter, RELATED_LIMIT, TOP_PAGE_POSTS};
use crate::url::{SiteUrls, INDEX_PAGE, TRAVEL_PAGE};

/// The site name, used as the document title suffix.
pub const SITE_NAME: &str = "#コム旅";

/// Excerpt for posts with neither an explicit excerpt nor any text content.
pub const DEFAULT_EXCERPT: &str = "#コム旅の記事。旅の記録を写真と一緒にまとめています。";

/// Shown instead of related posts when there are none.
pub const RELATED_EMPTY: &str = "関連記事はまだありません。";

/// Shown under a model course without posts.
pub const COURSE_RELATED_EMPTY: &str = "関連する旅行記はありません";

/// The placeholder for "nothing yet" in summary widgets.
pub const NONE_MARK: &str = "-";

const LISTING_TITLE: &str = "旅行記";
const TOP_LABEL: &str = "トップ";
const UNTITLED: &str = "記事";
const ALL_TAGS_LABEL: &str = "すべて";
const PREVIOUS_LABEL: &str = "前の記事";
const NEXT_LABEL: &str = "次の記事";

/// Characters of body text used for a generated excerpt.
const EXCERPT_CHARS: usize = 110;

/// Tags shown on a post card.
const CARD_TAGS: usize = 3;

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A label and the URL it points at.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    fn new<L: Into<String>>(label: L, url: &url::Url) -> Link {
        Link {
            label: label.into(),
            url: url.to_string(),
        }
    }
}

/// A post as it appears in lists (listing page, related posts).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub date: String,
    pub url: String,

    /// Normalized prefecture; empty when the post has none.
    pub prefecture: String,

    /// Listing URL for the prefecture, when there is one.
    pub prefecture_url: Option<String>,

    pub thumbnail: Option<String>,
    pub excerpt: String,

    /// Up to three tag links.
    pub tags: Vec<Link>,
}

/// A previous/next navigation link.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NavLink {
    /// `前の記事` or `次の記事`.
    pub label: String,
    pub title: String,
    pub prefecture: String,
    pub thumbnail: Option<String>,
    pub url: String,
}

/// The related-posts section. `Empty` is an expected outcome with its own
/// text, not a failure.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Related {
    Empty { message: String },
    Posts { cards: Vec<PostCard> },
}

/// Rendering options that differ between the browser and the static
/// generator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PostPageOptions {
    /// Maximum number of tags listed on the page. The static generator caps
    /// this at 12 while the browser lists every tag; the difference is kept
    /// on purpose until the two are reconciled.
    pub tag_limit: Option<usize>,
}

/// Everything a post page shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostPage {
    pub id: String,
    pub title: String,

    /// `{title} | #コム旅`.
    pub document_title: String,

    pub date: String,

    /// The post body, as HTML. Passed through to the page unescaped.
    pub content: String,

    pub excerpt: String,
    pub canonical: String,
    pub og_image: String,

    /// Hero image, when the post has a thumbnail.
    pub hero: Option<String>,

    pub tags: Vec<Link>,
    pub breadcrumb: Vec<Link>,

    /// The breadcrumb as schema.org `BreadcrumbList` JSON-LD.
    pub breadcrumb_json: String,

    pub back_to_list: String,
    pub related: Related,
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
}

/// A tag filter chip on the listing page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TagChip {
    pub label: String,
    pub url: String,
    pub active: bool,
}

/// The prefecture header on a filtered listing page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrefectureMeta {
    pub visited: bool,

    /// `✅ 制覇済み` or `🕒 未制覇`.
    pub badge: String,

    /// `記事数：N件`.
    pub article_count: String,

    /// `最新：{date}` of the newest matching post, or `最新：-`.
    pub latest: String,
}

/// A model course as listed on a prefecture's listing page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourseSummary {
    pub title: String,

    /// `{days} / {area} / {prefectures joined by ・}`.
    pub meta: String,

    pub desc: String,
}

/// The model courses through the selected prefecture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrefectureCourses {
    /// `N件`.
    pub count: String,
    pub courses: Vec<CourseSummary>,
}

/// The listing page (`travel.html`) or, with `top`, the top page's list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListingPage {
    pub title: String,

    /// The normalized prefecture filter; empty when inactive.
    pub prefecture: String,

    /// The normalized tag filter; empty when inactive.
    pub tag: String,

    pub posts: Vec<PostCard>,
    pub tag_chips: Vec<TagChip>,
    pub prefecture_meta: Option<PrefectureMeta>,

    /// `None` when no prefecture is selected or no course passes through it.
    pub courses: Option<PrefectureCourses>,
}

/// The visited-prefecture counter on the top page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisitedSummary {
    pub count: usize,
    pub total: usize,
    pub rate_percent: u32,

    /// The most recently visited prefecture, or `-`.
    pub latest: String,

    pub chips: Vec<Link>,
}

/// An entry on the tag index page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TagCard {
    /// `#{tag}`.
    pub label: String,

    /// `{n}件`.
    pub count: String,

    pub url: String,
}

/// A prefecture on the map page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrefectureMarker {
    pub name: String,
    pub visited: bool,
    pub posts: usize,

    /// `{name}：{n}件`.
    pub tooltip: String,

    pub url: String,
}

/// A model course with the posts written along it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourseCard {
    pub title: String,

    /// `{days} / {area}`.
    pub meta: String,

    pub desc: String,
    pub related: Vec<Link>,

    /// Set when `related` is empty.
    pub empty_message: Option<String>,
}

/// The model course page, filtered by area.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoursePage {
    pub area: String,
    pub courses: Vec<CourseCard>,
}

/// The title of a listing page for the active filters (both normalized).
pub fn listing_title(prefecture: &str, tag: &str) -> String {
    match (prefecture.is_empty(), tag.is_empty()) {
        (false, false) => format!("#{} × #{} の旅行記", prefecture, tag),
        (false, true) => format!("#{}の旅行記", prefecture),
        (true, false) => format!("#{}の旅行記", tag),
        (true, true) => LISTING_TITLE.to_owned(),
    }
}

/// The excerpt for a post: the explicit excerpt, else the start of the
/// body's text, else [`DEFAULT_EXCERPT`].
pub fn excerpt(post: &Post) -> String {
    if let Some(excerpt) = post.excerpt.as_deref().map(str::trim) {
        if !excerpt.is_empty() {
            return excerpt.to_owned();
        }
    }
    let plain = strip_tags(&post.content);
    match plain.is_empty() {
        true => DEFAULT_EXCERPT.to_owned(),
        false => plain.chars().take(EXCERPT_CHARS).collect(),
    }
}

/// Removes markup from HTML and collapses whitespace.
fn strip_tags(html: &str) -> String {
    let text = RE_TAG.replace_all(html, " ");
    RE_SPACE.replace_all(&text, " ").trim().to_owned()
}

fn display_title(post: &Post) -> &str {
    match post.title.is_empty() {
        true => UNTITLED,
        false => &post.title,
    }
}

/// Renders breadcrumb links as schema.org `BreadcrumbList` JSON-LD.
pub fn breadcrumb_json_ld(breadcrumb: &[Link]) -> String {
    let items: Vec<serde_json::Value> = breadcrumb
        .iter()
        .enumerate()
        .map(|(i, link)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": link.label,
                "item": link.url,
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": items,
    })
    .to_string()
}

/// Builds view models from a [`Catalog`].
pub struct Presenter<'a> {
    catalog: &'a Catalog,
    urls: &'a SiteUrls,
}

impl<'a> Presenter<'a> {
    pub fn new(catalog: &'a Catalog, urls: &'a SiteUrls) -> Presenter<'a> {
        Presenter { catalog, urls }
    }

    /// `トップ › 旅行記 › {prefecture} › {title}`. The prefecture step is
    /// only present when the post has a prefecture. The last label is the
    /// title as written, even when empty.
    pub fn post_breadcrumb(&self, post: &Post) -> Vec<Link> {
        let mut crumbs = vec![
            Link::new(TOP_LABEL, &self.urls.page(INDEX_PAGE)),
            Link::new(LISTING_TITLE, &self.urls.page(TRAVEL_PAGE)),
        ];
        let prefecture = normalize_prefecture(&post.prefecture);
        if !prefecture.is_empty() {
            let url = self.urls.travel(&prefecture, "");
            crumbs.push(Link::new(prefecture, &url));
        }
        crumbs.push(Link::new(post.title.as_str(), &self.urls.post(&post.id)));
        crumbs
    }

    /// The "back to list" target: the listing filtered by the post's
    /// prefecture and first tag, or the unfiltered listing.
    pub fn back_to_list(&self, post: &Post) -> String {
        let prefecture = normalize_prefecture(&post.prefecture);
        let first_tag = normalized_tags(&post.tags).into_iter().next().unwrap_or_default();
        self.urls.travel(&prefecture, &first_tag).to_string()
    }

    fn tag_link(&self, tag: &str) -> Link {
        Link::new(format!("#{}", tag), &self.urls.travel("", tag))
    }

    fn thumbnail(&self, post: &Post) -> Option<String> {
        post.thumbnail
            .as_deref()
            .and_then(|t| self.urls.asset(t))
            .map(|url| url.to_string())
    }

    /// The card for a post in lists.
    pub fn card(&self, post: &Post) -> PostCard {
        let prefecture = normalize_prefecture(&post.prefecture);
        let prefecture_url = match prefecture.is_empty() {
            true => None,
            false => Some(self.urls.travel(&prefecture, "").to_string()),
        };
        PostCard {
            id: post.id.clone(),
            title: post.title.clone(),
            date: post.date.clone(),
            url: self.urls.post(&post.id).to_string(),
            prefecture,
            prefecture_url,
            thumbnail: self.thumbnail(post),
            excerpt: post.excerpt.clone().unwrap_or_default(),
            tags: normalized_tags(&post.tags)
                .iter()
                .take(CARD_TAGS)
                .map(|t| self.tag_link(t))
                .collect(),
        }
    }

    fn nav_link(&self, post: &Post, label: &str) -> NavLink {
        NavLink {
            label: label.to_owned(),
            title: post.title.clone(),
            prefecture: normalize_prefecture(&post.prefecture),
            thumbnail: self.thumbnail(post),
            url: self.urls.post(&post.id).to_string(),
        }
    }

    /// The related-posts section for a post.
    pub fn related(&self, post: &Post) -> Related {
        let related = query::related_posts(post, self.catalog.posts(), RELATED_LIMIT);
        match related.is_empty() {
            true => Related::Empty {
                message: RELATED_EMPTY.to_owned(),
            },
            false => Related::Posts {
                cards: related.into_iter().map(|p| self.card(p)).collect(),
            },
        }
    }

    /// Builds the page for `post`. Previous/next follow the catalog's
    /// baseline order.
    pub fn post_page(&self, post: &Post, options: PostPageOptions) -> PostPage {
        let sorted: Vec<&Post> = self.catalog.posts().iter().collect();
        let adjacent = query::adjacent(post, &sorted);

        let mut tags = normalized_tags(&post.tags);
        if let Some(limit) = options.tag_limit {
            tags.truncate(limit);
        }

        let breadcrumb = self.post_breadcrumb(post);
        // Structured data always names the page, so untitled posts get `記事`.
        let mut json_items = breadcrumb.clone();
        if let Some(last) = json_items.last_mut() {
            last.label = display_title(post).to_owned();
        }
        PostPage {
            id: post.id.clone(),
            title: post.title.clone(),
            document_title: format!("{} | {}", display_title(post), SITE_NAME),
            date: post.date.clone(),
            content: post.content.clone(),
            excerpt: excerpt(post),
            canonical: self.urls.post(&post.id).to_string(),
            og_image: self.urls.og_image(post.thumbnail.as_deref()).to_string(),
            hero: self.thumbnail(post),
            tags: tags.iter().map(|t| self.tag_link(t)).collect(),
            breadcrumb_json: breadcrumb_json_ld(&json_items),
            breadcrumb,
            back_to_list: self.back_to_list(post),
            related: self.related(post),
            previous: adjacent.previous.map(|p| self.nav_link(p, PREVIOUS_LABEL)),
            next: adjacent.next.map(|p| self.nav_link(p, NEXT_LABEL)),
        }
    }

    /// Builds the listing page for raw `prefecture`/`tag` query values. With
    /// `top`, only the newest three matching posts are listed.
    pub fn listing(&self, prefecture: &str, tag: &str, top: bool) -> ListingPage {
        let filter = Filter::new(prefecture, tag);
        let mut posts = query::filter_posts(self.catalog.posts(), &filter);
        if top {
            posts.truncate(TOP_PAGE_POSTS);
        }

        // Chip links keep the prefecture exactly as it was requested.
        let raw_prefecture = prefecture.trim();
        let mut tag_chips = vec![TagChip {
            label: ALL_TAGS_LABEL.to_owned(),
            url: self.urls.travel(raw_prefecture, "").to_string(),
            active: filter.tag.is_empty(),
        }];
        tag_chips.extend(
            aggregate::tag_counts(self.catalog.posts(), &filter.prefecture)
                .into_iter()
                .map(|(tag, count)| TagChip {
                    label: format!("#{} ({})", tag, count),
                    url: self.urls.travel(raw_prefecture, &tag).to_string(),
                    active: tag == filter.tag,
                }),
        );

        let (prefecture_meta, courses) = match filter.prefecture.is_empty() {
            true => (None, None),
            false => (
                Some(self.prefecture_meta(&filter.prefecture, &posts)),
                self.prefecture_courses(&filter.prefecture),
            ),
        };

        ListingPage {
            title: listing_title(&filter.prefecture, &filter.tag),
            prefecture: filter.prefecture.clone(),
            tag: filter.tag.clone(),
            posts: posts.into_iter().map(|p| self.card(p)).collect(),
            tag_chips,
            prefecture_meta,
            courses,
        }
    }

    fn prefecture_meta(&self, prefecture: &str, posts: &[&Post]) -> PrefectureMeta {
        let visited = aggregate::visited_prefectures(self.catalog.visited())
            .iter()
            .any(|p| p == prefecture);
        let latest = posts
            .first()
            .map(|p| p.date.as_str())
            .filter(|d| !d.is_empty())
            .unwrap_or(NONE_MARK);
        PrefectureMeta {
            visited,
            badge: match visited {
                true => String::from("✅ 制覇済み"),
                false => String::from("🕒 未制覇"),
            },
            article_count: format!("記事数：{}件", posts.len()),
            latest: format!("最新：{}", latest),
        }
    }

    fn prefecture_courses(&self, prefecture: &str) -> Option<PrefectureCourses> {
        let courses = query::related_courses(self.catalog.courses(), prefecture);
        if courses.is_empty() {
            return None;
        }
        Some(PrefectureCourses {
            count: format!("{}件", courses.len()),
            courses: courses
                .into_iter()
                .map(|course| {
                    let prefectures: Vec<String> = course
                        .prefectures
                        .iter()
                        .map(|p| normalize_prefecture(p))
                        .filter(|p| !p.is_empty())
                        .collect();
                    CourseSummary {
                        title: course.title.clone(),
                        meta: format!(
                            "{} / {} / {}",
                            course.days,
                            course.area,
                            prefectures.join("・")
                        ),
                        desc: course.desc.clone(),
                    }
                })
                .collect(),
        })
    }

    /// The visited-prefecture counter.
    pub fn visited_summary(&self) -> VisitedSummary {
        let stats = aggregate::visited_stats(self.catalog.visited(), self.catalog.posts());
        VisitedSummary {
            count: stats.count,
            total: TOTAL_PREFECTURES,
            rate_percent: stats.rate_percent,
            latest: stats
                .most_recent_visited
                .unwrap_or_else(|| NONE_MARK.to_owned()),
            chips: stats
                .prefectures
                .iter()
                .map(|p| Link::new(p.as_str(), &self.urls.travel(p, "")))
                .collect(),
        }
    }

    /// The tag index: every tag with its post count.
    pub fn tag_index(&self) -> Vec<TagCard> {
        aggregate::tag_counts(self.catalog.posts(), "")
            .into_iter()
            .map(|(tag, count)| TagCard {
                label: format!("#{}", tag),
                count: format!("{}件", count),
                url: self.urls.travel("", &tag).to_string(),
            })
            .collect()
    }

    /// Markers for the prefecture map: every visited prefecture and every
    /// prefecture with posts. Only visited prefectures are clickable on the
    /// map, but all of them carry counts.
    pub fn prefecture_map(&self) -> Vec<PrefectureMarker> {
        let visited = aggregate::visited_prefectures(self.catalog.visited());
        let counts = aggregate::prefecture_counts(self.catalog.posts());

        let mut names: Vec<String> = visited.clone();
        for (name, _) in &counts {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        let order = aggregate::JapaneseOrder::new();
        names.sort_by(|a, b| order.compare(a, b));

        names
            .into_iter()
            .map(|name| {
                let posts = counts
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, count)| *count)
                    .unwrap_or(0);
                PrefectureMarker {
                    visited: visited.contains(&name),
                    posts,
                    tooltip: format!("{}：{}件", name, posts),
                    url: self.urls.travel(&name, "").to_string(),
                    name,
                }
            })
            .collect()
    }

    /// The model course page for `area` (`all` for every area).
    pub fn course_page(&self, area: &str) -> CoursePage {
        CoursePage {
            area: area.to_owned(),
            courses: query::courses_in_area(self.catalog.courses(), area)
                .into_iter()
                .map(|course| self.course_card(course))
                .collect(),
        }
    }

    fn course_card(&self, course: &Course) -> CourseCard {
        let related: Vec<Link> = query::posts_for_course(course, self.catalog.posts())
            .into_iter()
            .map(|p| Link::new(p.title.as_str(), &self.urls.post(&p.id)))
            .collect();
        CourseCard {
            title: course.title.clone(),
            meta: format!("{} / {}", course.days, course.area),
            desc: course.desc.clone(),
            empty_message: match related.is_empty() {
                true => Some(COURSE_RELATED_EMPTY.to_owned()),
                false => None,
            },
            related,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn post(id: &str, date: &str, prefecture: &str, tags: &[&str]) -> Post {
        Post {
            id: id.to_owned(),
            title: format!("Title {}", id),
            date: date.to_owned(),
            prefecture: prefecture.to_owned(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Post::default()
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                post("a", "2024.01.10", "東京都", &["temple", "food"]),
                post("b", "2024.01.10", "東京都", &["temple"]),
                post("c", "2023.05.01", "", &[]),
                post("d", "2023.01.01", "大阪府", &["food"]),
            ],
            vec![Course {
                title: String::from("東京散歩"),
                days: String::from("1日"),
                area: String::from("関東"),
                desc: String::from("歩く"),
                prefectures: vec![String::from("東京都"), String::from("さいたま")],
            }],
            vec![String::from("東京都"), String::from("北海道")],
        )
    }

    fn urls() -> SiteUrls {
        SiteUrls::parse("https://komtabi.example/").unwrap()
    }

    #[test]
    fn test_listing_title() {
        assert_eq!(listing_title("東京", "food"), "#東京 × #food の旅行記");
        assert_eq!(listing_title("東京", ""), "#東京の旅行記");
        assert_eq!(listing_title("", "food"), "#foodの旅行記");
        assert_eq!(listing_title("", ""), "旅行記");
    }

    #[test]
    fn test_excerpt() {
        let mut p = post("a", "", "", &[]);
        assert_eq!(excerpt(&p), DEFAULT_EXCERPT);

        p.content = String::from("<p>Hello</p>\n<p>  world </p>");
        assert_eq!(excerpt(&p), "Hello world");

        p.content = "あ".repeat(200);
        assert_eq!(excerpt(&p).chars().count(), 110);

        p.excerpt = Some(String::from(" short "));
        assert_eq!(excerpt(&p), "short");
    }

    #[test]
    fn test_breadcrumb() {
        let catalog = catalog();
        let urls = urls();
        let presenter = Presenter::new(&catalog, &urls);

        let with_pref = presenter.post_breadcrumb(catalog.post("a").unwrap());
        let labels: Vec<&str> = with_pref.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["トップ", "旅行記", "東京", "Title a"]);
        assert_eq!(with_pref[3].url, "https://komtabi.example/posts/a.html");

        let without = presenter.post_breadcrumb(catalog.post("c").unwrap());
        assert_eq!(without.len(), 3);

        let json: serde_json::Value =
            serde_json::from_str(&breadcrumb_json_ld(&with_pref)).unwrap();
        assert_eq!(json["itemListElement"][2]["position"], 3);
        assert_eq!(json["itemListElement"][2]["name"], "東京");
    }

    #[test]
    fn test_untitled_breadcrumb() {
        let mut untitled = post("u", "2024.01.01", "", &[]);
        untitled.title = String::new();
        let catalog = Catalog::new(vec![untitled], Vec::new(), Vec::new());
        let urls = urls();
        let presenter = Presenter::new(&catalog, &urls);

        let page = presenter.post_page(catalog.post("u").unwrap(), PostPageOptions::default());
        assert_eq!(page.breadcrumb.last().map(|l| l.label.as_str()), Some(""));
        assert_eq!(page.document_title, "記事 | #コム旅");
        let json: serde_json::Value = serde_json::from_str(&page.breadcrumb_json).unwrap();
        assert_eq!(json["itemListElement"][2]["name"], "記事");
    }

    #[test]
    fn test_back_to_list() {
        let catalog = catalog();
        let urls = urls();
        let presenter = Presenter::new(&catalog, &urls);
        assert_eq!(
            presenter.back_to_list(catalog.post("c").unwrap()),
            "https://komtabi.example/travel.html"
        );
        assert_eq!(
            presenter.back_to_list(catalog.post("d").unwrap()),
            urls.travel("大阪", "food").to_string()
        );
    }

    #[test]
    fn test_post_page_navigation_and_related() {
        let catalog = catalog();
        let urls = urls();
        let presenter = Presenter::new(&catalog, &urls);

        let page = presenter.post_page(catalog.post("b").unwrap(), PostPageOptions::default());
        assert_eq!(page.document_title, "Title b | #コム旅");
        assert_eq!(page.previous.as_ref().map(|n| n.title.as_str()), Some("Title c"));
        assert_eq!(page.previous.as_ref().map(|n| n.label.as_str()), Some("前の記事"));
        assert_eq!(page.next.as_ref().map(|n| n.title.as_str()), Some("Title a"));
        match &page.related {
            Related::Posts { cards } => {
                let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(ids, vec!["a"]);
            }
            Related::Empty { .. } => panic!("expected related posts"),
        }

        let lonely = presenter.post_page(catalog.post("c").unwrap(), PostPageOptions::default());
        assert_eq!(
            lonely.related,
            Related::Empty {
                message: String::from(RELATED_EMPTY)
            }
        );
        assert_eq!(lonely.og_image, "https://komtabi.example/img/ogp.jpg");
        assert_eq!(lonely.hero, None);
    }

    #[test]
    fn test_tag_limit() {
        let tags: Vec<String> = (0..20).map(|i| format!("t{}", i)).collect();
        let mut many = post("m", "2024.01.01", "", &[]);
        many.tags = tags;
        let catalog = Catalog::new(vec![many], Vec::new(), Vec::new());
        let urls = urls();
        let presenter = Presenter::new(&catalog, &urls);
        let post = catalog.post("m").unwrap();

        let all = presenter.post_page(post, PostPageOptions::default());
        let limited = presenter.post_page(post, PostPageOptions { tag_limit: Some(12) });
        assert_eq!(all.tags.len(), 20);
        assert_eq!(limited.tags.len(), 12);
    }

    #[test]
    fn test_listing_with_prefecture() {
        let catalog = catalog();
        let urls = urls();
        let presenter = Presenter::new(&catalog, &urls);

        let page = presenter.listing("東京都", "", false);
        assert_eq!(page.title, "#東京の旅行記");
        let ids: Vec<&str> = page.posts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let chips: Vec<(&str, bool)> = page
            .tag_chips
            .iter()
            .map(|c| (c.label.as_str(), c.active))
            .collect();
        assert_eq!(
            chips,
            vec![("すべて", true), ("#food (1)", false), ("#temple (2)", false)]
        );

        let meta = page.prefecture_meta.unwrap();
        assert!(meta.visited);
        assert_eq!(meta.badge, "✅ 制覇済み");
        assert_eq!(meta.article_count, "記事数：2件");
        assert_eq!(meta.latest, "最新：2024.01.10");

        let courses = page.courses.unwrap();
        assert_eq!(courses.count, "1件");
        assert_eq!(courses.courses[0].meta, "1日 / 関東 / 東京・埼玉");
    }

    #[test]
    fn test_listing_unmatched_and_top() {
        let catalog = catalog();
        let urls = urls();
        let presenter = Presenter::new(&catalog, &urls);

        let none = presenter.listing("沖縄", "", false);
        assert!(none.posts.is_empty());
        let meta = none.prefecture_meta.unwrap();
        assert!(!meta.visited);
        assert_eq!(meta.latest, "最新：-");
        assert!(none.courses.is_none());

        let top = presenter.listing("", "", true);
        assert_eq!(top.posts.len(), 3);
        assert!(top.prefecture_meta.is_none());
        assert_eq!(top.title, "旅行記");
    }

    #[test]
    fn test_visited_summary_and_tag_index() {
        let catalog = catalog();
        let urls = urls();
        let presenter = Presenter::new(&catalog, &urls);

        let summary = presenter.visited_summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.rate_percent, 4);
        assert_eq!(summary.latest, "東京");
        assert_eq!(summary.chips.len(), 2);

        let labels: Vec<String> = presenter.tag_index().into_iter().map(|t| t.count).collect();
        assert_eq!(labels, vec!["2件", "2件"]);
    }

    #[test]
    fn test_prefecture_map() {
        let catalog = catalog();
        let urls = urls();
        let presenter = Presenter::new(&catalog, &urls);
        let markers = presenter.prefecture_map();
        let tokyo = markers.iter().find(|m| m.name == "東京").unwrap();
        assert!(tokyo.visited);
        assert_eq!(tokyo.tooltip, "東京：2件");
        let hokkaido = markers.iter().find(|m| m.name == "北海道").unwrap();
        assert_eq!(hokkaido.posts, 0);
        let osaka = markers.iter().find(|m| m.name == "大阪").unwrap();
        assert!(!osaka.visited);
    }

    #[test]
    fn test_course_page() {
        let catalog = catalog();
        let urls = urls();
        let presenter = Presenter::new(&catalog, &urls);

        let page = presenter.course_page("all");
        assert_eq!(page.courses.len(), 1);
        let labels: Vec<&str> = page.courses[0].related.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Title a", "Title b"]);
        assert_eq!(page.courses[0].empty_message, None);

        assert!(presenter.course_page("九州").courses.is_empty());
    }
}
