//! URL construction for the site's pages. All links in view models are
//! absolute and built from the configured site root, so the same view renders
//! identically in a post page under `/posts/` and in a top-level page.

use url::{ParseError, Url};

/// The site's top-level pages.
pub const INDEX_PAGE: &str = "index.html";
pub const TRAVEL_PAGE: &str = "travel.html";
pub const COURSE_PAGE: &str = "modelcourse.html";
pub const PREFECTURES_PAGE: &str = "prefectures.html";
pub const CONTACT_PAGE: &str = "contact.html";

/// The directory post pages are written to, relative to the site root.
pub const POSTS_DIRECTORY: &str = "posts";

/// The image used for social cards when a post has no thumbnail.
const DEFAULT_OG_IMAGE: &str = "img/ogp.jpg";

/// Builds page URLs relative to a site root.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteUrls {
    root: Url,
}

impl SiteUrls {
    /// Creates a builder for `root`. The root's path is treated as a
    /// directory whether or not it ends in `/`.
    pub fn new(mut root: Url) -> Result<SiteUrls, ParseError> {
        if root.cannot_be_a_base() {
            return Err(ParseError::RelativeUrlWithoutBase);
        }
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        root.set_query(None);
        root.set_fragment(None);
        Ok(SiteUrls { root })
    }

    /// Parses `root` and calls [`SiteUrls::new`].
    pub fn parse(root: &str) -> Result<SiteUrls, ParseError> {
        SiteUrls::new(Url::parse(root)?)
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// The URL of a file under the root, e.g. `page("travel.html")`.
    pub fn page(&self, name: &str) -> Url {
        self.with_segments(&[name])
    }

    /// The listing URL for a prefecture and/or tag. Empty values are left
    /// out of the query; with neither, this is the plain listing page.
    pub fn travel(&self, prefecture: &str, tag: &str) -> Url {
        let mut url = self.page(TRAVEL_PAGE);
        if !prefecture.is_empty() || !tag.is_empty() {
            let mut query = url.query_pairs_mut();
            if !prefecture.is_empty() {
                query.append_pair("pref", prefecture);
            }
            if !tag.is_empty() {
                query.append_pair("tag", tag);
            }
        }
        url
    }

    /// The static page URL for a post: `posts/{id}.html`.
    pub fn post(&self, id: &str) -> Url {
        self.with_segments(&[POSTS_DIRECTORY, &format!("{}.html", id)])
    }

    /// Resolves an asset reference from post data. `http(s)` URLs are kept,
    /// root-relative paths (`/img/a.jpg`) resolve against the site's origin
    /// and other relative paths against the site root. Empty references
    /// resolve to `None`.
    pub fn asset(&self, src: &str) -> Option<Url> {
        let src = src.trim();
        if src.is_empty() {
            return None;
        }
        let lower = src.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Url::parse(src).ok();
        }
        self.root.join(src.trim_start_matches("./")).ok()
    }

    /// The social card image: the thumbnail when there is one, else the
    /// site default.
    pub fn og_image(&self, thumbnail: Option<&str>) -> Url {
        match thumbnail.and_then(|t| self.asset(t)) {
            Some(url) => url,
            None => self.page(DEFAULT_OG_IMAGE),
        }
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.root.clone();
        // `new` rejects cannot-be-a-base roots, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.extend(segment.split('/'));
            }
        }
        url
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn urls() -> SiteUrls {
        SiteUrls::parse("https://komtabi.example").unwrap()
    }

    #[test]
    fn test_travel() {
        assert_eq!(
            urls().travel("", "").as_str(),
            "https://komtabi.example/travel.html"
        );
        assert_eq!(
            urls().travel("", "temple").as_str(),
            "https://komtabi.example/travel.html?tag=temple"
        );
        let both = urls().travel("東京", "food");
        let pairs: Vec<(String, String)> = both.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                (String::from("pref"), String::from("東京")),
                (String::from("tag"), String::from("food")),
            ]
        );
    }

    #[test]
    fn test_root_with_path() {
        let urls = SiteUrls::parse("https://example.org/blog").unwrap();
        assert_eq!(urls.post("a").as_str(), "https://example.org/blog/posts/a.html");
        assert_eq!(urls.page(INDEX_PAGE).as_str(), "https://example.org/blog/index.html");
    }

    #[test]
    fn test_post_id_is_escaped() {
        assert_eq!(
            urls().post("a b").as_str(),
            "https://komtabi.example/posts/a%20b.html"
        );
    }

    #[test]
    fn test_asset() {
        let urls = SiteUrls::parse("https://example.org/blog/").unwrap();
        assert_eq!(urls.asset(""), None);
        assert_eq!(
            urls.asset("https://cdn.example/x.jpg").unwrap().as_str(),
            "https://cdn.example/x.jpg"
        );
        assert_eq!(
            urls.asset("/img/x.jpg").unwrap().as_str(),
            "https://example.org/img/x.jpg"
        );
        assert_eq!(
            urls.asset("./img/x.jpg").unwrap().as_str(),
            "https://example.org/blog/img/x.jpg"
        );
        assert_eq!(
            urls.og_image(None).as_str(),
            "https://example.org/blog/img/ogp.jpg"
        );
    }

    #[test]
    fn test_rejects_non_base() {
        assert!(SiteUrls::parse("mailto:someone@example.org").is_err());
    }
}
