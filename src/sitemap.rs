//! Writes `sitemap.xml`: the site's top-level pages followed by every post.

use std::fmt;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::date;
use crate::post::Catalog;
use crate::url::{SiteUrls, CONTACT_PAGE, COURSE_PAGE, INDEX_PAGE, PREFECTURES_PAGE, TRAVEL_PAGE};

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// The top-level pages listed when the configuration doesn't name any.
pub const DEFAULT_STATIC_PAGES: [&str; 5] = [
    INDEX_PAGE,
    TRAVEL_PAGE,
    COURSE_PAGE,
    PREFECTURES_PAGE,
    CONTACT_PAGE,
];

/// One `<url>` element.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub loc: String,

    /// `YYYY-MM-DD`, only for posts with a parseable date.
    pub lastmod: Option<String>,

    pub changefreq: &'static str,
    pub priority: &'static str,
}

/// Lists the static pages (the home page first at priority `1.0`, the rest
/// at `0.7`) and then every post in baseline order.
pub fn entries<S: AsRef<str>>(catalog: &Catalog, urls: &SiteUrls, static_pages: &[S]) -> Vec<Entry> {
    let pages = static_pages.iter().map(|page| {
        let page = page.as_ref();
        Entry {
            loc: urls.page(page).to_string(),
            lastmod: None,
            changefreq: "weekly",
            priority: match page == INDEX_PAGE {
                true => "1.0",
                false => "0.7",
            },
        }
    });
    let posts = catalog.posts().iter().map(|post| Entry {
        loc: urls.post(&post.id).to_string(),
        lastmod: date::to_iso_date(&post.date),
        changefreq: "yearly",
        priority: "0.6",
    });
    pages.chain(posts).collect()
}

/// Serializes `entries` as a sitemap document.
pub fn write_sitemap<W: Write>(entries: &[Entry], w: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(w, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NAMESPACE)]),
    ))?;
    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        text_element(&mut writer, "loc", &entry.loc)?;
        if let Some(lastmod) = &entry.lastmod {
            text_element(&mut writer, "lastmod", lastmod)?;
        }
        text_element(&mut writer, "changefreq", entry.changefreq)?;
        text_element(&mut writer, "priority", entry.priority)?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing the sitemap.
#[derive(Debug)]
pub enum Error {
    /// Returned when the XML writer fails.
    Xml(quick_xml::Error),

    /// Returned for I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Xml(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Xml(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Error {
        Error::Xml(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::Post;

    fn catalog() -> Catalog {
        let post = |id: &str, date: &str| Post {
            id: id.to_owned(),
            title: id.to_owned(),
            date: date.to_owned(),
            ..Post::default()
        };
        Catalog::new(
            vec![post("undated", ""), post("a&b", "2024.01.10")],
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_entries() {
        let urls = SiteUrls::parse("https://komtabi.example/").unwrap();
        let entries = entries(&catalog(), &urls, &DEFAULT_STATIC_PAGES);
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].loc, "https://komtabi.example/index.html");
        assert_eq!(entries[0].priority, "1.0");
        assert_eq!(entries[1].priority, "0.7");
        assert_eq!(entries[5].loc, "https://komtabi.example/posts/a&b.html");
        assert_eq!(entries[5].lastmod.as_deref(), Some("2024-01-10"));
        assert_eq!(entries[6].lastmod, None);
        assert_eq!(entries[6].changefreq, "yearly");
    }

    #[test]
    fn test_write_sitemap() {
        let urls = SiteUrls::parse("https://komtabi.example/").unwrap();
        let entries = entries(&catalog(), &urls, &[INDEX_PAGE]);
        let mut out = Vec::new();
        write_sitemap(&entries, &mut out).unwrap();
        let xml = String::from_utf8(out).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert!(xml.contains("<loc>https://komtabi.example/posts/a&amp;b.html</loc>"));
        assert_eq!(xml.matches("<lastmod>").count(), 1);
        assert!(xml.contains("<lastmod>2024-01-10</lastmod>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }
}
