//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the static site: loading posts ([`crate::parser`] or
//! [`crate::cms`]) and the data files into a [`Catalog`], rendering post
//! pages ([`crate::write`]), and generating the sitemap ([`crate::sitemap`]).

use crate::cms::{self, Error as CmsError, MicroCms};
use crate::config::Config;
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::post::{Catalog, Course, Post};
use crate::present::PostPageOptions;
use crate::sitemap::{self, Error as SitemapError};
use crate::url::{SiteUrls, POSTS_DIRECTORY};
use crate::write::{self, Error as WriteError, Writer};
use gtmpl::Template;
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Where posts are loaded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// The project's Markdown directory.
    Markdown,

    /// The microCMS API.
    Cms,
}

/// What a build produced.
#[derive(Debug)]
pub struct Summary {
    pub pages: Vec<PathBuf>,
    pub sitemap: PathBuf,
}

/// Loads posts from `source` plus the course and visited-prefecture data
/// files. Missing data files are treated as empty. Posts whose id can't be
/// used as a file name are dropped with a warning.
pub fn load_catalog(config: &Config, source: Source) -> Result<Catalog> {
    let posts: Vec<Post> = match source {
        Source::Markdown => PostParser::new(&config.posts_source_directory).parse_posts()?,
        Source::Cms => {
            let cms_config = config.cms.as_ref().ok_or(Error::CmsNotConfigured)?;
            cms::fetch_posts(&MicroCms::new(cms_config)?, config.cms_page_size)?
        }
    };
    let posts = drop_unusable_ids(posts);
    let courses: Vec<Course> = load_data(&config.courses_file)?;
    let visited: Vec<String> = load_data(&config.visited_file)?;
    info!(
        "loaded {} posts, {} courses and {} visited prefectures",
        posts.len(),
        courses.len(),
        visited.len()
    );
    Ok(Catalog::new(posts, courses, visited))
}

fn drop_unusable_ids(posts: Vec<Post>) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| match write::is_usable_id(&post.id) {
            true => true,
            false => {
                warn!("skipping post `{}`: its id can't be used as a file name", post.id);
                false
            }
        })
        .collect()
}

fn load_data<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("{} not found; using an empty list", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(&contents).map_err(|err| Error::Data {
        path: path.to_owned(),
        err,
    })
}

/// Builds the site from a [`Config`] object: one page per post under
/// `{output}/posts/` and `{output}/sitemap.xml`.
pub fn build_site(config: &Config, source: Source) -> Result<Summary> {
    let catalog = load_catalog(config, source)?;
    let urls = site_urls(config)?;

    // Parse the template before touching the output directory.
    let posts_template = parse_template(&config.post_template)?;

    // Only the generated posts directory is removed; the rest of the output
    // directory may hold hand-written pages.
    let posts_output_directory = config.output_directory.join(POSTS_DIRECTORY);
    rmdir(&posts_output_directory)?;

    let writer = Writer {
        posts_template: &posts_template,
        posts_output_directory: &posts_output_directory,
        urls: &urls,
        options: PostPageOptions {
            tag_limit: Some(config.static_tag_limit),
        },
    };
    let pages = writer.write_posts(&catalog)?;
    info!("wrote {} post pages to {}", pages.len(), posts_output_directory.display());

    let sitemap = config.output_directory.join("sitemap.xml");
    write_sitemap_file(config, &catalog, &urls, &sitemap)?;
    Ok(Summary { pages, sitemap })
}

/// Writes only the sitemap for the catalog loaded from `source`.
pub fn build_sitemap(config: &Config, source: Source, path: &Path) -> Result<()> {
    let catalog = load_catalog(config, source)?;
    write_sitemap_file(config, &catalog, &site_urls(config)?, path)
}

fn write_sitemap_file(config: &Config, catalog: &Catalog, urls: &SiteUrls, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let entries = sitemap::entries(catalog, urls, &config.static_pages);
    sitemap::write_sitemap(&entries, File::create(path)?)?;
    info!("wrote {} sitemap entries to {}", entries.len(), path.display());
    Ok(())
}

/// The URL builder for the configured site root.
pub fn site_urls(config: &Config) -> Result<SiteUrls> {
    SiteUrls::new(config.site_url.clone()).map_err(|_| Error::SiteUrl(config.site_url.to_string()))
}

// Loads the template file and parses it.
fn parse_template(template_file: &Path) -> Result<Template> {
    let contents = std::fs::read_to_string(template_file).map_err(|e| Error::OpenTemplateFile {
        path: template_file.to_owned(),
        err: e,
    })?;
    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading,
/// writing, cleaning output directories, parsing template files, and other
/// I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors parsing Markdown posts.
    Parse(ParseError),

    /// Returned for errors fetching posts from the CMS.
    Cms(CmsError),

    /// Returned when the CMS is requested without a service domain or key.
    CmsNotConfigured,

    /// Returned for malformed course or visited-prefecture files.
    Data { path: PathBuf, err: serde_yaml::Error },

    /// Returned for errors writing [`crate::post::Post`]s to disk as HTML files.
    Write(WriteError),

    /// Returned for errors writing the sitemap.
    Sitemap(SitemapError),

    /// Returned when the site URL can't be used as a base for page URLs.
    SiteUrl(String),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Cms(err) => err.fmt(f),
            Error::CmsNotConfigured => write!(
                f,
                "CMS source requires MICROCMS_SERVICE_DOMAIN and MICROCMS_API_KEY"
            ),
            Error::Data { path, err } => {
                write!(f, "Reading data file '{}': {}", path.display(), err)
            }
            Error::Write(err) => err.fmt(f),
            Error::Sitemap(err) => err.fmt(f),
            Error::SiteUrl(url) => write!(f, "Site URL '{}' can't be a base URL", url),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Cms(err) => Some(err),
            Error::CmsNotConfigured => None,
            Error::Data { path: _, err } => Some(err),
            Error::Write(err) => Some(err),
            Error::Sitemap(err) => Some(err),
            Error::SiteUrl(_) => None,
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<CmsError> for Error {
    fn from(err: CmsError) -> Error {
        Error::Cms(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<SitemapError> for Error {
    fn from(err: SitemapError) -> Error {
        Error::Sitemap(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_data_missing_and_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let missing: Vec<String> = load_data(&dir.path().join("nope.yaml"))?;
        assert!(missing.is_empty());

        let empty = dir.path().join("empty.yaml");
        std::fs::write(&empty, "")?;
        let empty: Vec<String> = load_data(&empty)?;
        assert!(empty.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_data_malformed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("visited.yaml");
        std::fs::write(&path, "key: [unclosed")?;
        assert!(matches!(
            load_data::<String>(&path),
            Err(Error::Data { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_drop_unusable_ids() {
        let post = |id: &str| Post {
            id: id.to_owned(),
            title: id.to_owned(),
            ..Post::default()
        };
        let kept = drop_unusable_ids(vec![
            post("asakusa"),
            post(".draft"),
            post("2024/kyoto"),
            post("a\\b"),
            post(""),
            post("skytree"),
        ]);
        let ids: Vec<&str> = kept.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["asakusa", "skytree"]);
    }

    #[test]
    fn test_rmdir_missing_is_ok() -> Result<()> {
        let dir = tempfile::tempdir()?;
        rmdir(&dir.path().join("missing"))
    }
}
