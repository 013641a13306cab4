use crate::post::{Catalog, Post};
use crate::present::{PostPageOptions, Presenter, SITE_NAME};
use crate::url::SiteUrls;
use crate::value::escape;
use gtmpl::{Template, Value};
use log::debug;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Responsible for templating post pages and writing them to disk.
pub struct Writer<'a> {
    /// The template for post pages.
    pub posts_template: &'a Template,

    /// The directory in which the post HTML files will be written. The file
    /// for a post is `{posts_output_directory}/{id}.html`.
    pub posts_output_directory: &'a Path,

    /// Builds the URLs that appear in the pages.
    pub urls: &'a SiteUrls,

    /// Options for the post view, notably the tag limit for static pages.
    pub options: PostPageOptions,
}

impl Writer<'_> {
    /// Takes a single [`Post`], templates it, and writes it to disk.
    fn write_post(&self, presenter: &Presenter, post: &Post) -> Result<PathBuf> {
        let file_path = self.file_path(&post.id)?;
        let page = presenter.post_page(post, self.options);
        let mut value = Value::from(&page);
        if let Value::Object(obj) = &mut value {
            obj.insert("site_name".to_owned(), Value::String(escape(SITE_NAME)));
            obj.insert(
                "home_page".to_owned(),
                Value::String(escape(self.urls.root().as_str())),
            );
        }
        self.posts_template.execute(
            &mut std::fs::File::create(&file_path)?,
            &gtmpl::Context::from(value).unwrap(),
        )?;
        debug!("wrote {}", file_path.display());
        Ok(file_path)
    }

    /// Writes a page for every post in the catalog, in baseline order, and
    /// returns the paths written.
    pub fn write_posts(&self, catalog: &Catalog) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(self.posts_output_directory)?;
        let presenter = Presenter::new(catalog, self.urls);
        catalog
            .posts()
            .iter()
            .map(|post| self.write_post(&presenter, post))
            .collect()
    }

    /// The output file for a post.
    fn file_path(&self, id: &str) -> Result<PathBuf> {
        if !is_usable_id(id) {
            return Err(Error::InvalidId(id.to_owned()));
        }
        Ok(self.posts_output_directory.join(format!("{}.html", id)))
    }
}

/// Ids become file names, so they may not be empty, contain path separators
/// or start with a dot.
pub fn is_usable_id(id: &str) -> bool {
    !id.is_empty() && !id.starts_with('.') && !id.contains(|c| c == '/' || c == '\\')
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),

    /// A post id that can't be used as a file name.
    InvalidId(String),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::InvalidId(id) => write!(f, "post id `{}` can't be used as a file name", id),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
            Error::InvalidId(_) => None,
        }
    }
}
