//! Defines the [`Parser`] and [`Error`] types, which load [`Post`]s from a
//! directory of Markdown files. This is the local alternative to fetching
//! posts from the CMS (see [`crate::cms`]).

use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use log::debug;
use pulldown_cmark::{html, Options, Parser as MarkdownParser};
use serde::Deserialize;
use walkdir::{DirEntry, WalkDir};

use crate::post::{lenient_string, lenient_string_list, lenient_thumbnail, non_empty, Post};

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `source_directory` is searched recursively for `.md` files.
    source_directory: &'a Path,
}

impl<'a> Parser<'a> {
    pub fn new(source_directory: &'a Path) -> Parser<'a> {
        Parser { source_directory }
    }

    /// Searches the source directory for post files and returns the posts in
    /// the order found. Each post file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with the field `Title`, and optionally `Date`,
    ///    `Prefecture`, `Tags`, `Thumbnail` and `Excerpt`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body in Markdown
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// Title: 金閣寺
    /// Date: 2024.01.10
    /// Prefecture: 京都府
    /// Tags: [temple]
    /// ---
    /// # 金閣寺
    ///
    /// ...
    /// ```
    ///
    /// The post id is the file name without its extension. Hidden files and
    /// directories (drafts, editor backups) are skipped.
    pub fn parse_posts(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        let walker = WalkDir::new(self.source_directory)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for result in walker {
            let entry = result?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(MARKDOWN_EXTENSION)
            {
                posts.push(self.parse_post(path)?);
            }
        }
        Ok(posts)
    }

    fn parse_post(&self, path: &Path) -> Result<Post> {
        match parse_file(path) {
            Ok(post) => {
                debug!("parsed post `{}` from {}", post.id, path.display());
                Ok(post)
            }
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn parse_file(path: &Path) -> Result<Post> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;

    let id = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| InvalidFileNameError(path.to_owned()))?;
    parse_str(id, &contents)
}

/// Parses a single [`Post`] from its `id` and the file contents.
pub fn parse_str(id: &str, input: &str) -> Result<Post> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
        const FENCE: &str = "---";
        if !input.starts_with(FENCE) {
            return Err(Error::FrontmatterMissingStartFence);
        }
        match input[FENCE.len()..].find(FENCE) {
            None => Err(Error::FrontmatterMissingEndFence),
            Some(offset) => Ok((
                FENCE.len(),                        // yaml_start
                FENCE.len() + offset,               // yaml_stop
                FENCE.len() + offset + FENCE.len(), // body_start
            )),
        }
    }

    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    let mut content = String::new();
    html::push_html(
        &mut content,
        MarkdownParser::new_ext(&input[body_start..], options),
    );

    Ok(Post {
        id: id.to_owned(),
        title: frontmatter.title.trim().to_owned(),
        date: frontmatter.date,
        prefecture: frontmatter.prefecture,
        tags: frontmatter.tags,
        thumbnail: frontmatter.thumbnail,
        excerpt: non_empty(frontmatter.excerpt),
        content,
    })
}

#[derive(Deserialize)]
struct Frontmatter {
    #[serde(rename = "Title", deserialize_with = "lenient_string")]
    title: String,

    #[serde(default, rename = "Date", deserialize_with = "lenient_string")]
    date: String,

    #[serde(default, rename = "Prefecture", deserialize_with = "lenient_string")]
    prefecture: String,

    #[serde(default, rename = "Tags", deserialize_with = "lenient_string_list")]
    tags: Vec<String>,

    #[serde(default, rename = "Thumbnail", deserialize_with = "lenient_thumbnail")]
    thumbnail: Option<String>,

    #[serde(default, rename = "Excerpt", deserialize_with = "lenient_string")]
    excerpt: String,
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
