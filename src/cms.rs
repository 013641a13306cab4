//! Fetches posts from a microCMS list API. The API returns at most `limit`
//! records per request, so [`fetch_all`] keeps asking for the next `offset`
//! until a short page comes back. The paging loop only depends on
//! [`PageSource`], which keeps it testable without a network.

use std::fmt;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::post::Post;

/// The number of records requested per page.
pub const PAGE_SIZE: usize = 100;

const API_KEY_HEADER: &str = "X-MICROCMS-API-KEY";

/// A paginated list of records.
pub trait PageSource {
    /// Returns up to `limit` records starting at `offset`.
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Value>>;
}

/// Connection settings for a microCMS list endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct CmsConfig {
    /// The service subdomain (`{service_domain}.microcms.io`).
    pub service_domain: String,
    pub api_key: String,

    /// The list endpoint, `posts` by default.
    pub endpoint: String,
}

/// A [`PageSource`] backed by the microCMS REST API.
pub struct MicroCms {
    client: Client,
    endpoint_url: Url,
    api_key: String,
}

impl MicroCms {
    pub fn new(config: &CmsConfig) -> Result<MicroCms> {
        let endpoint_url = Url::parse(&format!(
            "https://{}.microcms.io/api/v1/{}",
            config.service_domain, config.endpoint
        ))?;
        Ok(MicroCms {
            client: Client::new(),
            endpoint_url,
            api_key: config.api_key.clone(),
        })
    }
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    contents: Vec<Value>,
}

impl PageSource for MicroCms {
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Value>> {
        let mut url = self.endpoint_url.clone();
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        debug!("fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .send()?;
        if !response.status().is_success() {
            return Err(Error::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        Ok(response.json::<ListResponse>()?.contents)
    }
}

/// Requests pages of `page_size` records until a page comes back short and
/// returns every record in the order received.
pub fn fetch_all<S: PageSource + ?Sized>(source: &S, page_size: usize) -> Result<Vec<Value>> {
    if page_size == 0 {
        return Err(Error::InvalidPageSize);
    }
    let mut offset = 0;
    let mut records = Vec::new();
    loop {
        let page = source.fetch_page(offset, page_size)?;
        let short = page.len() < page_size;
        records.extend(page);
        if short {
            return Ok(records);
        }
        offset += page_size;
    }
}

/// Fetches every record and maps it to a [`Post`]. Records without an id or
/// a title are skipped with a warning.
pub fn fetch_posts<S: PageSource + ?Sized>(source: &S, page_size: usize) -> Result<Vec<Post>> {
    let records = fetch_all(source, page_size)?;
    let total = records.len();
    let posts: Vec<Post> = records
        .iter()
        .filter_map(|record| match Post::from_record(record) {
            Some(post) => Some(post),
            None => {
                warn!(
                    "skipping CMS record without id or title: {}",
                    record.get("id").unwrap_or(&Value::Null)
                );
                None
            }
        })
        .collect();
    info!("fetched {} posts ({} records) from the CMS", posts.len(), total);
    Ok(posts)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem fetching records from the CMS.
#[derive(Debug)]
pub enum Error {
    /// Returned when the request fails or the body isn't the expected JSON.
    Http(reqwest::Error),

    /// Returned for non-2xx responses.
    Status { url: Url, status: u16 },

    /// Returned when the endpoint URL can't be built from the configuration.
    UrlParse(url::ParseError),

    /// Returned when asked to page with a page size of zero.
    InvalidPageSize,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Http(err) => err.fmt(f),
            Error::Status { url, status } => {
                write!(f, "CMS request to '{}' failed with status {}", url, status)
            }
            Error::UrlParse(err) => err.fmt(f),
            Error::InvalidPageSize => write!(f, "CMS page size must be positive"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            Error::Status { .. } => None,
            Error::UrlParse(err) => Some(err),
            Error::InvalidPageSize => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}
