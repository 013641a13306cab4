use crate::cms::{CmsConfig, PAGE_SIZE};
use crate::sitemap::DEFAULT_STATIC_PAGES;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "komtabi.yaml";

/// Tags listed on statically generated post pages.
const STATIC_TAG_LIMIT: usize = 12;

fn default_posts_directory() -> PathBuf {
    PathBuf::from("posts")
}

fn default_courses() -> PathBuf {
    PathBuf::from("courses.yaml")
}

fn default_visited() -> PathBuf {
    PathBuf::from("visited.yaml")
}

fn default_post_template() -> PathBuf {
    PathBuf::from("theme/post.html")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("_site")
}

fn default_static_pages() -> Vec<String> {
    DEFAULT_STATIC_PAGES.iter().map(|p| p.to_string()).collect()
}

fn default_static_tag_limit() -> usize {
    STATIC_TAG_LIMIT
}

fn default_endpoint() -> String {
    String::from("posts")
}

fn default_page_size() -> usize {
    PAGE_SIZE
}

#[derive(Deserialize)]
struct Project {
    /// May be left out when `SITE_URL` is set.
    #[serde(default)]
    site_url: Option<Url>,

    #[serde(default = "default_posts_directory")]
    posts_directory: PathBuf,

    #[serde(default = "default_courses")]
    courses: PathBuf,

    #[serde(default = "default_visited")]
    visited: PathBuf,

    #[serde(default = "default_post_template")]
    post_template: PathBuf,

    #[serde(default = "default_output_directory")]
    output_directory: PathBuf,

    #[serde(default = "default_static_pages")]
    static_pages: Vec<String>,

    #[serde(default = "default_static_tag_limit")]
    static_tag_limit: usize,

    #[serde(default)]
    cms: Cms,
}

#[derive(Deserialize)]
struct Cms {
    #[serde(default)]
    service_domain: Option<String>,

    #[serde(default = "default_endpoint")]
    endpoint: String,

    #[serde(default = "default_page_size")]
    page_size: usize,
}

impl Default for Cms {
    fn default() -> Self {
        Cms {
            service_domain: None,
            endpoint: default_endpoint(),
            page_size: default_page_size(),
        }
    }
}

/// The resolved project configuration. Relative paths in the project file
/// are resolved against the directory that contains it.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub site_url: Url,
    pub posts_source_directory: PathBuf,
    pub courses_file: PathBuf,
    pub visited_file: PathBuf,
    pub post_template: PathBuf,
    pub output_directory: PathBuf,
    pub static_pages: Vec<String>,
    pub static_tag_limit: usize,

    /// `None` unless both the service domain and the API key are known.
    pub cms: Option<CmsConfig>,
    pub cms_page_size: usize,
}

impl Config {
    /// Looks for `komtabi.yaml` in `dir` and then in each of its parents.
    /// `output_directory` overrides the one from the project file. Settings
    /// from the environment (see [`Config::apply_env`]) take precedence over
    /// the file.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory, |key| std::env::var(key).ok())
                .with_context(|| format!("Loading configuration from '{}'", path.display()))
        } else {
            match dir.parent() {
                Some(dir) => Config::from_directory(dir, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads the project file at `path`. `env` looks up environment
    /// variables.
    pub fn from_project_file<F>(
        path: &Path,
        output_directory: Option<&Path>,
        env: F,
    ) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        let project_root = match path.parent() {
            None => {
                return Err(anyhow!(
                    "Can't get parent directory for provided project file path '{:?}'",
                    path
                ))
            }
            Some(project_root) => project_root,
        };

        let mut config = Config {
            site_url: match project.site_url {
                Some(url) => url,
                None => Url::parse("http://localhost/")?,
            },
            posts_source_directory: project_root.join(project.posts_directory),
            courses_file: project_root.join(project.courses),
            visited_file: project_root.join(project.visited),
            post_template: project_root.join(project.post_template),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join(project.output_directory),
            },
            static_pages: project.static_pages,
            static_tag_limit: project.static_tag_limit,
            cms: None,
            cms_page_size: project.cms.page_size,
        };
        config.apply_env(&env, project.cms.service_domain, project.cms.endpoint)?;
        Ok(config)
    }

    /// Applies `SITE_URL`, `MICROCMS_SERVICE_DOMAIN`, `MICROCMS_API_KEY` and
    /// `MICROCMS_ENDPOINT`. The API key is only ever read from the
    /// environment.
    fn apply_env<F>(&mut self, env: &F, service_domain: Option<String>, endpoint: String) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        if let Some(site_url) = env("SITE_URL") {
            self.site_url = Url::parse(&site_url)
                .with_context(|| format!("Parsing SITE_URL '{}'", site_url))?;
        }

        let service_domain = env("MICROCMS_SERVICE_DOMAIN").or(service_domain);
        let endpoint = env("MICROCMS_ENDPOINT").unwrap_or(endpoint);
        self.cms = match (service_domain, env("MICROCMS_API_KEY")) {
            (Some(service_domain), Some(api_key)) => Some(CmsConfig {
                service_domain,
                api_key,
                endpoint,
            }),
            _ => None,
        };
        Ok(())
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!("Opening {} file `{}`: {}", kind, path.display(), e)),
        Ok(file) => Ok(file),
    }
}
