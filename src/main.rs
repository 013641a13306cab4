use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use komtabi::build::{self, Source};
use komtabi::config::Config;
use komtabi::present::{PostPageOptions, Presenter};
use komtabi::query::ALL_AREAS;
use komtabi::{aggregate, post::Catalog};
use log::info;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cms = Arg::with_name("cms")
        .long("cms")
        .help("Load posts from microCMS instead of the posts directory");

    let matches = App::new("komtabi")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds and queries the #コム旅 travel blog")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .short("p")
                .long("project")
                .takes_value(true)
                .default_value(".")
                .global(true)
                .help("The project directory (or any directory below it)"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Writes a page per post and the sitemap")
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .help("The output directory"),
                )
                .arg(cms.clone()),
        )
        .subcommand(
            SubCommand::with_name("sitemap")
                .about("Writes only the sitemap")
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .help("The sitemap file"),
                )
                .arg(cms.clone()),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Prints the travel listing as JSON")
                .arg(Arg::with_name("pref").long("pref").takes_value(true))
                .arg(Arg::with_name("tag").long("tag").takes_value(true))
                .arg(
                    Arg::with_name("top")
                        .long("top")
                        .help("Only the newest posts, as on the top page"),
                )
                .arg(cms.clone()),
        )
        .subcommand(
            SubCommand::with_name("post")
                .about("Prints a post page as JSON")
                .arg(Arg::with_name("id").required(true))
                .arg(cms.clone()),
        )
        .subcommand(
            SubCommand::with_name("stats")
                .about("Prints visited prefectures, tags and prefecture counts as JSON")
                .arg(cms.clone()),
        )
        .subcommand(
            SubCommand::with_name("courses")
                .about("Prints the model courses as JSON")
                .arg(
                    Arg::with_name("area")
                        .long("area")
                        .takes_value(true)
                        .default_value(ALL_AREAS),
                )
                .arg(cms),
        )
        .get_matches();

    let (name, m) = match matches.subcommand() {
        (name, Some(m)) => (name, m),
        (name, None) => return Err(anyhow!("missing arguments for `{}`", name)),
    };
    // Global args only propagate down, so `-p` may be on either side.
    let project = Path::new(
        m.value_of("project")
            .or_else(|| matches.value_of("project"))
            .unwrap_or("."),
    );
    match name {
        "build" => {
            let config = Config::from_directory(project, m.value_of("output").map(Path::new))?;
            let summary = build::build_site(&config, source(m))?;
            info!(
                "built {} pages and {}",
                summary.pages.len(),
                summary.sitemap.display()
            );
            Ok(())
        }
        "sitemap" => {
            let config = Config::from_directory(project, None)?;
            let path = match m.value_of("output") {
                Some(path) => Path::new(path).to_owned(),
                None => config.output_directory.join("sitemap.xml"),
            };
            build::build_sitemap(&config, source(m), &path)?;
            Ok(())
        }
        "list" => with_catalog(project, m, |_, presenter| {
            print_json(&presenter.listing(
                m.value_of("pref").unwrap_or_default(),
                m.value_of("tag").unwrap_or_default(),
                m.is_present("top"),
            ))
        }),
        "post" => with_catalog(project, m, |catalog, presenter| {
            let id = m.value_of("id").unwrap_or_default();
            match catalog.post(id) {
                Some(post) => print_json(&presenter.post_page(post, PostPageOptions::default())),
                None => Err(anyhow!("post not found: {}", id)),
            }
        }),
        "stats" => with_catalog(project, m, |catalog, presenter| {
            print_json(&json!({
                "visited": presenter.visited_summary(),
                "tags": presenter.tag_index(),
                "prefectures": aggregate::prefecture_counts(catalog.posts()),
            }))
        }),
        "courses" => with_catalog(project, m, |_, presenter| {
            print_json(&presenter.course_page(m.value_of("area").unwrap_or(ALL_AREAS)))
        }),
        name => Err(anyhow!("unknown command `{}`", name)),
    }
}

fn source(m: &ArgMatches) -> Source {
    match m.is_present("cms") {
        true => Source::Cms,
        false => Source::Markdown,
    }
}

/// Loads the project's catalog and hands it to `f` with a presenter.
fn with_catalog<F>(project: &Path, m: &ArgMatches, f: F) -> Result<()>
where
    F: FnOnce(&Catalog, &Presenter) -> Result<()>,
{
    let config = Config::from_directory(project, None)?;
    let catalog = build::load_catalog(&config, source(m))?;
    let urls = build::site_urls(&config)?;
    f(&catalog, &Presenter::new(&catalog, &urls))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
