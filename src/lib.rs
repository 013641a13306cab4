//! The library code for `komtabi`, the generator behind the #コム旅 travel
//! blog. The work splits into three layers:
//!
//! 1. Loading records: posts from Markdown files ([`crate::parser`]) or the
//!    CMS ([`crate::cms`]), collected with courses and the visited list into
//!    a [`crate::post::Catalog`].
//! 2. Querying and presenting them: normalization ([`crate::normalize`]),
//!    filtering and ordering ([`crate::query`]), counting
//!    ([`crate::aggregate`]) and view models for each page
//!    ([`crate::present`]). These are pure and do no I/O.
//! 3. Rendering: post pages through a template ([`crate::value`],
//!    [`crate::write`]) and the sitemap ([`crate::sitemap`]), orchestrated by
//!    [`crate::build`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod aggregate;
pub mod build;
pub mod cms;
pub mod config;
pub mod date;
pub mod menu;
pub mod normalize;
pub mod parser;
pub mod post;
pub mod present;
pub mod query;
pub mod sitemap;
pub mod url;
pub mod value;
pub mod write;
