#![doc = svgbobdoc::transform!(
//! A static site generator for a community band.
//!
//! # Overview
//!
//! Bandsite turns a small directory of band data into a static web site: a
//! member roster, one record per instrument section, a logo, a stylesheet,
//! and a set of page templates. It does not host anything; the output is a
//! plain directory that can be served from anywhere or, with the `s3`
//! feature, published to an S3 bucket behind CloudFront.
//!
//! A build moves through a fixed sequence of stages:
//!
//! ```svgbob
//!  +------+   +-------------+   +----------------+   +---------------+
//!  | Init +-->| DataLoaded  +-->| PaletteApplied +-->| AssetsCopied  |
//!  +------+   +-------------+   +----------------+   +-------+-------+
//!                                                            |
//!                                    +------+   +------------v--+
//!                                    | Done |<--+ PagesRendered |
//!                                    +------+   +---------------+
//! ```
//!
//! In words:
//!
//!   1. The **roster** (`members.csv`) and the **instrument records**
//!      (`data/instruments/*.json`) are loaded and joined: every instrument
//!      gets the members whose section matches its name, and a page URL.
//!
//!   2. The **palette** is derived from the logo: its most frequent colors
//!      are written into the stylesheet as `--color-N` custom properties,
//!      between a pair of marker comments.
//!
//!   3. The **static** and **asset** trees are mirrored into the output
//!      directory.
//!
//!   4. **Pages** are rendered from templates: a fixed set of site pages,
//!      then one page per instrument.
//!
//! Any failure stops the build; [`pipeline::Pipeline::stage()`] reports how
//! far it got. Everything is driven by a [`config::Config`], which is read
//! from an optional `site.toml` and otherwise defaults to the band's own
//! layout.
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod fstree;
pub mod format;
pub mod band;
pub mod palette;
pub mod mirror;
pub mod templating;
pub mod config;
pub mod render;
pub mod pipeline;
pub mod publish;

pub use config::Config;
pub use pipeline::{Pipeline, Stage, Summary};
