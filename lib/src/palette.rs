//! Dominant-color extraction and stylesheet theming.
//!
//! Colors are tallied exactly: two pixels differing by one unit in any
//! channel count as distinct colors. The most frequent colors are written
//! into the stylesheet as `--color-<rank>` custom properties between two
//! marker comments.

use std::fmt;
use std::path::Path;

use image::{ColorType, DynamicImage};
use rustc_hash::FxHashMap;

use crate::error::{Result, Chainable};
use crate::format::{Sink, Source};
use crate::util::find;

pub const START_MARKER: &str = "/* Color variables will be generated here */";
pub const END_MARKER: &str = "/* End Color variables */";
pub const ROOT_SELECTOR: &str = ":root {";

/// A pixel color at 16 bits per channel. 8-bit sources are widened
/// losslessly, so distinct source colors remain distinct.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Color {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl Color {
    pub const fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        const fn widen(c: u8) -> u16 { c as u16 * 257 }

        Color { r: widen(r), g: widen(g), b: widen(b), a: widen(a) }
    }

    pub const fn from_rgba16([r, g, b, a]: [u16; 4]) -> Self {
        Color { r, g, b, a }
    }

    /// Narrows to 8-bit RGB by integer division, discarding alpha.
    pub const fn to_rgb8(self) -> [u8; 3] {
        [(self.r / 257) as u8, (self.g / 257) as u8, (self.b / 257) as u8]
    }
}

/// A `--color-<rank>: rgb(r, g, b);` custom property declaration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub rank: usize,
    pub rgb: [u8; 3],
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.rgb;
        write!(f, "--color-{}: rgb({r}, {g}, {b});", self.rank)
    }
}

/// Counts how many pixels of `image` have each exact color.
pub fn tally(image: &DynamicImage) -> FxHashMap<Color, usize> {
    let mut counts = FxHashMap::default();
    match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => {
            for pixel in image.to_rgba8().pixels() {
                *counts.entry(Color::from_rgba8(pixel.0)).or_insert(0) += 1;
            }
        }
        // 16-bit and float images; floats are quantized to 16 bits.
        _ => {
            for pixel in image.to_rgba16().pixels() {
                *counts.entry(Color::from_rgba16(pixel.0)).or_insert(0) += 1;
            }
        }
    }

    counts
}

/// The `count` most frequent colors of `image`, most frequent first. Equal
/// frequencies are ordered by ascending color value.
pub fn dominant_colors(image: &DynamicImage, count: usize) -> Vec<Color> {
    let mut frequencies: Vec<(Color, usize)> = tally(image).into_iter().collect();
    frequencies.sort_unstable_by(|(c1, n1), (c2, n2)| n2.cmp(n1).then(c1.cmp(c2)));
    frequencies.into_iter()
        .take(count)
        .map(|(color, _)| color)
        .collect()
}

pub fn declarations(colors: &[Color]) -> Vec<Declaration> {
    colors.iter()
        .enumerate()
        .map(|(i, color)| Declaration { rank: i + 1, rgb: color.to_rgb8() })
        .collect()
}

/// How [`apply_declarations()`] placed the declarations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Replaced the region between the start and end markers.
    Replaced,
    /// Inserted after the start marker and added the end marker.
    Terminated,
    /// Inserted after the opening of the `:root` rule.
    Root,
    /// Found no place to insert; the stylesheet is unchanged.
    Unchanged,
}

/// Splices `declarations` into the stylesheet text `css`.
///
/// With both markers present, everything between them is replaced. With only
/// the start marker, the declarations and an end marker follow it. With
/// neither, the declarations follow the first `:root {`.
pub fn apply_declarations(css: &str, declarations: &[Declaration]) -> (String, Placement) {
    let block = declarations.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n");

    if let Some(start) = find(css, START_MARKER) {
        let region = start + START_MARKER.len();
        return match find(&css[region..], END_MARKER) {
            Some(end) => {
                let end = region + end;
                let css = format!("{}\n{block}\n    {}", &css[..region], &css[end..]);
                (css, Placement::Replaced)
            }
            None => {
                let css = format!("{}\n    {block}\n    {END_MARKER}{}", &css[..region], &css[region..]);
                (css, Placement::Terminated)
            }
        };
    }

    match find(css, ROOT_SELECTOR) {
        Some(root) => {
            let at = root + ROOT_SELECTOR.len();
            let css = format!("{}\n    {block}{}", &css[..at], &css[at..]);
            (css, Placement::Root)
        }
        None => (css.to_string(), Placement::Unchanged),
    }
}

/// Decodes the image at `image_path`, derives `count` dominant colors, and
/// writes them into the stylesheet at `stylesheet_path`. Returns the colors.
pub fn extract_and_apply<I, S>(image_path: I, stylesheet_path: S, count: usize) -> Result<Vec<Color>>
    where I: AsRef<Path>, S: AsRef<Path>
{
    let (image_path, stylesheet_path) = (image_path.as_ref(), stylesheet_path.as_ref());
    tracing::info!("generating color scheme from {}", image_path.display());

    let bytes = image_path.read()?;
    let image = image::load_from_memory(&bytes).chain_with(|| error! {
        "failed to decode image",
        "path" => image_path.display(),
    })?;

    let colors = dominant_colors(&image, count);
    let css = stylesheet_path.read_string()?;
    let (css, placement) = apply_declarations(&css, &declarations(&colors));
    if placement == Placement::Unchanged {
        tracing::warn!(
            path = %stylesheet_path.display(),
            "stylesheet has neither color markers nor a `:root` rule; leaving it unchanged"
        );
    }

    stylesheet_path.write(css)?;
    tracing::info!("generated color scheme and updated {}", stylesheet_path.display());
    Ok(colors)
}

#[cfg(test)] static_assertions::assert_impl_all!(Color: Copy, Ord, std::hash::Hash);
