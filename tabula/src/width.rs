//! Column width allocation for a CSS grid template.
//!
//! Every track gets a strictly positive minimum and at most one track is
//! flexible. Multiple `1fr` tracks are valid CSS but the table layout
//! assumes a single fill column, so the rule is enforced here.

use std::fmt;

use serde::Deserialize;
use unicode_width::UnicodeWidthStr;

use crate::column::{Column, Width};
use crate::row::TableRow;

/// Width of the expand and selection checkbox tracks.
pub const AFFORDANCE_WIDTH: u32 = 40;

/// Tuning for width estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WidthConfig {
    /// Pixels per terminal-width unit of text.
    pub char_width: u32,
    /// Horizontal padding added to every estimated cell.
    pub cell_padding: u32,
    /// Lower clamp for estimated widths. Treated as at least 1.
    pub min_width: u32,
    /// Upper clamp for estimated widths.
    pub max_width: u32,
    /// How many rows to sample for text length.
    pub sample_rows: usize,
}

impl Default for WidthConfig {
    fn default() -> Self {
        Self {
            char_width: 8,
            cell_padding: 24,
            min_width: 64,
            max_width: 400,
            sample_rows: 50,
        }
    }
}

impl WidthConfig {
    fn clamp(&self, px: u32) -> u32 {
        let min = self.min_width.max(1);
        let max = self.max_width.max(min);
        px.clamp(min, max)
    }
}

/// Extra fixed tracks placed before the data columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Affordances {
    /// Add the expand-row toggle track.
    pub expandable: bool,
    /// Add the selection checkbox track.
    pub selectable: bool,
}

/// One grid track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSize {
    /// Fixed pixel width.
    Fixed(u32),
    /// Fill remaining space, never narrower than `min` pixels.
    Flex { min: u32 },
}

impl TrackSize {
    /// Minimum size of the track in pixels.
    pub fn min_px(&self) -> u32 {
        match self {
            TrackSize::Fixed(px) => *px,
            TrackSize::Flex { min } => *min,
        }
    }

    pub fn is_flex(&self) -> bool {
        matches!(self, TrackSize::Flex { .. })
    }
}

impl fmt::Display for TrackSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackSize::Fixed(px) => write!(f, "{}px", px),
            TrackSize::Flex { min } => write!(f, "minmax({}px, 1fr)", min),
        }
    }
}

/// Ordered track sizes: affordance tracks first, then one per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnWidths {
    tracks: Vec<TrackSize>,
}

impl ColumnWidths {
    pub fn tracks(&self) -> &[TrackSize] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Number of flexible tracks (0 or 1).
    pub fn flex_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_flex()).count()
    }

    /// Value for `grid-template-columns`.
    pub fn template(&self) -> String {
        self.tracks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Compute track sizes for `columns`, sampling text from `sample`.
///
/// Explicit fixed widths are kept (zero is raised to the minimum). Auto
/// columns are estimated from the widest header or sampled cell text. The
/// first column asking for `Flex` becomes the flexible track; later ones
/// fall back to their estimate.
pub fn calculate_column_widths<'r, R, I>(
    columns: &[Column<R>],
    sample: I,
    affordances: Affordances,
    config: &WidthConfig,
) -> ColumnWidths
where
    R: TableRow + 'r,
    I: IntoIterator<Item = &'r R>,
{
    let sample: Vec<&R> = sample.into_iter().take(config.sample_rows).collect();
    let mut tracks = Vec::with_capacity(columns.len() + 2);

    if affordances.expandable {
        tracks.push(TrackSize::Fixed(AFFORDANCE_WIDTH));
    }
    if affordances.selectable {
        tracks.push(TrackSize::Fixed(AFFORDANCE_WIDTH));
    }

    let mut flex_taken = false;
    for column in columns {
        let track = match column.width {
            Width::Fixed(0) => TrackSize::Fixed(config.clamp(0)),
            Width::Fixed(px) => TrackSize::Fixed(px),
            Width::Auto => TrackSize::Fixed(estimate(column, &sample, config)),
            Width::Flex if !flex_taken => {
                flex_taken = true;
                TrackSize::Flex {
                    min: estimate(column, &sample, config),
                }
            }
            Width::Flex => {
                log::debug!("Column '{}' demoted from flex, another column fills", column.id);
                TrackSize::Fixed(estimate(column, &sample, config))
            }
        };
        tracks.push(track);
    }

    ColumnWidths { tracks }
}

/// Estimated pixel width of a column from its header and sampled cells.
fn estimate<R: TableRow>(column: &Column<R>, sample: &[&R], config: &WidthConfig) -> u32 {
    let widest = sample
        .iter()
        .map(|row| column.text(row).width())
        .chain(std::iter::once(column.header.width()))
        .max()
        .unwrap_or(0);
    let chars = u32::try_from(widest).unwrap_or(u32::MAX);
    config.clamp(
        chars
            .saturating_mul(config.char_width)
            .saturating_add(config.cell_padding),
    )
}
