//! Table configuration

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::filter::{DEFAULT_DEBOUNCE, FilterMode};
use crate::selection::SelectionMode;
use crate::sort::SortCycle;
use crate::width::WidthConfig;

/// Behaviour settings for a [`Table`](crate::Table).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tabula::{SelectionMode, SortCycle, TableConfig};
///
/// let config = TableConfig::default()
///     .with_debounce(Duration::from_millis(150))
///     .with_sort_cycle(SortCycle::TriState)
///     .with_selection_mode(SelectionMode::Multiple);
///
/// let parsed: TableConfig = serde_json::from_str(r#"{"debounce_ms": 150, "sort_cycle": "tri_state", "selection_mode": "multiple"}"#).unwrap();
/// assert_eq!(parsed, config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Quiet period before a typed query is applied.
    ///
    /// Default: 300ms
    #[serde(rename = "debounce_ms", deserialize_with = "millis")]
    pub debounce: Duration,

    /// Header click cycle.
    ///
    /// Default: asc <-> desc
    pub sort_cycle: SortCycle,

    /// Row selection mode.
    ///
    /// Default: none
    pub selection_mode: SelectionMode,

    /// Default filter match mode.
    ///
    /// Default: substring
    pub filter_mode: FilterMode,

    /// Show the expand-row affordance track.
    pub expandable: bool,

    /// Width estimation tuning.
    pub widths: WidthConfig,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            sort_cycle: SortCycle::Toggle,
            selection_mode: SelectionMode::None,
            filter_mode: FilterMode::Substring,
            expandable: false,
            widths: WidthConfig::default(),
        }
    }
}

impl TableConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter debounce.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the sort cycle.
    pub fn with_sort_cycle(mut self, cycle: SortCycle) -> Self {
        self.sort_cycle = cycle;
        self
    }

    /// Sets the selection mode.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Sets the filter mode.
    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    /// Enables the expand-row affordance.
    pub fn with_expandable(mut self, expandable: bool) -> Self {
        self.expandable = expandable;
        self
    }

    /// Sets the width estimation tuning.
    pub fn with_widths(mut self, widths: WidthConfig) -> Self {
        self.widths = widths;
        self
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}
