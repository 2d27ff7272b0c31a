//! Headless data table pipeline.
//!
//! `tabula` turns caller-owned rows into what a table renderer draws:
//! filtered and sorted rows, selection and expansion state keyed by row,
//! and a CSS grid template for the columns. It never renders anything.

pub mod column;
pub mod config;
pub mod controlled;
pub mod debounce;
pub mod error;
pub mod expansion;
pub mod filter;
pub mod key;
pub mod pagination;
pub mod row;
pub mod selection;
pub mod sort;
pub mod table;
pub mod value;
pub mod width;

pub use column::{Accessor, Alignment, Column, Width, humanize, infer_columns};
pub use config::TableConfig;
pub use controlled::Controlled;
pub use debounce::{Clock, Debouncer, ManualClock, SystemClock};
pub use error::TableError;
pub use expansion::ExpansionState;
pub use filter::{FilterMode, FilterOptions, FilterState, filter_rows, filter_view};
pub use key::{KeySpec, RowKey, resolve_keys};
pub use pagination::{InfiniteScroll, Pagination};
pub use row::{Row, RowView, TableRow};
pub use selection::{KeySet, SelectionMode, SelectionState};
pub use sort::{SortCycle, SortDirection, SortState, compare_values, sort_view};
pub use table::{Table, TableSnapshot, VisibleRow};
pub use value::Value;
pub use width::{Affordances, ColumnWidths, TrackSize, WidthConfig, calculate_column_widths};

pub mod prelude {
    pub use crate::column::{Alignment, Column, Width};
    pub use crate::config::TableConfig;
    pub use crate::debounce::{Clock, SystemClock};
    pub use crate::error::TableError;
    pub use crate::filter::{FilterMode, FilterOptions};
    pub use crate::key::{KeySpec, RowKey};
    pub use crate::row::{Row, TableRow};
    pub use crate::selection::SelectionMode;
    pub use crate::sort::{SortCycle, SortDirection, SortState};
    pub use crate::table::{Table, TableSnapshot};
    pub use crate::value::Value;
}
