//! Table pipeline - filter, sort, selection, expansion and column widths
//! composed over caller-owned rows.
//!
//! The table never owns row data. Each call that needs rows takes the
//! current slice, so derived state is always recomputed from the latest
//! input: filter first, then sort, then key lookups for selection and
//! expansion.
//!
//! # Example
//!
//! ```
//! use tabula::{Clock, Column, KeySpec, ManualClock, Row, SelectionMode, SortState, Table, TableConfig};
//!
//! let rows = vec![
//!     Row::new().set("id", 1).set("name", "Bob"),
//!     Row::new().set("id", 2).set("name", "Abel"),
//!     Row::new().set("id", 3).set("name", "Abby"),
//! ];
//! let clock = ManualClock::new();
//! let mut table = Table::new(
//!     vec![Column::new("id", "ID").fixed(60), Column::new("name", "Name").flex()],
//!     KeySpec::field("id"),
//! )
//! .with_config(TableConfig::default().with_selection_mode(SelectionMode::Multiple));
//!
//! table.set_query("ab", clock.now());
//! clock.advance(table.config().debounce);
//! table.tick(clock.now());
//! table.set_sort(SortState::asc("name"));
//!
//! let snapshot = table.snapshot(&rows).unwrap();
//! let names: Vec<String> = snapshot.rows.iter().map(|r| r.row.get("name").unwrap().to_string()).collect();
//! assert_eq!(names, vec!["Abby", "Abel"]);
//! ```

use std::fmt;
use std::time::Instant;

use crate::column::{Column, find_column, infer_columns};
use crate::config::TableConfig;
use crate::controlled::{ChangeFn, Controlled};
use crate::error::Result;
use crate::expansion::ExpansionState;
use crate::filter::{FilterOptions, FilterState, filter_view};
use crate::key::{KeySpec, RowKey, resolve_keys};
use crate::row::{RowView, TableRow};
use crate::selection::{SelectionDelta, SelectionMode, SelectionState};
use crate::sort::{SortState, sort_view};
use crate::width::{Affordances, ColumnWidths, calculate_column_widths};

/// One row of a snapshot, with its per-row state attached.
#[derive(Debug)]
pub struct VisibleRow<'a, R> {
    /// Resolved row key.
    pub key: RowKey,
    /// Position of the row in the caller's slice.
    pub index: usize,
    pub row: &'a R,
    pub selected: bool,
    pub expanded: bool,
}

/// Everything a renderer needs for one pass.
#[derive(Debug)]
pub struct TableSnapshot<'a, R> {
    /// Filtered and sorted rows.
    pub rows: Vec<VisibleRow<'a, R>>,
    /// Selected keys, sorted.
    pub selected_keys: Vec<RowKey>,
    pub is_all_selected: bool,
    pub is_indeterminate: bool,
    /// Expanded keys, sorted.
    pub expanded_keys: Vec<RowKey>,
    pub column_widths: ColumnWidths,
    /// Query shown in the search input.
    pub query: String,
    /// A typed query is still waiting for its debounce.
    pub is_filtering: bool,
}

/// Table state composed from the individual stages.
pub struct Table<R> {
    columns: Vec<Column<R>>,
    key_spec: KeySpec<R>,
    config: TableConfig,
    filter_options: FilterOptions<R>,
    filter: FilterState,
    sort: Controlled<SortState>,
    selection: SelectionState,
    expansion: ExpansionState,
    /// Filter generation last reported by `take_dirty`.
    seen_generation: u64,
}

impl<R: TableRow> Table<R> {
    /// Create a table with default configuration.
    pub fn new(columns: Vec<Column<R>>, key_spec: KeySpec<R>) -> Self {
        let config = TableConfig::default();
        Self {
            columns,
            key_spec,
            filter_options: FilterOptions::new().with_mode(config.filter_mode),
            filter: FilterState::new(config.debounce),
            sort: Controlled::uncontrolled(SortState::none()),
            selection: SelectionState::new(config.selection_mode),
            expansion: ExpansionState::new(),
            seen_generation: 0,
            config,
        }
    }

    /// Create a table with columns inferred from a sample row.
    pub fn inferred(sample: &R, key_spec: KeySpec<R>) -> Self {
        Self::new(infer_columns(sample), key_spec)
    }

    /// Apply a configuration.
    ///
    /// Sets the filter mode and the selection mode to the configured ones.
    /// The selection callback is not fired; internal selection keys that do
    /// not fit the new mode are dropped, with a debug log.
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.filter.set_debounce(config.debounce);
        self.filter_options.mode = config.filter_mode;
        self.selection.reset_mode(config.selection_mode);
        self.config = config;
        self
    }

    /// Set the filter options (fields, predicate, mode).
    pub fn with_filter_options(mut self, options: FilterOptions<R>) -> Self {
        self.filter_options = options;
        self
    }

    /// Replace the query state, e.g. to make it controlled.
    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self.seen_generation = self.filter.generation();
        self
    }

    /// Start sorted.
    pub fn with_default_sort(mut self, sort: SortState) -> Self {
        self.sort.reset(sort);
        self
    }

    /// Make the sort state caller-owned.
    pub fn with_controlled_sort(mut self, sort: SortState) -> Self {
        self.sort.set_controlled(Some(sort));
        self
    }

    /// Set the sort change callback.
    pub fn on_sort_change(mut self, f: impl FnMut(&SortState) + 'static) -> Self {
        self.sort.set_on_change(Some(Box::new(f) as ChangeFn<SortState>));
        self
    }

    /// Replace the selection state, e.g. to make it controlled.
    pub fn with_selection(mut self, selection: SelectionState) -> Self {
        self.selection = selection;
        self
    }

    /// Replace the expansion state.
    pub fn with_expansion(mut self, expansion: ExpansionState) -> Self {
        self.expansion = expansion;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    /// Replace the column definitions.
    pub fn set_columns(&mut self, columns: Vec<Column<R>>) {
        self.columns = columns;
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn key_spec(&self) -> &KeySpec<R> {
        &self.key_spec
    }

    pub fn sort_state(&self) -> &SortState {
        self.sort.value()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn expansion_mut(&mut self) -> &mut ExpansionState {
        &mut self.expansion
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Search input keystroke.
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        self.filter.set_query(query, now);
    }

    /// Advance the debounce timer. Returns `true` when the applied query
    /// changed and the table needs a re-render.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.filter.tick(now)
    }

    /// Set the sort state directly.
    pub fn set_sort(&mut self, sort: SortState) {
        self.sort.set(sort);
    }

    /// Update the caller-owned sort state.
    pub fn set_controlled_sort(&mut self, sort: Option<SortState>) {
        self.sort.set_controlled(sort);
    }

    /// Header click on `column_id`.
    ///
    /// Ignored for unknown or non-sortable columns.
    pub fn toggle_sort(&mut self, column_id: &str) -> bool {
        let sortable = find_column(&self.columns, column_id).is_some_and(|c| c.sortable);
        if !sortable {
            return false;
        }
        let cycle = self.config.sort_cycle;
        self.sort.update(|s| s.toggled(column_id, cycle));
        true
    }

    /// Row checkbox click.
    pub fn on_select_row(&mut self, key: &RowKey, selected: bool) -> SelectionDelta {
        self.selection.on_select_row(key, selected)
    }

    /// Header checkbox click. Selects exactly the currently visible rows.
    pub fn on_select_all(&mut self, rows: &[R], selected: bool) -> Result<SelectionDelta> {
        let keys = self.visible_keys(rows)?;
        Ok(self.selection.on_select_all(selected, &keys))
    }

    /// Shift-click on a row.
    pub fn select_range(&mut self, rows: &[R], target: &RowKey, extend: bool) -> Result<SelectionDelta> {
        let keys = self.visible_keys(rows)?;
        Ok(self.selection.select_range(target, &keys, extend))
    }

    /// Expand toggle click.
    pub fn on_expand(&mut self, key: &RowKey, expanded: bool) -> bool {
        self.expansion.on_expand(key, expanded)
    }

    /// Drop the pending query, e.g. when the table is torn down.
    pub fn cancel_pending(&mut self) {
        self.filter.cancel();
    }

    /// Returns `true` if any stage changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        let generation = self.filter.generation();
        let filter_dirty = generation != self.seen_generation;
        self.seen_generation = generation;
        // Non-short-circuiting so every flag is cleared.
        filter_dirty
            | self.filter.take_dirty()
            | self.sort.take_dirty()
            | self.selection.take_dirty()
            | self.expansion.take_dirty()
    }

    // -------------------------------------------------------------------------
    // Derived state
    // -------------------------------------------------------------------------

    /// Rows after filtering with the applied query and sorting.
    pub fn visible<'a>(&self, rows: &'a [R]) -> RowView<'a, R> {
        let filtered = filter_view(
            RowView::all(rows),
            self.filter.applied_query(),
            &self.columns,
            &self.filter_options,
        );
        sort_view(filtered, self.sort.value(), &self.columns)
    }

    /// Keys of the visible rows, in display order.
    pub fn visible_keys(&self, rows: &[R]) -> Result<Vec<RowKey>> {
        resolve_keys(&self.visible(rows), &self.key_spec)
    }

    /// Track sizes for the current columns, sampling the caller's rows.
    pub fn column_widths(&self, rows: &[R]) -> ColumnWidths {
        let affordances = Affordances {
            expandable: self.config.expandable,
            selectable: self.selection.mode() != SelectionMode::None,
        };
        calculate_column_widths(&self.columns, rows, affordances, &self.config.widths)
    }

    /// Compute the full render state for `rows`.
    ///
    /// Fails if two visible rows share a key.
    pub fn snapshot<'a>(&self, rows: &'a [R]) -> Result<TableSnapshot<'a, R>> {
        let view = self.visible(rows);
        let keys = resolve_keys(&view, &self.key_spec)?;

        let visible_rows: Vec<VisibleRow<'a, R>> = view
            .iter()
            .zip(keys.iter())
            .map(|((index, row), key)| VisibleRow {
                selected: self.selection.is_selected(key),
                expanded: self.expansion.is_expanded(key),
                key: key.clone(),
                index,
                row,
            })
            .collect();

        let mut expanded_keys: Vec<_> = self.expansion.expanded_keys().iter().cloned().collect();
        expanded_keys.sort();

        log::debug!(
            "Snapshot: {} of {} rows visible, {} selected",
            visible_rows.len(),
            rows.len(),
            self.selection.selected_keys().len()
        );

        Ok(TableSnapshot {
            rows: visible_rows,
            selected_keys: self.selection.selected(),
            is_all_selected: self.selection.is_all_selected(&keys),
            is_indeterminate: self.selection.is_indeterminate(&keys),
            expanded_keys,
            column_widths: self.column_widths(rows),
            query: self.filter.query().to_string(),
            is_filtering: self.filter.is_filtering(),
        })
    }
}

impl<R> Drop for Table<R> {
    fn drop(&mut self) {
        self.filter.cancel();
    }
}

impl<R> fmt::Debug for Table<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns)
            .field("key_spec", &self.key_spec)
            .field("config", &self.config)
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("selection", &self.selection)
            .field("expansion", &self.expansion)
            .finish()
    }
}
