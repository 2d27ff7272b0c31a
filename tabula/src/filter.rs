//! Free-text row filtering with a debounced query.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use serde::Deserialize;

use crate::column::{Column, find_column};
use crate::controlled::{ChangeFn, Controlled};
use crate::debounce::Debouncer;
use crate::row::{RowView, TableRow};
use crate::value::Value;

/// Default quiet period before a typed query is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// How the default predicate matches the query against cell text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Case-insensitive substring match.
    #[default]
    Substring,
    /// Fuzzy match via nucleo. Row order is still the input order.
    Fuzzy,
}

/// Custom predicate `(row, query) -> keep`.
pub type Predicate<R> = Arc<dyn Fn(&R, &str) -> bool + Send + Sync>;

/// Options for the filter stage.
pub struct FilterOptions<R> {
    /// Fields to search. `None` searches every filterable column.
    pub fields: Option<Vec<String>>,
    /// Custom predicate. When set, `fields` and `mode` are ignored.
    pub predicate: Option<Predicate<R>>,
    /// Match mode for the default predicate.
    pub mode: FilterMode,
}

impl<R> Default for FilterOptions<R> {
    fn default() -> Self {
        Self {
            fields: None,
            predicate: None,
            mode: FilterMode::Substring,
        }
    }
}

impl<R> FilterOptions<R> {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Search only the named fields.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Use a custom predicate.
    pub fn with_predicate(mut self, f: impl Fn(&R, &str) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Arc::new(f));
        self
    }

    /// Set the match mode.
    pub fn with_mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }
}

impl<R> Clone for FilterOptions<R> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            predicate: self.predicate.clone(),
            mode: self.mode,
        }
    }
}

impl<R> fmt::Debug for FilterOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterOptions")
            .field("fields", &self.fields)
            .field("predicate", &self.predicate.is_some())
            .field("mode", &self.mode)
            .finish()
    }
}

/// Filter every row of `rows`. See [`filter_view`].
pub fn filter_rows<'a, R: TableRow>(
    rows: &'a [R],
    query: &str,
    columns: &[Column<R>],
    options: &FilterOptions<R>,
) -> RowView<'a, R> {
    filter_view(RowView::all(rows), query, columns, options)
}

/// Keep the rows of `view` matching `query`, in view order.
///
/// An empty query returns `view` untouched, so a pass-through view stays a
/// pass-through.
pub fn filter_view<'a, R: TableRow>(
    view: RowView<'a, R>,
    query: &str,
    columns: &[Column<R>],
    options: &FilterOptions<R>,
) -> RowView<'a, R> {
    if query.is_empty() {
        return view;
    }

    let keep: Vec<usize> = if let Some(predicate) = &options.predicate {
        view.iter()
            .filter(|(_, row)| predicate(row, query))
            .map(|(i, _)| i)
            .collect()
    } else {
        let fields = search_fields(columns, options);
        match options.mode {
            FilterMode::Substring => {
                let needle = query.to_lowercase();
                view.iter()
                    .filter(|(_, row)| {
                        fields
                            .iter()
                            .any(|f| cell_value(columns, f, *row).to_string().to_lowercase().contains(&needle))
                    })
                    .map(|(i, _)| i)
                    .collect()
            }
            FilterMode::Fuzzy => fuzzy_keep(&view, query, columns, &fields),
        }
    };

    log::debug!("Filter '{}' kept {} of {} rows", query, keep.len(), view.len());
    RowView::from_indices(view.source(), keep)
}

/// Field ids the default predicate searches.
fn search_fields<R>(columns: &[Column<R>], options: &FilterOptions<R>) -> Vec<String> {
    match &options.fields {
        Some(fields) => fields.clone(),
        None => columns
            .iter()
            .filter(|c| c.filterable)
            .map(|c| c.id.clone())
            .collect(),
    }
}

/// Read a field through its column when one exists, so computed columns
/// are searchable by id.
fn cell_value<R: TableRow>(columns: &[Column<R>], field: &str, row: &R) -> Value {
    match find_column(columns, field) {
        Some(column) => column.value(row),
        None => row.field(field).unwrap_or_default(),
    }
}

fn fuzzy_keep<R: TableRow>(
    view: &RowView<'_, R>,
    query: &str,
    columns: &[Column<R>],
    fields: &[String],
) -> Vec<usize> {
    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::new(
        query,
        CaseMatching::Ignore,
        Normalization::Smart,
        AtomKind::Fuzzy,
    );
    let mut buf = Vec::new();

    view.iter()
        .filter(|(_, row)| {
            fields.iter().any(|f| {
                let text = cell_value(columns, f, *row).to_string();
                let haystack = Utf32Str::new(&text, &mut buf);
                pattern.score(haystack, &mut matcher).is_some()
            })
        })
        .map(|(i, _)| i)
        .collect()
}

// =============================================================================
// FilterState
// =============================================================================

/// Query state of the filter stage.
///
/// The displayed query follows every keystroke. The applied query, which
/// is what [`filter_view`] should run with, only changes once typing has
/// been quiet for the debounce period.
#[derive(Debug)]
pub struct FilterState {
    query: Controlled<String>,
    applied: String,
    debouncer: Debouncer<String>,
    generation: u64,
    /// `is_filtering` flipped since the last `take_dirty`.
    pending_dirty: bool,
}

impl FilterState {
    /// Empty query with the given debounce.
    pub fn new(debounce: Duration) -> Self {
        Self {
            query: Controlled::uncontrolled(String::new()),
            applied: String::new(),
            debouncer: Debouncer::new(debounce),
            generation: 0,
            pending_dirty: false,
        }
    }

    /// Start from a default query, applied immediately.
    pub fn with_default_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.applied = query.clone();
        self.query.reset(query);
        self
    }

    /// Make the query caller-owned.
    pub fn with_controlled_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.applied = query.clone();
        self.query.set_controlled(Some(query));
        self
    }

    /// Set the query change callback.
    pub fn with_on_change(mut self, f: impl FnMut(&String) + 'static) -> Self {
        self.query.set_on_change(Some(Box::new(f) as ChangeFn<String>));
        self
    }

    /// Change the debounce. A pending query keeps its deadline.
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debouncer.set_delay(debounce);
    }

    /// The query shown in the search input.
    pub fn query(&self) -> &str {
        self.query.value()
    }

    /// The query the filter currently runs with.
    pub fn applied_query(&self) -> &str {
        &self.applied
    }

    /// Number of times the applied query changed. Used to invalidate
    /// cached filter output.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` while a typed query waits for its debounce.
    pub fn is_filtering(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// When the pending query will be applied, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Handle a keystroke in the search input.
    ///
    /// In controlled mode this only reports the new query; the debounce
    /// starts when the caller passes it back through
    /// [`set_controlled_query`](Self::set_controlled_query).
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        let query = query.into();
        let controlled = self.query.is_controlled();
        self.query.set(query.clone());
        if !controlled {
            self.schedule(query, now);
        }
    }

    /// Update the caller-owned query.
    ///
    /// `None` hands the query back to internal state; the internal query is
    /// then scheduled like any other change.
    pub fn set_controlled_query(&mut self, query: Option<String>, now: Instant) {
        let before = self.query.value().clone();
        self.query.set_controlled(query);
        if *self.query.value() != before {
            let query = self.query.value().clone();
            self.schedule(query, now);
        }
    }

    /// Apply the pending query if its debounce has elapsed.
    ///
    /// Returns `true` when the applied query changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(query) => {
                self.pending_dirty = true;
                self.apply(query)
            }
            None => false,
        }
    }

    /// Drop any pending query, keeping the applied one.
    pub fn cancel(&mut self) {
        if self.debouncer.is_pending() {
            self.pending_dirty = true;
        }
        self.debouncer.cancel();
    }

    /// Returns `true` if the displayed query or the pending state changed
    /// since the last call. Applied query changes are tracked by
    /// [`generation`](Self::generation).
    pub fn take_dirty(&mut self) -> bool {
        let query = self.query.take_dirty();
        query | std::mem::take(&mut self.pending_dirty)
    }

    fn schedule(&mut self, query: String, now: Instant) {
        let was_pending = self.debouncer.is_pending();
        match self.debouncer.push(query, now) {
            Some(query) => {
                self.pending_dirty |= was_pending;
                self.apply(query);
            }
            None => self.pending_dirty |= !was_pending,
        }
    }

    fn apply(&mut self, query: String) -> bool {
        if query == self.applied {
            return false;
        }
        log::debug!("Applying filter query '{}'", query);
        self.applied = query;
        self.generation += 1;
        true
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::{Clock, ManualClock};
    use crate::row::Row;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().set("id", 1).set("name", "Bob").set("city", "Paris"),
            Row::new().set("id", 2).set("name", "Alice").set("city", "Abbeville"),
            Row::new().set("id", 3).set("name", "Abby").set("city", "Rome"),
        ]
    }

    fn columns() -> Vec<Column<Row>> {
        vec![Column::new("id", "ID"), Column::new("name", "Name"), Column::new("city", "City")]
    }

    fn ids(view: &RowView<'_, Row>) -> Vec<usize> {
        view.iter().map(|(i, _)| i).collect()
    }

    #[test]
    fn test_empty_query_is_passthrough() {
        let rows = rows();
        let view = filter_rows(&rows, "", &columns(), &FilterOptions::new());
        assert!(view.is_passthrough());
    }

    #[test]
    fn test_fields_restrict_search() {
        let rows = rows();
        let options = FilterOptions::new().with_fields(["name"]);
        let view = filter_rows(&rows, "ab", &columns(), &options);
        assert_eq!(ids(&view), vec![2]);
    }

    #[test]
    fn test_unfilterable_columns_skipped_by_default() {
        let rows = rows();
        let columns = vec![Column::new("name", "Name"), Column::new("city", "City").filterable(false)];
        let view = filter_rows(&rows, "rome", &columns, &FilterOptions::new());
        assert!(view.is_empty());
    }

    #[test]
    fn test_predicate_overrides_fields() {
        let rows = rows();
        let options = FilterOptions::new()
            .with_fields(["name"])
            .with_predicate(|row: &Row, q| row.get("city").is_some_and(|c| c.to_string().starts_with(q)));
        let view = filter_rows(&rows, "R", &columns(), &options);
        assert_eq!(ids(&view), vec![2]);
    }

    #[test]
    fn test_fuzzy_mode_keeps_input_order() {
        let rows = rows();
        let options = FilterOptions::new().with_fields(["name"]).with_mode(FilterMode::Fuzzy);
        // "Bob" and "Abby" both contain two b's; only "Abby" has "bb" as a substring.
        let view = filter_rows(&rows, "bb", &columns(), &options);
        assert_eq!(ids(&view), vec![0, 2]);
    }

    #[test]
    fn test_state_controlled_query_debounces_on_feedback() {
        let clock = ManualClock::new();
        let mut state = FilterState::new(Duration::from_millis(100)).with_controlled_query("");
        state.set_query("x", clock.now());
        assert_eq!(state.query(), "");
        assert!(!state.is_filtering());

        state.set_controlled_query(Some("x".into()), clock.now());
        assert_eq!(state.query(), "x");
        assert!(state.is_filtering());
        clock.advance(Duration::from_millis(100));
        assert!(state.tick(clock.now()));
        assert_eq!(state.applied_query(), "x");
    }

    #[test]
    fn test_state_releasing_control_reschedules_internal_query() {
        let clock = ManualClock::new();
        let mut state = FilterState::new(Duration::from_millis(100));
        state.set_query("a", clock.now());
        clock.advance(Duration::from_millis(100));
        state.tick(clock.now());

        state.set_controlled_query(Some("zzz".into()), clock.now());
        clock.advance(Duration::from_millis(100));
        assert!(state.tick(clock.now()));
        assert_eq!(state.applied_query(), "zzz");

        state.set_controlled_query(None, clock.now());
        assert_eq!(state.query(), "a");
        assert!(state.is_filtering());
        clock.advance(Duration::from_millis(100));
        assert!(state.tick(clock.now()));
        assert_eq!(state.applied_query(), "a");
    }

    #[test]
    fn test_state_take_dirty_tracks_typing_and_pending() {
        let clock = ManualClock::new();
        let mut state = FilterState::new(Duration::from_millis(300));
        assert!(!state.take_dirty());

        state.set_query("a", clock.now());
        assert!(state.take_dirty());
        assert!(!state.take_dirty());

        state.set_query("ab", clock.now());
        assert!(state.take_dirty());

        clock.advance(Duration::from_millis(300));
        assert!(state.tick(clock.now()));
        assert!(state.take_dirty());

        state.cancel();
        assert!(!state.take_dirty());

        state.set_query("abc", clock.now());
        state.take_dirty();
        state.cancel();
        assert!(state.take_dirty());
    }

    #[test]
    fn test_state_same_query_does_not_bump_generation() {
        let clock = ManualClock::new();
        let mut state = FilterState::new(Duration::ZERO);
        state.set_query("a", clock.now());
        state.set_query("a", clock.now());
        assert_eq!(state.generation(), 1);
    }
}
