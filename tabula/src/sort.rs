//! Single-column sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::column::{Column, find_column};
use crate::row::{RowView, TableRow};
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// What repeated header clicks on the same column do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCycle {
    /// asc -> desc -> asc
    #[default]
    Toggle,
    /// asc -> desc -> unsorted
    TriState,
}

/// Current sort column and direction.
///
/// `column: None` means unsorted; the direction is then ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Unsorted.
    pub fn none() -> Self {
        Self::default()
    }

    /// Ascending on `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
            direction: SortDirection::Asc,
        }
    }

    /// Descending on `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
            direction: SortDirection::Desc,
        }
    }

    /// Returns `true` if a sort column is set.
    pub fn is_sorted(&self) -> bool {
        self.column.is_some()
    }

    /// The state after a header click on `column`.
    ///
    /// A different column always starts ascending.
    pub fn toggled(&self, column: &str, cycle: SortCycle) -> Self {
        if self.column.as_deref() != Some(column) {
            return Self::asc(column);
        }
        match (self.direction, cycle) {
            (SortDirection::Asc, _) => Self::desc(column),
            (SortDirection::Desc, SortCycle::Toggle) => Self::asc(column),
            (SortDirection::Desc, SortCycle::TriState) => Self::none(),
        }
    }
}

/// Default ordering of two cell values.
///
/// Two numbers compare numerically; anything else compares by string form,
/// byte-wise and locale independent.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Sort `view` by `state`, stably.
///
/// Unsorted state returns `view` unchanged. A sort column with no matching
/// column config is sorted by the row field of that name with the default
/// comparator.
pub fn sort_view<'a, R: TableRow>(
    view: RowView<'a, R>,
    state: &SortState,
    columns: &[Column<R>],
) -> RowView<'a, R> {
    let Some(column_id) = state.column.as_deref() else {
        return view;
    };
    let column = find_column(columns, column_id);
    let rows = view.source();
    let desc = state.direction == SortDirection::Desc;
    let directed = |ord: Ordering| if desc { ord.reverse() } else { ord };

    let order: Vec<usize> = match column.and_then(|c| c.comparator.as_ref()) {
        Some(cmp) => {
            let mut order = view.indices().into_owned();
            order.sort_by(|&a, &b| directed(cmp(&rows[a], &rows[b])));
            order
        }
        None => {
            let mut keyed: Vec<(usize, Value)> = view
                .iter()
                .map(|(i, row)| {
                    let value = match column {
                        Some(c) => c.value(row),
                        None => row.field(column_id).unwrap_or_default(),
                    };
                    (i, value)
                })
                .collect();
            keyed.sort_by(|(_, a), (_, b)| directed(compare_values(a, b)));
            keyed.into_iter().map(|(i, _)| i).collect()
        }
    };

    if column.is_none() {
        log::debug!("Sorting by unknown column '{}' with default comparator", column_id);
    }
    RowView::from_indices(rows, order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;

    fn order(view: &RowView<'_, Row>) -> Vec<usize> {
        view.iter().map(|(i, _)| i).collect()
    }

    #[test]
    fn test_toggle_cycle() {
        let s = SortState::none().toggled("name", SortCycle::Toggle);
        assert_eq!(s, SortState::asc("name"));
        let s = s.toggled("name", SortCycle::Toggle);
        assert_eq!(s, SortState::desc("name"));
        assert_eq!(s.toggled("name", SortCycle::Toggle), SortState::asc("name"));
        assert_eq!(s.toggled("name", SortCycle::TriState), SortState::none());
        assert_eq!(s.toggled("age", SortCycle::TriState), SortState::asc("age"));
    }

    #[test]
    fn test_numbers_compare_numerically() {
        let rows = vec![
            Row::new().set("n", 10),
            Row::new().set("n", 9.5),
            Row::new().set("n", 100),
        ];
        let view = sort_view(RowView::all(&rows), &SortState::asc("n"), &[]);
        assert_eq!(order(&view), vec![1, 0, 2]);
    }

    #[test]
    fn test_numeric_strings_compare_as_text() {
        let rows = vec![Row::new().set("n", "10"), Row::new().set("n", "9")];
        let view = sort_view(RowView::all(&rows), &SortState::asc("n"), &[]);
        assert_eq!(order(&view), vec![0, 1]);
    }

    #[test]
    fn test_custom_comparator_reversed_for_desc() {
        let rows = vec![
            Row::new().set("name", "bb"),
            Row::new().set("name", "a"),
            Row::new().set("name", "ccc"),
        ];
        let by_len = Column::new("name", "Name").comparator(|a: &Row, b: &Row| {
            let len = |r: &Row| r.get("name").map(|v| v.to_string().len()).unwrap_or(0);
            len(a).cmp(&len(b))
        });
        let columns = vec![by_len];
        let asc = sort_view(RowView::all(&rows), &SortState::asc("name"), &columns);
        let desc = sort_view(RowView::all(&rows), &SortState::desc("name"), &columns);
        assert_eq!(order(&asc), vec![1, 0, 2]);
        assert_eq!(order(&desc), vec![2, 0, 1]);
    }

    #[test]
    fn test_unsorted_is_passthrough() {
        let rows = vec![Row::new().set("n", 2), Row::new().set("n", 1)];
        let view = sort_view(RowView::all(&rows), &SortState::none(), &[]);
        assert!(view.is_passthrough());
    }
}
