//! Stage invariants checked over small hand-built inputs.

use tabula::{
    Affordances, Column, FilterOptions, KeySpec, Row, RowKey, RowView, SelectionMode,
    SelectionState, SortState, TrackSize, Width, WidthConfig, calculate_column_widths,
    filter_rows, filter_view, resolve_keys, sort_view,
};

fn rows() -> Vec<Row> {
    vec![
        Row::new().set("id", 1).set("team", "red").set("score", 7),
        Row::new().set("id", 2).set("team", "blue").set("score", 3),
        Row::new().set("id", 3).set("team", "red").set("score", 3),
        Row::new().set("id", 4).set("team", "green").set("score", 9.5),
        Row::new().set("id", 5).set("team", "blue").set("score", 7),
    ]
}

fn columns() -> Vec<Column<Row>> {
    vec![
        Column::new("id", "ID"),
        Column::new("team", "Team"),
        Column::new("score", "Score"),
    ]
}

fn order(view: &RowView<'_, Row>) -> Vec<usize> {
    view.iter().map(|(i, _)| i).collect()
}

#[test]
fn test_filter_idempotent() {
    let rows = rows();
    let columns = columns();
    let options = FilterOptions::new();
    for query in ["re", "BLUE", "7", "zzz"] {
        let once = filter_rows(&rows, query, &columns, &options);
        let twice = filter_view(once.clone(), query, &columns, &options);
        assert_eq!(order(&once), order(&twice), "query {query:?}");
    }
}

#[test]
fn test_empty_query_returns_same_rows() {
    let rows = rows();
    let view = filter_rows(&rows, "", &columns(), &FilterOptions::new());
    assert!(view.is_passthrough());
    assert!(std::ptr::eq(view.source(), rows.as_slice()));
}

#[test]
fn test_filtered_rows_are_ordered_subset() {
    let rows = rows();
    let view = filter_rows(&rows, "e", &columns(), &FilterOptions::new());
    let kept = order(&view);
    assert!(kept.windows(2).all(|w| w[0] < w[1]));
    for (index, row) in view.iter() {
        assert!(std::ptr::eq(row, &rows[index]));
    }
}

#[test]
fn test_sort_stable_for_ties() {
    let rows = rows();
    let asc = sort_view(RowView::all(&rows), &SortState::asc("team"), &columns());
    // blue: 1, 4 / green: 3 / red: 0, 2 - ties keep input order.
    assert_eq!(order(&asc), vec![1, 4, 3, 0, 2]);

    let desc = sort_view(RowView::all(&rows), &SortState::desc("team"), &columns());
    assert_eq!(order(&desc), vec![0, 2, 3, 1, 4]);
}

#[test]
fn test_sort_desc_reverses_asc_for_distinct_values() {
    let rows = rows();
    let asc = sort_view(RowView::all(&rows), &SortState::asc("id"), &columns());
    let desc = sort_view(RowView::all(&rows), &SortState::desc("id"), &columns());
    let mut reversed = order(&asc);
    reversed.reverse();
    assert_eq!(order(&desc), reversed);
}

#[test]
fn test_sort_after_filter_only_reorders_filtered() {
    let rows = rows();
    let filtered = filter_rows(&rows, "red", &columns(), &FilterOptions::new());
    let sorted = sort_view(filtered, &SortState::desc("id"), &columns());
    assert_eq!(order(&sorted), vec![2, 0]);
}

#[test]
fn test_unknown_sort_column_uses_field() {
    let rows = rows();
    let sorted = sort_view(RowView::all(&rows), &SortState::asc("score"), &[]);
    assert_eq!(order(&sorted), vec![1, 2, 0, 4, 3]);
}

#[test]
fn test_single_selection_never_exceeds_one() {
    let keys: Vec<RowKey> = (0..6i64).map(RowKey::from).collect();
    let mut sel = SelectionState::new(SelectionMode::Single);
    for (step, key) in keys.iter().cycle().take(30).enumerate() {
        sel.on_select_row(key, step % 3 != 0);
        sel.toggle(&keys[step % keys.len()]);
        sel.select_range(key, &keys, true);
        sel.on_select_all(true, &keys);
        assert!(sel.selected_keys().len() <= 1, "step {step}");
    }
}

#[test]
fn test_select_all_equals_visible_keys() {
    let rows = rows();
    let view = filter_rows(&rows, "blue", &columns(), &FilterOptions::new());
    let visible = resolve_keys(&view, &KeySpec::field("id")).unwrap();

    let mut sel = SelectionState::new(SelectionMode::Multiple).with_default_keys([RowKey::from("1")]);
    sel.on_select_all(true, &visible);

    assert!(sel.is_all_selected(&visible));
    assert_eq!(sel.selected(), vec![RowKey::from("2"), RowKey::from("5")]);
}

#[test]
fn test_width_invariants_over_configurations() {
    let rows = rows();
    let choices = [Width::Auto, Width::Fixed(0), Width::Fixed(120), Width::Flex];
    let configs = [
        WidthConfig::default(),
        WidthConfig {
            min_width: 0,
            cell_padding: 0,
            ..WidthConfig::default()
        },
    ];

    for config in &configs {
        for a in choices {
            for b in choices {
                for c in choices {
                    let columns: Vec<Column<Row>> = columns()
                        .into_iter()
                        .zip([a, b, c])
                        .map(|(col, w)| col.width(w))
                        .collect();
                    for (expandable, selectable) in [(false, false), (true, false), (true, true)] {
                        let widths = calculate_column_widths(
                            &columns,
                            &rows,
                            Affordances { expandable, selectable },
                            config,
                        );
                        assert!(widths.flex_count() <= 1);
                        assert!(widths.tracks().iter().all(|t| t.min_px() > 0));
                        if expandable {
                            assert_eq!(widths.tracks()[0], TrackSize::Fixed(40));
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_width_sample_limit() {
    let mut rows = vec![Row::new().set("note", "short"); 3];
    rows.push(Row::new().set("note", "a much longer note than the rest"));
    let columns = vec![Column::new("note", "Note")];
    let config = WidthConfig {
        sample_rows: 3,
        ..WidthConfig::default()
    };
    let widths = calculate_column_widths(&columns, &rows, Affordances::default(), &config);
    assert_eq!(widths.tracks(), &[TrackSize::Fixed(64)]);
}
