//! End-to-end scenarios through the composed table.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tabula::{
    Clock, Column, KeySet, KeySpec, ManualClock, Row, RowKey, SelectionMode, SelectionState,
    SortState, Table, TableConfig,
};

fn people() -> Vec<Row> {
    vec![
        Row::new().set("id", 1).set("name", "Bob"),
        Row::new().set("id", 2).set("name", "Abel"),
        Row::new().set("id", 3).set("name", "Abby"),
    ]
}

fn table(debounce: Duration) -> Table<Row> {
    Table::new(
        vec![Column::new("id", "ID"), Column::new("name", "Name")],
        KeySpec::field("id"),
    )
    .with_config(
        TableConfig::default()
            .with_debounce(debounce)
            .with_selection_mode(SelectionMode::Multiple),
    )
}

fn ids(table: &Table<Row>, rows: &[Row]) -> Vec<String> {
    table
        .snapshot(rows)
        .unwrap()
        .rows
        .iter()
        .map(|r| r.key.to_string())
        .collect()
}

#[test]
fn test_filter_then_sort() {
    let rows = people();
    let clock = ManualClock::new();
    let mut table = table(Duration::ZERO);

    table.set_query("ab", clock.now());
    assert_eq!(ids(&table, &rows), vec!["2", "3"]);

    table.set_sort(SortState::asc("name"));
    assert_eq!(ids(&table, &rows), vec!["3", "2"]);
}

#[test]
fn test_select_all_respects_filter() {
    let rows = people();
    let clock = ManualClock::new();
    let mut table = table(Duration::ZERO);

    table.set_query("ab", clock.now());
    table.on_select_all(&rows, true).unwrap();

    let snapshot = table.snapshot(&rows).unwrap();
    assert_eq!(snapshot.selected_keys, vec![RowKey::from("2"), RowKey::from("3")]);
    assert!(snapshot.is_all_selected);
    assert!(!snapshot.is_indeterminate);
}

#[test]
fn test_select_all_then_clear_filter_is_indeterminate() {
    let rows = people();
    let clock = ManualClock::new();
    let mut table = table(Duration::ZERO);

    table.set_query("ab", clock.now());
    table.on_select_all(&rows, true).unwrap();
    table.set_query("", clock.now());

    let snapshot = table.snapshot(&rows).unwrap();
    assert!(!snapshot.is_all_selected);
    assert!(snapshot.is_indeterminate);
}

#[test]
fn test_debounce_applies_last_query_once() {
    let rows = people();
    let clock = ManualClock::new();
    let mut table = table(Duration::from_millis(300));

    table.set_query("a", clock.now());
    clock.advance(Duration::from_millis(40));
    table.set_query("ab", clock.now());
    clock.advance(Duration::from_millis(40));
    table.set_query("abc", clock.now());

    let snapshot = table.snapshot(&rows).unwrap();
    assert_eq!(snapshot.query, "abc");
    assert!(snapshot.is_filtering);
    assert_eq!(snapshot.rows.len(), 3);

    // 300ms after the first keystroke is not quiet enough.
    clock.advance(Duration::from_millis(220));
    assert!(!table.tick(clock.now()));

    clock.advance(Duration::from_millis(80));
    assert!(table.tick(clock.now()));
    assert!(!table.tick(clock.now()));

    assert_eq!(table.filter().generation(), 1);
    assert_eq!(table.filter().applied_query(), "abc");
    assert!(!table.filter().is_filtering());
    assert!(table.snapshot(&rows).unwrap().rows.is_empty());
}

#[test]
fn test_cancel_pending_drops_query() {
    let rows = people();
    let clock = ManualClock::new();
    let mut table = table(Duration::from_millis(300));

    table.set_query("bob", clock.now());
    table.cancel_pending();
    clock.advance(Duration::from_secs(1));
    assert!(!table.tick(clock.now()));
    assert_eq!(table.snapshot(&rows).unwrap().rows.len(), 3);
}

#[test]
fn test_controlled_selection_through_table() {
    let rows = people();
    let requested = Rc::new(RefCell::new(KeySet::new()));
    let sink = Rc::clone(&requested);

    let mut table = table(Duration::ZERO).with_selection(
        SelectionState::new(SelectionMode::Multiple)
            .with_controlled_keys(KeySet::new())
            .with_on_change(move |keys: &KeySet| *sink.borrow_mut() = keys.clone()),
    );

    table.on_select_all(&rows, true).unwrap();
    assert!(table.snapshot(&rows).unwrap().selected_keys.is_empty());
    assert_eq!(requested.borrow().len(), 3);

    let accepted = requested.borrow().clone();
    table.selection_mut().set_controlled(Some(accepted));
    assert!(table.snapshot(&rows).unwrap().is_all_selected);
}

#[test]
fn test_controlled_sort_reports_toggle() {
    let rows = people();
    let requested = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&requested);

    let mut table = table(Duration::ZERO)
        .with_controlled_sort(SortState::none())
        .on_sort_change(move |s: &SortState| *sink.borrow_mut() = Some(s.clone()));

    table.toggle_sort("name");
    assert_eq!(ids(&table, &rows), vec!["1", "2", "3"]);
    assert_eq!(*requested.borrow(), Some(SortState::asc("name")));

    table.set_controlled_sort(Some(SortState::asc("name")));
    assert_eq!(ids(&table, &rows), vec!["3", "2", "1"]);
}

#[test]
fn test_range_select_uses_visible_order() {
    let rows = people();
    let mut table = table(Duration::ZERO).with_default_sort(SortState::asc("name"));
    // Visible order by name: Abby(3), Abel(2), Bob(1).
    table.on_select_row(&RowKey::from("3"), true);
    table.select_range(&rows, &RowKey::from("2"), false).unwrap();
    assert_eq!(
        table.selection().selected(),
        vec![RowKey::from("2"), RowKey::from("3")]
    );
}
