//! Column configuration.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::row::TableRow;
use crate::value::Value;

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Requested width of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Width {
    /// Estimated from header and sampled cell text.
    #[default]
    Auto,
    /// Fixed width in pixels.
    Fixed(u32),
    /// Fill the remaining space. Only one flexible track is kept per table.
    Flex,
}

/// Function computing a cell value from a row.
pub type ValueFn<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;

/// Comparator overriding the default value ordering of a column.
pub type Comparator<R> = Arc<dyn Fn(&R, &R) -> Ordering + Send + Sync>;

/// How a column reads its cell value.
pub enum Accessor<R> {
    /// Read a field by name.
    Field(String),
    /// Compute the value from the whole row.
    Compute(ValueFn<R>),
}

impl<R> Clone for Accessor<R> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Field(name) => Accessor::Field(name.clone()),
            Accessor::Compute(f) => Accessor::Compute(Arc::clone(f)),
        }
    }
}

/// Column configuration.
///
/// Columns define the structure of the table: which value a cell shows,
/// header text, width, alignment, and whether the column takes part in
/// sorting and filtering. Both default to enabled.
///
/// # Examples
///
/// ```
/// use tabula::{Column, Row, Value};
///
/// let columns: Vec<Column<Row>> = vec![
///     Column::new("id", "ID").fixed(60),
///     Column::new("name", "Name").flex(),
///     Column::computed("initial", "Initial", |row: &Row| {
///         Value::from(row.get("name").map(|v| v.to_string()).unwrap_or_default().chars().take(1).collect::<String>())
///     })
///     .sortable(false),
/// ];
/// assert_eq!(columns[1].id, "name");
/// ```
pub struct Column<R> {
    /// Identifier used by sort state and filter field lists.
    pub id: String,
    /// Column header text.
    pub header: String,
    /// Cell value accessor.
    pub accessor: Accessor<R>,
    /// Requested width.
    pub width: Width,
    /// Horizontal alignment.
    pub align: Alignment,
    /// Whether header clicks toggle sorting on this column.
    pub sortable: bool,
    /// Whether the default filter searches this column.
    pub filterable: bool,
    /// Sort comparator override.
    pub comparator: Option<Comparator<R>>,
}

impl<R> Column<R> {
    /// Create a column reading the field `id`.
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            accessor: Accessor::Field(id.clone()),
            id,
            header: header.into(),
            width: Width::Auto,
            align: Alignment::Left,
            sortable: true,
            filterable: true,
            comparator: None,
        }
    }

    /// Create a column whose value is computed from the row.
    pub fn computed(
        id: impl Into<String>,
        header: impl Into<String>,
        f: impl Fn(&R) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            accessor: Accessor::Compute(Arc::new(f)),
            ..Self::new(id, header)
        }
    }

    /// Set the requested width.
    pub fn width(mut self, width: Width) -> Self {
        self.width = width;
        self
    }

    /// Fixed width in pixels.
    pub fn fixed(self, px: u32) -> Self {
        self.width(Width::Fixed(px))
    }

    /// Make this the flexible column.
    pub fn flex(self) -> Self {
        self.width(Width::Flex)
    }

    /// Set the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Enable or disable sorting on this column.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Include or exclude this column from the default filter fields.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Override the sort comparator.
    ///
    /// The comparator defines ascending order; descending reverses it.
    pub fn comparator(mut self, f: impl Fn(&R, &R) -> Ordering + Send + Sync + 'static) -> Self {
        self.comparator = Some(Arc::new(f));
        self
    }
}

impl<R: TableRow> Column<R> {
    /// The cell value of this column for `row`.
    ///
    /// Missing fields read as [`Value::Null`].
    pub fn value(&self, row: &R) -> Value {
        match &self.accessor {
            Accessor::Field(name) => row.field(name).unwrap_or_default(),
            Accessor::Compute(f) => f(row),
        }
    }

    /// The rendered text of this column for `row`.
    pub fn text(&self, row: &R) -> String {
        self.value(row).to_string()
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            width: self.width,
            align: self.align,
            sortable: self.sortable,
            filterable: self.filterable,
            comparator: self.comparator.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("width", &self.width)
            .field("align", &self.align)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("comparator", &self.comparator.is_some())
            .finish()
    }
}

/// Find a column by id.
pub fn find_column<'c, R>(columns: &'c [Column<R>], id: &str) -> Option<&'c Column<R>> {
    columns.iter().find(|c| c.id == id)
}

/// Build one column per field of a sample row.
///
/// This is a one-shot setup helper for schemaless data: only the sample's
/// fields become columns. Rows with extra fields show no column for them and
/// rows missing a field render an empty cell.
pub fn infer_columns<R: TableRow>(sample: &R) -> Vec<Column<R>> {
    let columns: Vec<_> = sample
        .field_names()
        .into_iter()
        .map(|name| {
            let header = humanize(&name);
            Column::new(name, header)
        })
        .collect();
    log::debug!("Inferred {} columns from sample row", columns.len());
    columns
}

/// Turn a field name into a header label.
///
/// `first_name`, `first-name` and `firstName` all become `First name`.
pub fn humanize(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    let joined = words.join(" ");
    let mut chars = joined.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
