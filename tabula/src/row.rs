//! Row records, the `TableRow` trait and borrowed row views.

use std::borrow::Cow;
use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::Value;

/// Trait for items that can be fed through the table pipeline.
///
/// Columns read cells by field name through [`field`](TableRow::field).
/// Implement it for your own structs to skip the dynamic [`Row`] record:
///
/// ```
/// use tabula::{TableRow, Value};
///
/// struct User {
///     id: u32,
///     name: String,
/// }
///
/// impl TableRow for User {
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "id" => Some(self.id.into()),
///             "name" => Some(self.name.as_str().into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait TableRow {
    /// Value of the named field, or `None` when the row has no such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Field names in display order.
    ///
    /// Only used by [`infer_columns`](crate::infer_columns). Rows that cannot
    /// enumerate their fields return an empty list.
    fn field_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A dynamic record with ordered fields.
///
/// Field order is insertion order, which is what column inference uses.
///
/// # Example
///
/// ```
/// use tabula::{Row, TableRow, Value};
///
/// let row = Row::new().set("id", 1).set("name", "Bob");
/// assert_eq!(row.field("name"), Some(Value::from("Bob")));
/// assert_eq!(row.field_names(), vec!["id", "name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the row (builder style).
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a field. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns `true` if the row contains the given field.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TableRow for Row {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(n, _)| n.clone()).collect()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut row = Row {
                    fields: Vec::with_capacity(access.size_hint().unwrap_or(0)),
                };
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    row.insert(name, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

// =============================================================================
// RowView
// =============================================================================

/// An ordered view over borrowed rows.
///
/// Filter and sort never copy rows; they produce a view holding positions
/// into the caller's slice. A view built with [`RowView::all`] is a
/// pass-through and keeps that status until a stage actually changes the
/// row set or order.
pub struct RowView<'a, R> {
    rows: &'a [R],
    /// Positions into `rows`; `None` means every row in source order.
    order: Option<Vec<usize>>,
}

impl<'a, R> RowView<'a, R> {
    /// A pass-through view over every row.
    pub fn all(rows: &'a [R]) -> Self {
        Self { rows, order: None }
    }

    /// A view over the given positions, in the given order.
    ///
    /// Positions must be in bounds of `rows`.
    pub fn from_indices(rows: &'a [R], order: Vec<usize>) -> Self {
        debug_assert!(order.iter().all(|&i| i < rows.len()));
        Self {
            rows,
            order: Some(order),
        }
    }

    /// The source slice this view borrows from.
    pub fn source(&self) -> &'a [R] {
        self.rows
    }

    /// Returns `true` if this view is the untouched source slice.
    pub fn is_passthrough(&self) -> bool {
        self.order.is_none()
    }

    /// Number of rows in the view.
    pub fn len(&self) -> usize {
        self.order.as_ref().map_or(self.rows.len(), Vec::len)
    }

    /// Returns `true` if the view holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source positions of the rows in view order.
    pub fn indices(&self) -> Cow<'_, [usize]> {
        match &self.order {
            Some(order) => Cow::Borrowed(order),
            None => Cow::Owned((0..self.rows.len()).collect()),
        }
    }

    /// Row at view position `pos`, with its source position.
    pub fn get(&self, pos: usize) -> Option<(usize, &'a R)> {
        let index = match &self.order {
            Some(order) => *order.get(pos)?,
            None => pos,
        };
        self.rows.get(index).map(|row| (index, row))
    }

    /// Iterates `(source_index, row)` in view order.
    pub fn iter(&self) -> RowViewIter<'_, 'a, R> {
        RowViewIter { view: self, pos: 0 }
    }

    /// Collects the viewed rows as references.
    pub fn to_refs(&self) -> Vec<&'a R> {
        self.iter().map(|(_, row)| row).collect()
    }
}

impl<R> Clone for RowView<'_, R> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows,
            order: self.order.clone(),
        }
    }
}

impl<R> fmt::Debug for RowView<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowView")
            .field("source_len", &self.rows.len())
            .field("order", &self.order)
            .finish()
    }
}

/// Iterator over a [`RowView`].
pub struct RowViewIter<'v, 'a, R> {
    view: &'v RowView<'a, R>,
    pos: usize,
}

impl<'a, R> Iterator for RowViewIter<'_, 'a, R> {
    type Item = (usize, &'a R);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.view.get(self.pos)?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.len().saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}
