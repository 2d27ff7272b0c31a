//! Row key resolution.
//!
//! Selection and expansion track rows by a string key rather than by
//! position, so state stays attached to a row when the visible order changes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};
use crate::row::{RowView, TableRow};

/// Stable identifier of a data row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    /// Creates a key from any string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for RowKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<i64> for RowKey {
    fn from(key: i64) -> Self {
        Self(key.to_string())
    }
}

impl std::borrow::Borrow<str> for RowKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Function computing a key from a row and its position.
pub type KeyFn<R> = Arc<dyn Fn(&R, usize) -> String + Send + Sync>;

/// How row keys are derived.
pub enum KeySpec<R> {
    /// Use the string form of a field, falling back to the row position
    /// when the field is missing or null.
    Field(String),
    /// Use a caller-supplied function verbatim.
    Compute(KeyFn<R>),
}

impl<R> KeySpec<R> {
    /// Key by the named field.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Key by a custom function of `(row, index)`.
    pub fn compute(f: impl Fn(&R, usize) -> String + Send + Sync + 'static) -> Self {
        Self::Compute(Arc::new(f))
    }
}

impl<R: TableRow> KeySpec<R> {
    /// Resolve the key of one row.
    ///
    /// This is the permissive form: a missing key field yields the index,
    /// which can collide. Use [`resolve_keys`] to detect collisions.
    pub fn resolve(&self, row: &R, index: usize) -> RowKey {
        match self {
            KeySpec::Field(name) => match row.field(name) {
                Some(value) if !value.is_null() => RowKey(value.to_string()),
                _ => RowKey(index.to_string()),
            },
            KeySpec::Compute(f) => RowKey(f(row, index)),
        }
    }
}

impl<R> Clone for KeySpec<R> {
    fn clone(&self) -> Self {
        match self {
            KeySpec::Field(name) => KeySpec::Field(name.clone()),
            KeySpec::Compute(f) => KeySpec::Compute(Arc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for KeySpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpec::Field(name) => f.debug_tuple("Field").field(name).finish(),
            KeySpec::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

/// Resolve keys for every row in a view, in view order.
///
/// The index passed to the key function is the row's source position, so a
/// row keeps its fallback key when filtering or sorting moves it.
///
/// Returns [`TableError::DuplicateKey`] on the first collision.
pub fn resolve_keys<R: TableRow>(view: &RowView<'_, R>, spec: &KeySpec<R>) -> Result<Vec<RowKey>> {
    let mut seen: HashMap<RowKey, usize> = HashMap::with_capacity(view.len());
    let mut keys = Vec::with_capacity(view.len());
    for (index, row) in view.iter() {
        let key = spec.resolve(row, index);
        if let Some(&first) = seen.get(&key) {
            return Err(TableError::duplicate_key(key, first, index));
        }
        seen.insert(key.clone(), index);
        keys.push(key);
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;

    #[test]
    fn test_field_key_with_index_fallback() {
        let spec = KeySpec::field("id");
        assert_eq!(spec.resolve(&Row::new().set("id", 7), 0).as_str(), "7");
        assert_eq!(spec.resolve(&Row::new().set("name", "x"), 3).as_str(), "3");
        assert_eq!(spec.resolve(&Row::new().set("id", None::<i64>), 4).as_str(), "4");
    }

    #[test]
    fn test_compute_key_used_verbatim() {
        let spec: KeySpec<Row> = KeySpec::compute(|row: &Row, i| format!("{}-{}", row.len(), i));
        assert_eq!(spec.resolve(&Row::new().set("a", 1), 2).as_str(), "1-2");
    }

    #[test]
    fn test_resolve_keys_detects_fallback_collision() {
        // Row 1 has no id and falls back to "1", colliding with row 0's id.
        let rows = vec![Row::new().set("id", 1), Row::new().set("name", "x")];
        let view = RowView::all(&rows);
        let err = resolve_keys(&view, &KeySpec::field("id")).unwrap_err();
        assert_eq!(err, TableError::duplicate_key(RowKey::from("1"), 0, 1));
    }

    #[test]
    fn test_resolve_keys_in_view_order() {
        let rows = vec![Row::new().set("id", "a"), Row::new().set("id", "b")];
        let view = RowView::from_indices(&rows, vec![1, 0]);
        let keys = resolve_keys(&view, &KeySpec::field("id")).unwrap();
        assert_eq!(keys, vec![RowKey::from("b"), RowKey::from("a")]);
    }
}
