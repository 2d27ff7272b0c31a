//! Controlled/uncontrolled state resolution.
//!
//! Every stateful stage (sort, selection, expansion, filter query) exposes
//! the same triple: an optional caller-owned value, a default for internal
//! state, and a change callback. `Controlled<T>` implements that rule once.

use std::fmt;

/// Change callback receiving the would-be next value.
pub type ChangeFn<T> = Box<dyn FnMut(&T)>;

/// State that is owned either by the caller or by the holder itself.
///
/// When a controlled value is present it always wins and [`set`](Self::set)
/// only reports the next value through the change callback; the caller is
/// expected to feed it back via [`set_controlled`](Self::set_controlled).
/// Otherwise the value lives in internal state.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use tabula::Controlled;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// let mut state = Controlled::controlled(1).on_change(move |v: &i32| sink.borrow_mut().push(*v));
///
/// state.set(2);
/// assert_eq!(*state.value(), 1); // caller has not accepted the change
/// assert_eq!(*seen.borrow(), vec![2]);
/// ```
pub struct Controlled<T> {
    controlled: Option<T>,
    internal: T,
    on_change: Option<ChangeFn<T>>,
    dirty: bool,
}

impl<T> Controlled<T> {
    /// Internal state starting at `default`.
    pub fn uncontrolled(default: T) -> Self {
        Self {
            controlled: None,
            internal: default,
            on_change: None,
            dirty: false,
        }
    }

    /// Caller-owned state with the given current value.
    pub fn controlled(value: T) -> Self
    where
        T: Default,
    {
        Self {
            controlled: Some(value),
            internal: T::default(),
            on_change: None,
            dirty: false,
        }
    }

    /// Set the change callback.
    pub fn on_change(mut self, f: impl FnMut(&T) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Replace the change callback.
    pub fn set_on_change(&mut self, f: Option<ChangeFn<T>>) {
        self.on_change = f;
    }

    /// Returns `true` if the caller owns the value.
    pub fn is_controlled(&self) -> bool {
        self.controlled.is_some()
    }

    /// The effective value: controlled if present, else internal.
    pub fn value(&self) -> &T {
        self.controlled.as_ref().unwrap_or(&self.internal)
    }

    /// Request a new value.
    ///
    /// The callback always sees `next`. Internal state is only written when
    /// uncontrolled.
    pub fn set(&mut self, next: T) {
        if let Some(f) = self.on_change.as_mut() {
            f(&next);
        }
        if self.controlled.is_none() {
            self.internal = next;
            self.dirty = true;
        }
    }

    /// Derive the next value from the effective one and [`set`](Self::set) it.
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(self.value());
        self.set(next);
    }

    /// Update the caller-owned value. `None` hands ownership back to
    /// internal state.
    pub fn set_controlled(&mut self, value: Option<T>) {
        self.controlled = value;
        self.dirty = true;
    }

    /// The internal value, whether or not the caller currently owns it.
    pub fn internal(&self) -> &T {
        &self.internal
    }

    /// Overwrite internal state without notifying. Control is kept.
    pub fn replace_internal(&mut self, value: T) {
        self.internal = value;
        self.dirty = true;
    }

    /// Drop control and reset internal state to `value` without notifying.
    pub fn reset(&mut self, value: T) {
        self.controlled = None;
        self.internal = value;
        self.dirty = true;
    }

    /// Check if the effective value may have changed since last check.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning its previous value.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl<T: Default> Default for Controlled<T> {
    fn default() -> Self {
        Self::uncontrolled(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Controlled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controlled")
            .field("controlled", &self.controlled)
            .field("internal", &self.internal)
            .field("on_change", &self.on_change.is_some())
            .field("dirty", &self.dirty)
            .finish()
    }
}
