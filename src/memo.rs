//! Compute-once cells for derived values.

use std::cell::OnceCell;
use std::fmt;

/// A lazily computed value that takes no part in equality.
///
/// Entities keep derived values (feed entries, comment contents, artifact
/// metadata) in a `Memo`, so two structurally equal entities compare equal
/// whether or not either has computed its derived values yet.
#[derive(Clone)]
pub struct Memo<T>(OnceCell<T>);

impl<T> Memo<T> {
    pub fn new() -> Self {
        Self(OnceCell::new())
    }

    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        self.0.get_or_init(init)
    }

    /// Like [`get_or_init`](Self::get_or_init), but a failed computation is
    /// not stored and will be retried on the next call.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Some(value) = self.0.get() {
            return Ok(value);
        }
        let value = init()?;
        Ok(self.0.get_or_init(|| value))
    }

    pub fn get(&self) -> Option<&T> {
        self.0.get()
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PartialEq for Memo<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T> Eq for Memo<T> {}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get() {
            Some(value) => f.debug_tuple("Memo").field(value).finish(),
            None => f.write_str("Memo(<pending>)"),
        }
    }
}
